//! Roamly Core Library
//!
//! Semantic tour-package search: turns a free-text travel query into a dense
//! embedding, an AI-derived structured filter, a thresholded nearest-neighbor
//! search over catalog embeddings, and a conversational reply.
//!
//! # Features
//! - Deterministic description synthesis for embedding at ingestion time
//! - Embedding and chat completion via external OpenAI-compatible services
//! - Cosine-similarity vector search with configurable threshold and limit
//! - LLM query expansion and filter derivation with deterministic fallbacks

pub mod catalog;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod package;
pub mod search;
pub mod synthesis;

pub use catalog::{cosine_similarity, Catalog};
pub use config::{Config, LLMServiceConfig, PriceBands, SearchConfig};
pub use error::{Error, Result, RoamlyError};
pub use ingest::Indexer;
pub use llm::{
    ChatMessage, Embedder, FilterParser, HttpEmbedder, LLMClient, LazyEmbedder, OpenAIClient,
    PackageFilter, QueryTransformer, ResponseComposer, FALLBACK_REPLY,
};
pub use package::{DateRange, Location, NewPackage, Package};
pub use search::{ScoredPackage, SuggestEngine, Suggestion, VectorSearchEngine};
pub use synthesis::{synthesize_description, synthesize_query_expansion};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "roamly";
