//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (vLLM, OpenAI-compatible)
//! - Query expansion and structured filter derivation
//! - Conversational reply composition

mod cache;
mod client;
mod composer;
mod filter_parser;
mod http_embedder;
mod lazy;
mod query_transformer;
mod traits;

pub use client::{ChatMessage, LLMClient, MetricsSnapshot, OpenAIClient};
pub use composer::{ResponseComposer, FALLBACK_REPLY};
pub use filter_parser::{FilterParser, PackageFilter};
pub use http_embedder::{HttpEmbedder, MAX_EMBED_CHARS};
pub use lazy::LazyEmbedder;
pub use query_transformer::QueryTransformer;
pub use traits::Embedder;
