//! Package search
//!
//! Provides:
//! - Vector similarity search over catalog embeddings with score
//!   thresholding and an optional LLM-derived structured filter
//! - The end-to-end suggest orchestrator

mod suggest;
mod vector;

pub use suggest::{SuggestEngine, Suggestion};
pub use vector::VectorSearchEngine;

use crate::package::Package;
use serde::Serialize;

/// A package with its normalized similarity score.
///
/// Scores are cosine similarities over L2-normalized embeddings: 0 means no
/// relation, 1 means identical direction.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPackage {
    pub package: Package,
    pub score: f32,
}
