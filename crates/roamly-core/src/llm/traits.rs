//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait.
///
/// Implementations must return a fixed-length vector per call; the suggest
/// pipeline and the catalog both rely on `dimensions()` being constant for
/// the lifetime of the instance.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}
