//! Lazily-initialized embedder handle
//!
//! Some embedding backends pay a heavy cold-start cost (model download,
//! weight loading). `LazyEmbedder` defers that cost to the first `embed`
//! call and guards against concurrent double-initialization: the first
//! caller runs the factory, concurrent callers await the same in-flight
//! future, and every later caller reuses the built instance for the process
//! lifetime.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::OnceCell;

type EmbedderFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn Embedder>>> + Send>>;
type EmbedderFactory = Box<dyn Fn() -> EmbedderFuture + Send + Sync>;

/// Embedder that builds its inner instance on first use
pub struct LazyEmbedder {
    factory: EmbedderFactory,
    inner: OnceCell<Arc<dyn Embedder>>,
    dimensions: usize,
    model_name: String,
}

impl LazyEmbedder {
    /// Create a lazy embedder.
    ///
    /// `dimensions` and `model_name` describe the embedder the factory will
    /// produce; they are needed before initialization (e.g. to size the
    /// catalog schema) so they are declared up front.
    pub fn new<F, Fut>(dimensions: usize, model_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn Embedder>>> + Send + 'static,
    {
        Self {
            factory: Box::new(move || Box::pin(factory())),
            inner: OnceCell::new(),
            dimensions,
            model_name: model_name.into(),
        }
    }

    async fn get(&self) -> Result<&Arc<dyn Embedder>> {
        // A failed initialization is not cached; the next caller retries.
        self.inner.get_or_try_init(|| (self.factory)()).await
    }

    /// Whether the inner embedder has been built yet
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized()
    }
}

#[async_trait]
impl Embedder for LazyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.get().await?.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
