//! HTTP-based embedder using an external inference service

use super::{Embedder, LLMClient};
use crate::config::LLMServiceConfig;
use crate::error::{Result, RoamlyError};
use async_trait::async_trait;
use std::sync::Arc;

/// Maximum input length in bytes sent to the embedding endpoint. The model
/// would silently truncate anyway; truncating client-side makes the policy
/// explicit. Callers must not assume full-text coverage for longer inputs.
pub const MAX_EMBED_CHARS: usize = 8000;

/// Embedder over an external HTTP service.
///
/// Always returns L2-normalized vectors, so cosine similarity over catalog
/// embeddings reduces to a dot product regardless of whether the underlying
/// model normalizes its output.
pub struct HttpEmbedder {
    client: Arc<dyn LLMClient>,
}

impl HttpEmbedder {
    /// Create from an LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let client = super::OpenAIClient::new(config)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = truncate_utf8(text, MAX_EMBED_CHARS);
        let mut embedding = self.client.embed(text).await?;

        if embedding.len() != self.client.embedding_dimensions() {
            return Err(RoamlyError::EmbeddingUnavailable(format!(
                "model returned {} dimensions, expected {}",
                embedding.len(),
                self.client.embedding_dimensions()
            )));
        }

        crate::catalog::normalize(&mut embedding);
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.client.embedding_dimensions()
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

/// Truncate to at most `max_bytes`, backing up to a char boundary
fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_utf8("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        let truncated = truncate_utf8(text, 2);
        assert!(truncated.len() <= 2);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_truncate_long_text() {
        let text = "a".repeat(MAX_EMBED_CHARS + 100);
        assert_eq!(truncate_utf8(&text, MAX_EMBED_CHARS).len(), MAX_EMBED_CHARS);
    }
}
