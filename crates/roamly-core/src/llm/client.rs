//! HTTP client for external LLM services (vLLM, OpenAI-compatible gateways)

use crate::config::LLMServiceConfig;
use crate::error::{Result, RoamlyError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Generate embedding for text.
    ///
    /// Failures are classified as `EmbeddingUnavailable` so the orchestrator
    /// can distinguish them from application logic errors.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimensions
    fn embedding_dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// API request counters for monitoring
#[derive(Debug, Default)]
struct ApiMetrics {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    cache_hits: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub cache_hits: u64,
}

/// OpenAI-compatible HTTP client.
///
/// Talks to `/v1/chat/completions` and `/v1/embeddings`; the embeddings
/// endpoint may live at a different base URL. Every request honors the
/// configured timeout, and a timed-out call surfaces as the same failure as
/// an unreachable service.
pub struct OpenAIClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    cache: Arc<super::cache::LlmCache>,
    metrics: ApiMetrics,
}

impl OpenAIClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RoamlyError::Http)?;

        Ok(Self {
            http_client,
            config,
            cache: Arc::new(super::cache::LlmCache::new()),
            metrics: ApiMetrics::default(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.metrics.total_requests.load(Ordering::Relaxed),
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            cache_hits: self.metrics.cache_hits.load(Ordering::Relaxed),
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            req.header("Authorization", format!("Bearer {}", api_key))
        } else {
            req
        }
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let messages_json = serde_json::to_string(&messages).unwrap_or_default();
        let cache_key = super::cache::chat_cache_key(&self.config.model, &messages_json);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("Cache hit for chat completion");
            self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }

        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.7,
            max_tokens: 512,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);
        let req = self.authorize(self.http_client.post(&url).json(&request));

        let response = req.send().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            RoamlyError::Http(e)
        })?;

        if !response.status().is_success() {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RoamlyError::Llm(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            RoamlyError::Http(e)
        })?;

        let content = chat_response
            .choices
            .first()
            .ok_or_else(|| {
                self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
                RoamlyError::Llm("No response from LLM".to_string())
            })?
            .message
            .content
            .clone();

        self.cache.set(cache_key, content.clone());
        Ok(content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let cache_key = super::cache::embedding_cache_key(&self.config.embedding_model, text);
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(embedding) = serde_json::from_str::<Vec<f32>>(&cached) {
                self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(embedding);
            }
        }

        #[derive(Serialize)]
        struct EmbedRequest {
            model: String,
            input: Vec<String>,
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: self.config.embedding_model.clone(),
            input: vec![text.to_string()],
        };

        let url = format!("{}/v1/embeddings", self.config.embeddings_url());
        let req = self.authorize(self.http_client.post(&url).json(&request));

        let response = req.send().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            RoamlyError::EmbeddingUnavailable(format!("request failed: {}", e))
        })?;

        if !response.status().is_success() {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RoamlyError::EmbeddingUnavailable(format!(
                "embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            RoamlyError::EmbeddingUnavailable(format!("malformed response: {}", e))
        })?;

        let embedding = embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
                RoamlyError::EmbeddingUnavailable("no embedding returned".to_string())
            })?;

        if let Ok(json) = serde_json::to_string(&embedding) {
            self.cache.set(cache_key, json);
        }

        Ok(embedding)
    }

    fn embedding_dimensions(&self) -> usize {
        self.config.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hanging_config(timeout_secs: u64) -> (std::net::TcpListener, LLMServiceConfig) {
        // Bound but never accepted: connections sit in the backlog and the
        // request hangs until the client timeout fires.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let config = LLMServiceConfig {
            url: format!("http://{}", addr),
            model: "chat-test".to_string(),
            embedding_url: None,
            embedding_model: "embed-test".to_string(),
            embedding_dimensions: 4,
            api_key: None,
            timeout_secs,
        };
        (listener, config)
    }

    #[tokio::test]
    async fn test_embed_timeout_is_classified_as_unavailable() {
        let (_listener, config) = hanging_config(1);
        let client = OpenAIClient::new(config).unwrap();

        let err = client.embed("relaxing beach trip").await.unwrap_err();
        assert!(matches!(err, RoamlyError::EmbeddingUnavailable(_)));
        assert_eq!(err.category(), "EMBEDDING_UNAVAILABLE");
        assert_eq!(client.metrics().total_errors, 1);
    }
}
