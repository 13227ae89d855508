//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration (embeddings + chat completions)
    #[serde(default)]
    pub llm: LLMServiceConfig,

    /// Search tuning (thresholds, limits)
    #[serde(default)]
    pub search: SearchConfig,

    /// Price band thresholds used by description synthesis
    #[serde(default)]
    pub pricing: PriceBands,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (query transform, filter derivation,
    /// reply composition)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds, enforced per external call
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("ROAMLY_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("ROAMLY_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("ROAMLY_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_embedding_dimensions),
            api_key: std::env::var("ROAMLY_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("ROAMLY_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("ROAMLY_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_timeout() -> u64 {
    30
}

/// Search tuning knobs.
///
/// `min_score` is the primary relevance/precision lever; results scoring
/// below it are dropped rather than padded into the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of results returned to the caller
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Minimum cosine similarity (0.0 - 1.0) for a package to count as a match
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Candidate pool size as a multiple of `limit`, retrieved before
    /// filtering so the structured filter cannot starve the result set
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,
}

impl SearchConfig {
    /// Number of nearest-neighbor candidates to retrieve before filtering
    pub fn candidate_pool(&self) -> usize {
        self.limit * self.candidate_multiplier.max(1)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_score: default_min_score(),
            candidate_multiplier: default_candidate_multiplier(),
        }
    }
}

fn default_limit() -> usize {
    10
}

fn default_min_score() -> f32 {
    0.65
}

fn default_candidate_multiplier() -> usize {
    5
}

/// Price band thresholds for qualitative price sentences.
///
/// A price `p` falls into: budget (`p < budget_max`), moderate
/// (`p < moderate_max`), premium (`p < premium_max`), luxury (otherwise).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBands {
    #[serde(default = "default_budget_max")]
    pub budget_max: f64,

    #[serde(default = "default_moderate_max")]
    pub moderate_max: f64,

    #[serde(default = "default_premium_max")]
    pub premium_max: f64,
}

impl Default for PriceBands {
    fn default() -> Self {
        Self {
            budget_max: default_budget_max(),
            moderate_max: default_moderate_max(),
            premium_max: default_premium_max(),
        }
    }
}

fn default_budget_max() -> f64 {
    5000.0
}

fn default_moderate_max() -> f64 {
    15000.0
}

fn default_premium_max() -> f64 {
    50000.0
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yaml")
    }
}
