//! Error types for roamly

use thiserror::Error;

/// Result type alias using RoamlyError
pub type Result<T> = std::result::Result<T, RoamlyError>;

/// Error type alias for convenience
pub type Error = RoamlyError;

/// Main error type for roamly
#[derive(Debug, Error)]
pub enum RoamlyError {
    /// Empty or whitespace-only search query. User error, maps to HTTP 400.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The embedding model endpoint is unreachable or returned malformed
    /// output. Infrastructure error; safe to retry the whole request.
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The catalog vector query failed. Infrastructure error.
    #[error("Search error: {0}")]
    Search(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Package not found: {0}")]
    PackageNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RoamlyError {
    /// Stable category string for operator-facing diagnostics.
    ///
    /// The suggest pipeline distinguishes embedding failures from search
    /// failures from user errors; everything else is reported as generic.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
            Self::Search(_) | Self::Database(_) => "SEARCH_EXECUTION_FAILED",
            Self::PackageNotFound(_) => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure originates from the caller's input rather than
    /// from infrastructure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidQuery(_) | Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            RoamlyError::InvalidQuery("empty".into()).category(),
            "INVALID_QUERY"
        );
        assert_eq!(
            RoamlyError::EmbeddingUnavailable("down".into()).category(),
            "EMBEDDING_UNAVAILABLE"
        );
        assert_eq!(
            RoamlyError::Search("index".into()).category(),
            "SEARCH_EXECUTION_FAILED"
        );
        assert_eq!(
            RoamlyError::Llm("prompt".into()).category(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_user_error_flag() {
        assert!(RoamlyError::InvalidQuery("".into()).is_user_error());
        assert!(!RoamlyError::Search("".into()).is_user_error());
    }
}
