//! End-to-end "suggest packages" orchestration
//!
//! Sequences query validation, query transformation, embedding, vector
//! search and reply composition. Transformation and composition recover
//! locally; embedding and search are load-bearing and propagate, with no
//! partial results.

use super::{ScoredPackage, VectorSearchEngine};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Result, RoamlyError};
use crate::llm::{Embedder, FilterParser, LLMClient, QueryTransformer, ResponseComposer};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one suggest request
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// The raw query as received (trimmed)
    pub query: String,
    pub results_count: usize,
    pub results: Vec<ScoredPackage>,
    /// Conversational reply; non-empty even when nothing matched
    pub suggestion: String,
}

/// The suggest pipeline
pub struct SuggestEngine {
    embedder: Arc<dyn Embedder>,
    transformer: QueryTransformer,
    composer: ResponseComposer,
    engine: VectorSearchEngine,
}

impl SuggestEngine {
    /// Wire the pipeline from an embedder, a chat client and configuration
    pub fn new(embedder: Arc<dyn Embedder>, client: Arc<dyn LLMClient>, config: &Config) -> Self {
        Self {
            embedder,
            transformer: QueryTransformer::new(client.clone()),
            composer: ResponseComposer::new(client.clone()),
            engine: VectorSearchEngine::new(config.search.clone())
                .with_filter_parser(FilterParser::new(client)),
        }
    }

    /// Construct with explicit components (tests, custom wiring)
    pub fn from_parts(
        embedder: Arc<dyn Embedder>,
        transformer: QueryTransformer,
        composer: ResponseComposer,
        engine: VectorSearchEngine,
    ) -> Self {
        Self {
            embedder,
            transformer,
            composer,
            engine,
        }
    }

    /// Suggest packages for a natural-language query.
    ///
    /// Validation happens before any external call. The vector search is
    /// intentionally handed the ORIGINAL raw query: filter derivation should
    /// reflect the user's literal intent, while the embedding benefits from
    /// the transformed text. "No match" is a valid outcome with a non-empty
    /// `suggestion`, not an error.
    pub async fn suggest(&self, catalog: &Catalog, raw_query: &str) -> Result<Suggestion> {
        let raw_query = raw_query.trim();
        if raw_query.is_empty() {
            return Err(RoamlyError::InvalidQuery(
                "query must be a non-empty string".into(),
            ));
        }

        let transformed = self.transformer.transform(raw_query).await;
        tracing::debug!(query = raw_query, expanded = %transformed, "Expanded query");

        let query_embedding = self
            .embedder
            .embed(&transformed)
            .await
            .map_err(classify_embed_error)?;

        let results = self
            .engine
            .search(catalog, &query_embedding, raw_query)
            .await?;
        tracing::debug!(count = results.len(), "Vector search complete");

        let suggestion = self.composer.compose(raw_query, &results).await;

        Ok(Suggestion {
            query: raw_query.to_string(),
            results_count: results.len(),
            results,
            suggestion,
        })
    }
}

/// Any failure of the embedding step is an embedding-availability problem
/// for error-classification purposes, whatever the underlying cause.
fn classify_embed_error(e: RoamlyError) -> RoamlyError {
    match e {
        RoamlyError::EmbeddingUnavailable(_) => e,
        other => RoamlyError::EmbeddingUnavailable(other.to_string()),
    }
}
