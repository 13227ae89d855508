//! Vector similarity search over the package catalog

use super::ScoredPackage;
use crate::catalog::{cosine_similarity, Catalog};
use crate::config::SearchConfig;
use crate::error::{Result, RoamlyError};
use crate::llm::{FilterParser, PackageFilter};

/// Similarity search engine.
///
/// Scores every catalog embedding against the query vector, keeps a
/// candidate pool larger than the final limit, optionally narrows it with a
/// structured filter derived from the raw query, then applies the score
/// threshold and truncates.
pub struct VectorSearchEngine {
    options: SearchConfig,
    filter_parser: Option<FilterParser>,
}

impl VectorSearchEngine {
    /// Create an engine with the given tuning
    pub fn new(options: SearchConfig) -> Self {
        Self {
            options,
            filter_parser: None,
        }
    }

    /// Enable LLM-derived structured filtering of candidates
    pub fn with_filter_parser(mut self, parser: FilterParser) -> Self {
        self.filter_parser = Some(parser);
        self
    }

    /// Search the catalog.
    ///
    /// `raw_query` feeds the filter-derivation step and intentionally stays
    /// the user's literal text even when the embedding came from transformed
    /// text. An empty catalog or all candidates below threshold yields an
    /// empty result, not an error.
    pub async fn search(
        &self,
        catalog: &Catalog,
        query_embedding: &[f32],
        raw_query: &str,
    ) -> Result<Vec<ScoredPackage>> {
        let embeddings = catalog
            .embeddings()
            .map_err(|e| RoamlyError::Search(format!("failed to load catalog vectors: {}", e)))?;

        if embeddings.is_empty() {
            return Ok(Vec::new());
        }

        // Score everything; ties keep catalog insertion order (stable sort).
        let mut scored: Vec<(i64, f32)> = embeddings
            .iter()
            .map(|(id, embedding)| (*id, cosine_similarity(query_embedding, embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.options.candidate_pool());

        // Filter derivation degrades to "no filter" on any model failure.
        let filter = match &self.filter_parser {
            Some(parser) => parser.derive(raw_query).await,
            None => PackageFilter::default(),
        };
        if !filter.is_empty() {
            tracing::debug!(?filter, "Applying structured filter to candidates");
        }

        let mut results = Vec::new();
        for (id, score) in scored {
            if score < self.options.min_score {
                // Candidates are sorted descending; nothing below passes.
                break;
            }
            let package = catalog
                .get(id)
                .map_err(|e| RoamlyError::Search(format!("failed to load package {}: {}", id, e)))?;
            if !filter.matches(&package) {
                continue;
            }
            results.push(ScoredPackage { package, score });
            if results.len() >= self.options.limit {
                break;
            }
        }

        Ok(results)
    }
}
