//! Package ingestion
//!
//! A package enters the catalog through the indexer: its descriptive fields
//! are rendered to text, embedded, and stored together with the record. A
//! package is never visible to search without its vector.

use crate::catalog::Catalog;
use crate::config::PriceBands;
use crate::error::{Result, RoamlyError};
use crate::llm::Embedder;
use crate::package::{NewPackage, Package};
use crate::synthesis::synthesize_description;
use std::sync::Arc;

/// Ingestion-side indexer
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    bands: PriceBands,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>, bands: PriceBands) -> Self {
        Self { embedder, bands }
    }

    /// Ingest a new package: validate, synthesize, embed, store.
    pub async fn ingest(&self, catalog: &Catalog, new_package: NewPackage) -> Result<Package> {
        new_package.validate()?;

        let package = new_package.into_package(0, Vec::new());
        let embedding = self.embed_description(&package).await?;
        let package = Package {
            embedding,
            ..package
        };

        catalog.insert(package, self.embedder.model_name())
    }

    /// Regenerate the embedding for an already-stored package.
    ///
    /// Must be called after descriptive fields change; a plain catalog
    /// update without reindexing leaves the stored vector stale.
    pub async fn reindex(&self, catalog: &Catalog, id: i64) -> Result<Package> {
        let mut package = catalog.get(id)?;
        package.embedding = self.embed_description(&package).await?;
        catalog.update(&package, self.embedder.model_name())?;
        Ok(package)
    }

    async fn embed_description(&self, package: &Package) -> Result<Vec<f32>> {
        let text = synthesize_description(package, &self.bands);
        tracing::debug!(title = %package.title, "Embedding package description");

        let embedding = self.embedder.embed(&text).await?;
        if embedding.len() != self.embedder.dimensions() {
            return Err(RoamlyError::EmbeddingUnavailable(format!(
                "embedder returned {} dimensions, expected {}",
                embedding.len(),
                self.embedder.dimensions()
            )));
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder: one dimension per known keyword.
    struct KeywordEmbedder;

    const KEYWORDS: &[&str] = &["beach", "goa", "relax", "mountain"];

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            let mut v: Vec<f32> = KEYWORDS
                .iter()
                .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
                .collect();
            crate::catalog::normalize(&mut v);
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            KEYWORDS.len()
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }

    fn goa() -> NewPackage {
        NewPackage {
            title: "Goa Beach Getaway".into(),
            description: "Sun and sand.".into(),
            price: 8000.0,
            duration_days: 4,
            seats: 20,
            category: "beach".into(),
            location: None,
            tags: vec!["relaxation".into()],
            is_international: false,
            available_dates: vec![],
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_ingest_stores_embedding_with_record() {
        let catalog = Catalog::open_in_memory().unwrap();
        let indexer = Indexer::new(Arc::new(KeywordEmbedder), PriceBands::default());

        let stored = indexer.ingest(&catalog, goa()).await.unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.embedding.len(), KEYWORDS.len());

        let fetched = catalog.get(stored.id).unwrap();
        assert_eq!(fetched.embedding, stored.embedding);
        // beach, goa and relax all appear in the synthesized text
        assert!(fetched.embedding[0] > 0.0);
        assert!(fetched.embedding[1] > 0.0);
        assert!(fetched.embedding[2] > 0.0);
        assert_eq!(fetched.embedding[3], 0.0);
    }

    #[tokio::test]
    async fn test_ingest_rejects_invalid_package() {
        let catalog = Catalog::open_in_memory().unwrap();
        let indexer = Indexer::new(Arc::new(KeywordEmbedder), PriceBands::default());

        let mut bad = goa();
        bad.title = "  ".into();
        assert!(indexer.ingest(&catalog, bad).await.is_err());
        assert_eq!(catalog.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reindex_follows_field_edits() {
        let catalog = Catalog::open_in_memory().unwrap();
        let indexer = Indexer::new(Arc::new(KeywordEmbedder), PriceBands::default());

        let stored = indexer.ingest(&catalog, goa()).await.unwrap();
        let mut edited = stored.clone();
        edited.title = "Himalayan Mountain Trek".into();
        edited.description = "High altitude hiking.".into();
        edited.tags = vec!["trekking".into()];
        edited.category = "adventure".into();
        catalog.update(&edited, "keyword-test").unwrap();

        // The stored vector is stale until reindexed
        let stale = catalog.get(stored.id).unwrap();
        assert!(stale.embedding[0] > 0.0);

        let refreshed = indexer.reindex(&catalog, stored.id).await.unwrap();
        assert_eq!(refreshed.embedding[0], 0.0);
        assert!(refreshed.embedding[3] > 0.0);
    }
}
