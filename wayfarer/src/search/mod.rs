//! Similarity search and ranking
//!
//! This module owns the retrieval half of the pipeline: issuing
//! independent nearest-neighbor queries per entity type against the vector
//! store, then scoring and ranking whatever comes back. The four per-type
//! queries are side-effect free and mutually independent, so they run
//! concurrently; a slow or failed type contributes an empty list and never
//! blocks the others.

pub mod calculator;
pub mod ranker;
pub mod scoring;

use std::sync::Arc;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::models::{EntityType, TravelEntity};
use crate::storage::VectorStore;
use crate::{Result, WayfarerError};

pub use calculator::ScoreCalculator;
pub use ranker::{RankedResults, Ranker, ScoreExplanation, ScoredCandidate};
pub use scoring::{CriterionScores, RankingWeights, ScoreLabel};

/// One similarity-search hit
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched entity
    pub entity: TravelEntity,

    /// Cosine similarity to the query vector, in [0, 1] for normalized
    /// embeddings
    pub similarity: f32,
}

/// A query vector bound to the entity type it searches
#[derive(Debug, Clone)]
pub struct TypedQuery {
    pub entity_type: EntityType,
    pub vector: Vec<f32>,
}

/// Per-type candidate lists from one search fan-out
#[derive(Debug, Clone, Default)]
pub struct MultiSearchResults {
    pub destinations: Vec<SearchHit>,
    pub properties: Vec<SearchHit>,
    pub categories: Vec<SearchHit>,
    pub amenities: Vec<SearchHit>,

    /// Entity types whose query failed or timed out; their lists are empty
    pub failed_types: Vec<EntityType>,
}

impl MultiSearchResults {
    /// The hits for one entity type
    pub fn for_type(&self, entity_type: EntityType) -> &[SearchHit] {
        match entity_type {
            EntityType::Destination => &self.destinations,
            EntityType::Property => &self.properties,
            EntityType::Category => &self.categories,
            EntityType::Amenity => &self.amenities,
        }
    }

    fn slot(&mut self, entity_type: EntityType) -> &mut Vec<SearchHit> {
        match entity_type {
            EntityType::Destination => &mut self.destinations,
            EntityType::Property => &mut self.properties,
            EntityType::Category => &mut self.categories,
            EntityType::Amenity => &mut self.amenities,
        }
    }

    /// Whether every list is empty
    pub fn is_empty(&self) -> bool {
        EntityType::ALL.iter().all(|t| self.for_type(*t).is_empty())
    }

    /// Total hits across all types
    pub fn len(&self) -> usize {
        EntityType::ALL.iter().map(|t| self.for_type(*t).len()).sum()
    }
}

/// Multi-entity similarity search over a vector store
#[derive(Debug, Clone)]
pub struct SimilaritySearch {
    store: Arc<dyn VectorStore>,
    config: EngineConfig,
}

impl SimilaritySearch {
    /// Create a searcher over the given store
    pub fn new(store: Arc<dyn VectorStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Run one search per typed query, concurrently.
    ///
    /// Every query vector is validated against the configured embedding
    /// dimension before fan-out; a mismatch is a fatal configuration error
    /// (it indicates an upstream model/version mismatch) and aborts the
    /// whole search stage. Per-type store errors and timeouts, by
    /// contrast, are logged and reduce to an empty list for that type.
    pub async fn search_all(&self, queries: Vec<TypedQuery>) -> Result<MultiSearchResults> {
        for query in &queries {
            self.check_dimension(&query.vector)?;
        }

        let timeout = Duration::from_millis(self.config.search_timeout_ms);
        let handles: Vec<_> = queries
            .into_iter()
            .map(|query| {
                let store = Arc::clone(&self.store);
                let limit = self.config.search_limit;
                let threshold = self.config.similarity_threshold;
                let entity_type = query.entity_type;
                let handle = tokio::spawn(async move {
                    tokio::time::timeout(
                        timeout,
                        store.search_similar(entity_type, &query.vector, limit, threshold),
                    )
                    .await
                });
                (entity_type, handle)
            })
            .collect();

        let joined = futures::future::join_all(
            handles
                .into_iter()
                .map(|(entity_type, handle)| async move { (entity_type, handle.await) }),
        )
        .await;

        let mut results = MultiSearchResults::default();
        for (entity_type, outcome) in joined {
            match outcome {
                Ok(Ok(Ok(hits))) => {
                    tracing::debug!(%entity_type, hits = hits.len(), "Similarity search completed");
                    *results.slot(entity_type) = hits
                        .into_iter()
                        .map(|(entity, similarity)| SearchHit { entity, similarity })
                        .collect();
                }
                Ok(Ok(Err(e))) => {
                    tracing::warn!(%entity_type, error = %e, "Similarity search failed; continuing with empty results for this type");
                    results.failed_types.push(entity_type);
                }
                Ok(Err(_elapsed)) => {
                    tracing::warn!(%entity_type, timeout_ms = self.config.search_timeout_ms, "Similarity search timed out; continuing with empty results for this type");
                    results.failed_types.push(entity_type);
                }
                Err(e) => {
                    tracing::warn!(%entity_type, error = %e, "Similarity search task panicked; continuing with empty results for this type");
                    results.failed_types.push(entity_type);
                }
            }
        }

        Ok(results)
    }

    /// Single-type search with explicit parameters
    pub async fn search_one(
        &self,
        entity_type: EntityType,
        query_vector: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchHit>> {
        self.check_dimension(query_vector)?;
        let hits = self
            .store
            .search_similar(entity_type, query_vector, limit, threshold)
            .await
            .map_err(|e| WayfarerError::Search(e.to_string()))?;
        Ok(hits
            .into_iter()
            .map(|(entity, similarity)| SearchHit { entity, similarity })
            .collect())
    }

    /// Entity-to-entity variant: related entities of `target_type`, above
    /// the stricter related threshold, excluding the source entity itself.
    pub async fn find_related(
        &self,
        entity_id: &str,
        target_type: EntityType,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let hits = self
            .store
            .find_related(entity_id, target_type, limit, self.config.related_threshold)
            .await
            .map_err(|e| WayfarerError::Search(e.to_string()))?;
        Ok(hits
            .into_iter()
            .map(|(entity, similarity)| SearchHit { entity, similarity })
            .collect())
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.config.embedding_dimension {
            return Err(WayfarerError::EmbeddingDimensionMismatch {
                expected: self.config.embedding_dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}
