//! Recommendation engine
//!
//! Orchestrates the full pipeline: intent extraction and normalization,
//! per-facet embedding, concurrent similarity search, ranking, context
//! assembly and preference tracking. The user always receives some
//! recommendation output under partial failure; the only fatal condition
//! in the pipeline is an embedding dimension mismatch.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::analysis::{follow_up_prompts, QueryAnalysis, QueryNormalizer};
use crate::config::WayfarerConfig;
use crate::context::{ContextAssembler, RagContext};
use crate::models::{EntityType, NormalizedProfile, PreferenceProfile};
use crate::preferences::{InteractionKind, PreferenceTracker};
use crate::providers::{EmbeddingProvider, IntentExtractor};
use crate::search::{
    RankedResults, Ranker, ScoreExplanation, ScoredCandidate, SearchHit, SimilaritySearch,
    TypedQuery,
};
use crate::storage::{ProfileStore, VectorStore};
use crate::{Result, WayfarerError};

/// The output of one recommendation pass
#[derive(Debug, Clone)]
pub struct Recommendation {
    /// The normalized travel intent the pipeline worked from
    pub analysis: QueryAnalysis,

    /// Ranked candidates per entity type
    pub results: RankedResults,

    /// The assembled, bounded context block for the generation step
    pub context: RagContext,

    /// Clarifying questions to ask when too much was unknown
    pub follow_up_prompts: Vec<String>,

    /// Set when ranking fell back to similarity-only ordering
    pub degraded: bool,
}

/// The primary interface for producing travel recommendations.
///
/// `RecommendationEngine` wires the pipeline stages over caller-provided
/// storage and provider implementations. It is stateless per request;
/// per-user preference state lives in the profile store and is passed
/// through explicitly.
#[derive(Clone)]
pub struct RecommendationEngine {
    config: WayfarerConfig,
    normalizer: QueryNormalizer,
    search: SimilaritySearch,
    ranker: Ranker,
    assembler: ContextAssembler,
    tracker: PreferenceTracker,
    vectors: Arc<dyn VectorStore>,
    profiles: Arc<dyn ProfileStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn IntentExtractor>,
}

impl RecommendationEngine {
    /// Create an engine over the given stores and providers
    ///
    /// Returns a configuration error if the ranking weights are invalid.
    pub fn new(
        config: WayfarerConfig,
        vectors: Arc<dyn VectorStore>,
        profiles: Arc<dyn ProfileStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn IntentExtractor>,
    ) -> Result<Self> {
        let ranker = Ranker::new(config.ranking).map_err(WayfarerError::Configuration)?;
        Ok(Self {
            search: SimilaritySearch::new(Arc::clone(&vectors), config.engine.clone()),
            assembler: ContextAssembler::new(config.context.clone()),
            tracker: PreferenceTracker::new(config.preferences.clone()),
            normalizer: QueryNormalizer::new(),
            ranker,
            vectors,
            profiles,
            embedder,
            extractor,
            config,
        })
    }

    /// The engine configuration
    pub fn config(&self) -> &WayfarerConfig {
        &self.config
    }

    /// Produce a recommendation for one user message.
    ///
    /// Partial failures narrow the output instead of failing it: a broken
    /// analyzer response falls back to the default skeleton, a failed
    /// entity-type search contributes nothing for that type, and a scoring
    /// failure degrades ranking to similarity order. Only an embedding
    /// dimension mismatch aborts.
    pub async fn recommend(&self, user_id: &str, message: &str) -> Result<Recommendation> {
        let analysis = self.analyze(message).await;
        let follow_ups = follow_up_prompts(&analysis);

        // Preference tracking is best-effort and feeds this request's own
        // ranking; a failed load or store never fails the request.
        let profile = self.track_query_signals(user_id, &analysis).await;
        let normalized = profile.as_ref().and_then(|p| {
            let view = p.normalized(&self.config.preferences, Utc::now());
            if view.is_empty() {
                None
            } else {
                Some(view)
            }
        });

        let queries = self.build_queries(message, &analysis).await;
        let results = self.search.search_all(queries).await?;
        tracing::debug!(
            hits = results.len(),
            failed = results.failed_types.len(),
            "Similarity search finished"
        );

        let ranked = self.ranker.rank(&results, &analysis, normalized.as_ref());

        let user = match self.profiles.get_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load user profile for context framing");
                None
            }
        };
        let context = self
            .assembler
            .assemble(&ranked, &analysis, user.as_ref(), normalized.as_ref());

        Ok(Recommendation {
            degraded: ranked.degraded,
            analysis,
            context,
            follow_up_prompts: follow_ups,
            results: ranked,
        })
    }

    /// Record an explicit interaction event against a user's profile.
    ///
    /// The storage write is best-effort: a failed write is logged and the
    /// call still succeeds, per the tracking policy.
    pub async fn track_interaction(
        &self,
        user_id: &str,
        kind: InteractionKind,
        entity_id: &str,
    ) -> Result<()> {
        let entity = self
            .vectors
            .get_entity(entity_id)
            .await
            .map_err(|e| WayfarerError::Storage(e.to_string()))?
            .ok_or_else(|| {
                WayfarerError::Storage(format!("entity '{}' not found", entity_id))
            })?;

        let mut profile = self.load_or_create_profile(user_id).await;
        self.tracker.track_interaction(&mut profile, kind, &entity);
        self.store_profile(profile).await;
        Ok(())
    }

    /// Entities related to an existing entity, for "more like this" flows
    pub async fn find_related(
        &self,
        entity_id: &str,
        target_type: EntityType,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        self.search.find_related(entity_id, target_type, limit).await
    }

    /// Explain a scored candidate with the fixed score-range buckets
    pub fn explain(&self, candidate: &ScoredCandidate) -> ScoreExplanation {
        self.ranker.explain(candidate)
    }

    /// The normalized read-side view of a user's preferences
    pub async fn preference_view(&self, user_id: &str) -> Result<Option<NormalizedProfile>> {
        let profile = self
            .profiles
            .get_preferences(user_id)
            .await
            .map_err(|e| WayfarerError::Storage(e.to_string()))?;
        Ok(profile.map(|p| p.normalized(&self.config.preferences, Utc::now())))
    }

    /// Extract and normalize intent; never fails
    async fn analyze(&self, message: &str) -> QueryAnalysis {
        let today = Utc::now().date_naive();
        match self.extractor.extract(message, today).await {
            Ok(raw) => self.normalizer.normalize_str(&raw),
            Err(e) => {
                tracing::warn!(error = %e, "Intent extraction failed; using default analysis");
                QueryAnalysis::default()
            }
        }
    }

    /// Apply the query's facets to the user's profile and persist it,
    /// best-effort. Returns the updated profile for this request's ranking.
    async fn track_query_signals(
        &self,
        user_id: &str,
        analysis: &QueryAnalysis,
    ) -> Option<PreferenceProfile> {
        let mut profile = self.load_or_create_profile(user_id).await;
        self.tracker.track_from_query(&mut profile, analysis);
        self.store_profile(profile.clone()).await;
        Some(profile)
    }

    async fn load_or_create_profile(&self, user_id: &str) -> PreferenceProfile {
        match self.profiles.get_preferences(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => PreferenceProfile::new(user_id),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load preference profile; starting fresh");
                PreferenceProfile::new(user_id)
            }
        }
    }

    async fn store_profile(&self, profile: PreferenceProfile) {
        let user_id = profile.user_id.clone();
        if let Err(e) = self.profiles.put_preferences(profile).await {
            tracing::warn!(user_id, error = %e, "Failed to persist preference profile; continuing");
        }
    }

    /// Build one typed query per entity type from the flattened facet
    /// terms, falling back to the raw message for facets with no terms.
    /// Each distinct text is embedded once.
    async fn build_queries(&self, message: &str, analysis: &QueryAnalysis) -> Vec<TypedQuery> {
        let terms = analysis.search_terms();
        let fallback = message.trim().to_string();

        let per_type: [(EntityType, String); 4] = [
            (
                EntityType::Destination,
                terms.destination.clone().unwrap_or_else(|| fallback.clone()),
            ),
            (
                EntityType::Property,
                terms
                    .accommodation
                    .clone()
                    .or_else(|| terms.destination.clone())
                    .unwrap_or_else(|| fallback.clone()),
            ),
            (
                EntityType::Category,
                terms.accommodation.clone().unwrap_or_else(|| fallback.clone()),
            ),
            (
                EntityType::Amenity,
                terms
                    .amenity
                    .clone()
                    .or_else(|| terms.activity.clone())
                    .unwrap_or_else(|| fallback.clone()),
            ),
        ];

        let mut embedded: HashMap<String, Vec<f32>> = HashMap::new();
        let mut queries = Vec::with_capacity(per_type.len());
        for (entity_type, text) in per_type {
            if text.is_empty() {
                continue;
            }
            let vector = match embedded.get(&text) {
                Some(vector) => Some(vector.clone()),
                None => match self.embedder.embed(&text).await {
                    Ok(vector) => {
                        embedded.insert(text.clone(), vector.clone());
                        Some(vector)
                    }
                    Err(e) => {
                        tracing::warn!(%entity_type, error = %e, "Embedding failed; skipping this entity type");
                        None
                    }
                },
            };
            if let Some(vector) = vector {
                queries.push(TypedQuery {
                    entity_type,
                    vector,
                });
            }
        }

        queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::models::EntityBuilder;
    use crate::providers::{MockEmbeddingProvider, MockIntentExtractor};
    use crate::storage::{InMemoryProfileStore, InMemoryVectorStore};

    const DIM: usize = 4;

    async fn seeded_vectors() -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new(DIM));
        store
            .add_entity(
                EntityBuilder::new(EntityType::Destination, "Santorini")
                    .id("santorini")
                    .tag("beach")
                    .embedding(vec![1.0, 0.0, 0.0, 0.0])
                    .build(),
            )
            .await
            .unwrap();
        store
            .add_entity(
                EntityBuilder::new(EntityType::Property, "Cliffside Suites")
                    .id("suites")
                    .destination_id("santorini")
                    .nightly_rate(280.0)
                    .star_rating(4.5)
                    .embedding(vec![0.9, 0.1, 0.0, 0.0])
                    .build(),
            )
            .await
            .unwrap();
        store
    }

    fn engine_with(
        vectors: Arc<InMemoryVectorStore>,
        raw_intent: &'static str,
    ) -> RecommendationEngine {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed()
            .returning(|_| Ok(vec![1.0, 0.0, 0.0, 0.0]));

        let mut extractor = MockIntentExtractor::new();
        extractor
            .expect_extract()
            .returning(move |_, _| Ok(raw_intent.to_string()));

        let config = ConfigBuilder::new()
            .with_embedding_dimension(DIM)
            .build()
            .unwrap();
        RecommendationEngine::new(
            config,
            vectors,
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(embedder),
            Arc::new(extractor),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_recommend_end_to_end() {
        let engine = engine_with(
            seeded_vectors().await,
            r#"{"destination_preferences":{"destination_types":["beach"]},
                "budget":{"max_per_day":400},
                "travel_dates":{"start_date":"2025-06-01"},
                "traveler_info":{"group_size":2}}"#,
        );

        let recommendation = engine.recommend("u1", "beach trip in June").await.unwrap();
        assert!(!recommendation.degraded);
        assert!(!recommendation.results.destinations.is_empty());
        assert!(recommendation.context.text.contains("Santorini"));
        assert!(recommendation.follow_up_prompts.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_with_broken_extractor_still_answers() {
        let engine = engine_with(seeded_vectors().await, "not json at all");

        let recommendation = engine.recommend("u1", "anything nice").await.unwrap();
        // Default skeleton: everything unknown, so follow-ups are asked.
        assert_eq!(recommendation.follow_up_prompts.len(), 2);
        // Search still ran against the raw message.
        assert!(!recommendation.results.destinations.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_surfaces() {
        let vectors = seeded_vectors().await;
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        let mut extractor = MockIntentExtractor::new();
        extractor.expect_extract().returning(|_, _| Ok("{}".to_string()));

        let config = ConfigBuilder::new()
            .with_embedding_dimension(DIM)
            .build()
            .unwrap();
        let engine = RecommendationEngine::new(
            config,
            vectors,
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(embedder),
            Arc::new(extractor),
        )
        .unwrap();

        let result = engine.recommend("u1", "beach").await;
        assert!(matches!(
            result,
            Err(WayfarerError::EmbeddingDimensionMismatch { expected: DIM, actual: 2 })
        ));
    }

    #[tokio::test]
    async fn test_track_interaction_updates_profile() {
        let vectors = seeded_vectors().await;
        let engine = engine_with(Arc::clone(&vectors), "{}");

        engine
            .track_interaction("u1", InteractionKind::BookingIntent, "santorini")
            .await
            .unwrap();

        let view = engine.preference_view("u1").await.unwrap().unwrap();
        assert_eq!(view.destination_types.get("beach"), Some(&1.0));
    }

    #[tokio::test]
    async fn test_track_interaction_unknown_entity_errors() {
        let engine = engine_with(seeded_vectors().await, "{}");
        let result = engine
            .track_interaction("u1", InteractionKind::DestinationView, "nope")
            .await;
        assert!(result.is_err());
    }
}
