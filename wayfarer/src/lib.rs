//! # Wayfarer
//!
//! Travel recommendation retrieval and ranking engine. Wayfarer turns a
//! free-text travel request into a ranked, explainable, context-bounded set
//! of candidate travel entities (destinations, lodging properties, lodging
//! categories, amenities) ready to feed a text-generation step.
//!
//! The engine owns the middle of the pipeline: it validates and repairs the
//! structured intent produced by an external language-model analyzer, fans
//! out per-entity-type similarity searches over user-provided embeddings,
//! combines similarity with the user's preference profile and a set of
//! trip-fit heuristics into one composite score per candidate, renders the
//! winners into a bounded text block, and keeps the per-user preference
//! profile up to date from query and interaction signals.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wayfarer::prelude::*;
//! use wayfarer::providers::{EmbeddingProvider, IntentExtractor};
//!
//! # async fn example(
//! #     embedder: Arc<dyn EmbeddingProvider>,
//! #     extractor: Arc<dyn IntentExtractor>,
//! # ) -> wayfarer::Result<()> {
//! let config = ConfigBuilder::new().build()?;
//!
//! let vectors = Arc::new(InMemoryVectorStore::new(config.engine.embedding_dimension));
//! let profiles = Arc::new(InMemoryProfileStore::new());
//!
//! vectors.add_entity(
//!     EntityBuilder::new(EntityType::Destination, "Santorini")
//!         .description("Volcanic island with whitewashed villages")
//!         .tag("beach")
//!         .embedding(vec![0.0; 1024])
//!         .build(),
//! ).await?;
//!
//! let engine = RecommendationEngine::new(config, vectors, profiles, embedder, extractor)?;
//! let recommendation = engine.recommend("user-1", "somewhere warm in May").await?;
//! println!("{}", recommendation.context.text);
//! # Ok(())
//! # }
//! ```
//!
//! ## BYOE (Bring Your Own Embeddings)
//!
//! Wayfarer never calls an embedding model itself. You implement
//! [`providers::EmbeddingProvider`] against your provider of choice
//! (OpenAI, Cohere, a local model) and the engine consumes the vectors as
//! an opaque fixed-dimension black box. The same applies to intent
//! extraction: [`providers::IntentExtractor`] returns the analyzer's raw
//! JSON and the engine defensively normalizes whatever comes back.
//!
//! ## Architecture
//!
//! - **analysis**: defensive normalization of extracted intent
//! - **search**: concurrent per-type similarity search, scoring, ranking
//! - **context**: deterministic bounded context assembly
//! - **preferences**: decaying per-user preference profiles
//! - **storage**: vector/profile store traits plus in-memory backends

pub mod analysis;
pub mod config;
pub mod context;
pub mod core;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod providers;
pub mod search;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    // Re-export the engine facade
    pub use crate::core::{Recommendation, RecommendationEngine};

    // Re-export core initialization functions
    pub use crate::{init, init_with_defaults};

    // Re-export config types
    pub use crate::config::{
        ConfigBuilder, ContextConfig, EngineConfig, LogLevel, PreferenceConfig, RankingWeights,
        WayfarerConfig,
    };

    // Re-export analysis types
    pub use crate::analysis::{QueryAnalysis, QueryNormalizer, SearchTerms, Urgency};

    // Re-export model types
    pub use crate::models::{
        EntityBuilder, EntityType, PreferenceProfile, TravelEntity, UserProfile,
    };

    // Re-export search types for advanced usage
    pub use crate::search::{
        RankedResults, Ranker, ScoreCalculator, ScoreLabel, ScoredCandidate, SimilaritySearch,
    };

    // Re-export storage types for advanced usage
    pub use crate::storage::{
        InMemoryProfileStore, InMemoryVectorStore, ProfileStore, StorageError, VectorStore,
    };

    // Re-export essential result type
    pub use crate::{Result, WayfarerError};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Wayfarer operations with helpful recovery suggestions
#[derive(Debug, thiserror::Error)]
pub enum WayfarerError {
    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error during query analysis
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Error during similarity search
    #[error("Search error: {0}")]
    Search(String),

    /// Error during ranking
    #[error("Ranking error: {0}")]
    Ranking(String),

    /// Error during context assembly
    #[error("Context error: {0}")]
    Context(String),

    /// Error during preference tracking
    #[error("Preference error: {0}")]
    Preference(String),

    /// Error from an external provider (embedding or intent extraction)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Query vector dimensionality does not match the configured dimension.
    ///
    /// This indicates an upstream embedding model/version mismatch, not a
    /// transient condition, so the search stage aborts loudly.
    #[error(
        "Embedding dimension mismatch: expected {expected}, got {actual}. The configured embedding model does not match the vectors in the store; re-embed the corpus or fix engine.embedding_dimension"
    )]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for WayfarerError {
    fn from(err: crate::config::ConfigError) -> Self {
        WayfarerError::Configuration(err.to_string())
    }
}

impl From<crate::storage::StorageError> for WayfarerError {
    fn from(err: crate::storage::StorageError) -> Self {
        WayfarerError::Storage(err.to_string())
    }
}

/// Result type for Wayfarer operations
pub type Result<T> = std::result::Result<T, WayfarerError>;

/// Initialize Wayfarer with default configuration
///
/// Sets up logging and returns the validated default configuration. The
/// caller then wires storage and providers through
/// [`core::RecommendationEngine::new`].
///
/// # Examples
///
/// ```rust
/// use wayfarer::prelude::*;
///
/// fn example() -> wayfarer::Result<()> {
///     let config = wayfarer::init_with_defaults()?;
///     assert_eq!(config.engine.embedding_dimension, 1024);
///     Ok(())
/// }
/// ```
pub fn init_with_defaults() -> Result<config::WayfarerConfig> {
    let config = config::ConfigBuilder::new().build()?;
    init(config)
}

/// Initialize Wayfarer with the provided configuration
///
/// Initializes the logging system from `config.logging` and validates the
/// configuration. Logging initialization is idempotent; if a tracing
/// subscriber is already installed the existing one is kept.
pub fn init(config: config::WayfarerConfig) -> Result<config::WayfarerConfig> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    config
        .validate()
        .map_err(|e| WayfarerError::Configuration(e.to_string()))?;

    Ok(config)
}
