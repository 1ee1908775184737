//! Configuration model definitions.
//!
//! This module contains the configuration structures for all Wayfarer
//! components.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::search::scoring::RankingWeights;

/// Main configuration structure for Wayfarer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WayfarerConfig {
    /// Engine and similarity-search configuration
    pub engine: EngineConfig,

    /// Ranking criterion weights
    pub ranking: RankingWeights,

    /// Context assembly configuration
    pub context: ContextConfig,

    /// Preference tracking configuration
    pub preferences: PreferenceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl WayfarerConfig {
    /// Validate the whole configuration
    pub fn validate(&self) -> super::Result<()> {
        super::validation::validate_config(self)
    }
}

/// Engine-level and similarity-search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Embedding dimension D; constant across the whole system.
    ///
    /// A query vector of any other size is a fatal configuration error.
    pub embedding_dimension: usize,

    /// Maximum candidates returned per entity type
    pub search_limit: usize,

    /// Minimum similarity for a candidate to be returned at all
    pub similarity_threshold: f32,

    /// Minimum similarity for the entity-to-entity variant, typically
    /// stricter than the query threshold
    pub related_threshold: f32,

    /// Overall timeout for the concurrent per-type search fan-out
    pub search_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embedding_dimension: 1024,
            search_limit: 12,
            similarity_threshold: 0.25,
            related_threshold: 0.6,
            search_timeout_ms: 2_000,
        }
    }
}

/// Context assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Overall character budget for the assembled context block
    pub max_context_chars: usize,

    /// Per-field clip budget for long free text such as descriptions
    pub field_clip_chars: usize,

    /// Maximum destinations rendered
    pub max_destinations: usize,

    /// Maximum properties nested under each destination
    pub max_properties_per_destination: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 6_000,
            field_clip_chars: 240,
            max_destinations: 8,
            max_properties_per_destination: 4,
        }
    }
}

/// Preference tracking configuration.
///
/// The increments encode the signal hierarchy: booking intent weighs more
/// than viewing a destination or property, which weighs more than showing
/// interest in an amenity, which weighs more than a term merely appearing
/// in a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    /// Increment applied per facet mention in a normalized query
    pub query_increment: f32,

    /// Increment for showing interest in an amenity
    pub amenity_interest_increment: f32,

    /// Increment for viewing a destination or property
    pub view_increment: f32,

    /// Increment for expressing booking intent
    pub booking_intent_increment: f32,

    /// Minimum normalized weight for a signal to appear on read
    pub confidence_threshold: f32,

    /// Days after which an entry's weight is stepped down before
    /// normalization
    pub decay_window_days: i64,

    /// How many recent budget figures are retained
    pub budget_history_limit: usize,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            query_increment: 1.0,
            amenity_interest_increment: 2.0,
            view_increment: 3.0,
            booking_intent_increment: 5.0,
            confidence_threshold: 0.3,
            decay_window_days: 90,
            budget_history_limit: 20,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to emit
    pub level: LogLevel,

    /// Output format
    pub format: LogFormat,

    /// Whether to log to stdout
    pub stdout: bool,

    /// Optional log file path
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            stdout: true,
            file: None,
        }
    }
}

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// Single-line output
    Compact,
    /// Structured JSON output
    Json,
}
