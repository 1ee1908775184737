//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use std::path::Path;

use super::models::*;
use super::{validation, Result};
use crate::search::scoring::RankingWeights;

/// Builder for creating WayfarerConfig instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: WayfarerConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: WayfarerConfig::default(),
        }
    }

    /// Set the embedding dimension D.
    pub fn with_embedding_dimension(mut self, dimension: usize) -> Self {
        self.config.engine.embedding_dimension = dimension;
        self
    }

    /// Set the per-type search result limit.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.config.engine.search_limit = limit;
        self
    }

    /// Set the minimum similarity for search candidates.
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.engine.similarity_threshold = threshold;
        self
    }

    /// Set the overall timeout for the per-type search fan-out.
    pub fn with_search_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.engine.search_timeout_ms = timeout_ms;
        self
    }

    /// Replace the ranking weights.
    pub fn with_ranking_weights(mut self, weights: RankingWeights) -> Self {
        self.config.ranking = weights;
        self
    }

    /// Set the overall context character budget.
    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.config.context.max_context_chars = chars;
        self
    }

    /// Set the preference confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.config.preferences.confidence_threshold = threshold;
        self
    }

    /// Set the preference decay window in days.
    pub fn with_decay_window_days(mut self, days: i64) -> Self {
        self.config.preferences.decay_window_days = days;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Log to the given file instead of stdout.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self.config.logging.stdout = false;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<WayfarerConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}
