//! Configuration validation.

use super::models::WayfarerConfig;
use super::{ConfigError, Result};

/// Validate a complete configuration, returning the first problem found.
pub fn validate_config(config: &WayfarerConfig) -> Result<()> {
    if config.engine.embedding_dimension == 0 {
        return Err(ConfigError::ValidationError(
            "engine.embedding_dimension must be greater than 0".to_string(),
        ));
    }
    if config.engine.search_limit == 0 {
        return Err(ConfigError::ValidationError(
            "engine.search_limit must be greater than 0".to_string(),
        ));
    }
    for (name, threshold) in [
        ("engine.similarity_threshold", config.engine.similarity_threshold),
        ("engine.related_threshold", config.engine.related_threshold),
        (
            "preferences.confidence_threshold",
            config.preferences.confidence_threshold,
        ),
    ] {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be within [0.0, 1.0], got {}",
                name, threshold
            )));
        }
    }
    if config.engine.search_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "engine.search_timeout_ms must be greater than 0".to_string(),
        ));
    }

    config
        .ranking
        .validate()
        .map_err(ConfigError::ValidationError)?;

    if config.context.max_context_chars == 0 {
        return Err(ConfigError::ValidationError(
            "context.max_context_chars must be greater than 0".to_string(),
        ));
    }
    if config.context.field_clip_chars == 0 {
        return Err(ConfigError::ValidationError(
            "context.field_clip_chars must be greater than 0".to_string(),
        ));
    }
    if config.context.max_destinations == 0 {
        return Err(ConfigError::ValidationError(
            "context.max_destinations must be greater than 0".to_string(),
        ));
    }

    for (name, increment) in [
        ("preferences.query_increment", config.preferences.query_increment),
        (
            "preferences.amenity_interest_increment",
            config.preferences.amenity_interest_increment,
        ),
        ("preferences.view_increment", config.preferences.view_increment),
        (
            "preferences.booking_intent_increment",
            config.preferences.booking_intent_increment,
        ),
    ] {
        if increment < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be >= 0.0, got {}",
                name, increment
            )));
        }
    }
    if config.preferences.decay_window_days <= 0 {
        return Err(ConfigError::ValidationError(
            "preferences.decay_window_days must be greater than 0".to_string(),
        ));
    }
    if config.preferences.budget_history_limit == 0 {
        return Err(ConfigError::ValidationError(
            "preferences.budget_history_limit must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
