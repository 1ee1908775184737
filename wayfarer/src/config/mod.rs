//! Configuration system for Wayfarer.
//!
//! This module provides a flexible configuration system that supports
//! loading configuration from multiple sources (files, environment
//! variables, etc.) with proper validation and defaults.

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

// The ranking weights live beside the scoring code but are configured here.
pub use crate::search::scoring::RankingWeights;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "wayfarer.toml",
    "wayfarer.yaml",
    "wayfarer.yml",
    "wayfarer.json",
    ".wayfarer/config.toml",
    ".wayfarer/config.yaml",
    ".wayfarer/config.yml",
    ".wayfarer/config.json",
];

/// Environment variable prefix for Wayfarer configuration
pub const ENV_PREFIX: &str = "WAYFARER_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),

    /// General error
    #[error("{0}")]
    Other(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
