//! Engine facade for Wayfarer
//!
//! This module provides the primary interface for turning a free-text
//! travel request into a ranked, context-bounded recommendation.

pub mod engine;

pub use engine::{Recommendation, RecommendationEngine};
