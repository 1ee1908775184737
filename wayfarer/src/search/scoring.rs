//! Ranking weight configuration and score vocabulary
//!
//! This module provides configurable weighting for the six ranking
//! criteria, the per-candidate criterion score vector, and the fixed
//! score-range buckets used for explanations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Neutral similarity used when a candidate arrives without one
pub const NEUTRAL_SIMILARITY: f32 = 0.5;

/// Neutral preference score when no profile or no match exists
pub const NEUTRAL_PREFERENCE: f32 = 0.5;

/// Neutral popularity when nothing about a candidate's draw is known
pub const NEUTRAL_POPULARITY: f32 = 0.5;

/// Neutral budget fit when no budget was stated
pub const NEUTRAL_BUDGET: f32 = 0.7;

/// Neutral temporal fit when season or seasonal profile is unknown
pub const NEUTRAL_TEMPORAL: f32 = 0.7;

/// Tolerance for the weights-sum-to-one invariant
const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

/// Weights for combining the six ranking criteria
///
/// The composite score is the weighted sum of the criterion scores, so the
/// weights must sum to 1.0. Callers may override the defaults; `validate`
/// enforces the invariant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingWeights {
    /// Weight for raw semantic similarity from vector search. Default: 0.40
    pub semantic_similarity: f32,

    /// Weight for the user's preference profile match. Default: 0.25
    pub user_preference: f32,

    /// Weight for the candidate's intrinsic popularity. Default: 0.15
    pub popularity: f32,

    /// Weight for budget fit against the requested budget. Default: 0.10
    pub budget_match: f32,

    /// Weight for seasonal fit against the travel window. Default: 0.05
    pub temporal_relevance: f32,

    /// Weight for the urgency-based availability heuristic. Default: 0.05
    pub availability: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            semantic_similarity: 0.40,
            user_preference: 0.25,
            popularity: 0.15,
            budget_match: 0.10,
            temporal_relevance: 0.05,
            availability: 0.05,
        }
    }
}

impl RankingWeights {
    /// Create the default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Weights leaning hard on semantic similarity
    ///
    /// Useful for cold-start users with no preference history.
    pub fn similarity_focused() -> Self {
        Self {
            semantic_similarity: 0.60,
            user_preference: 0.10,
            popularity: 0.15,
            budget_match: 0.05,
            temporal_relevance: 0.05,
            availability: 0.05,
        }
    }

    /// Weights leaning on the learned preference profile
    ///
    /// Useful for returning users with a rich interaction history.
    pub fn preference_focused() -> Self {
        Self {
            semantic_similarity: 0.25,
            user_preference: 0.45,
            popularity: 0.10,
            budget_match: 0.10,
            temporal_relevance: 0.05,
            availability: 0.05,
        }
    }

    /// Weights emphasising budget fit for price-sensitive flows
    pub fn budget_focused() -> Self {
        Self {
            semantic_similarity: 0.30,
            user_preference: 0.15,
            popularity: 0.10,
            budget_match: 0.35,
            temporal_relevance: 0.05,
            availability: 0.05,
        }
    }

    /// Sum of all six weights
    pub fn sum(&self) -> f32 {
        self.semantic_similarity
            + self.user_preference
            + self.popularity
            + self.budget_match
            + self.temporal_relevance
            + self.availability
    }

    /// Validate the configuration
    ///
    /// Returns an error if any weight is negative or the weights do not
    /// sum to 1.0 within tolerance.
    pub fn validate(&self) -> Result<(), String> {
        for (name, weight) in [
            ("semantic_similarity", self.semantic_similarity),
            ("user_preference", self.user_preference),
            ("popularity", self.popularity),
            ("budget_match", self.budget_match),
            ("temporal_relevance", self.temporal_relevance),
            ("availability", self.availability),
        ] {
            if weight < 0.0 {
                return Err(format!("{} weight must be >= 0.0", name));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("ranking weights must sum to 1.0, got {}", sum));
        }

        Ok(())
    }
}

/// Per-criterion scores for one candidate, each in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CriterionScores {
    /// Similarity from vector search
    pub semantic_similarity: f32,

    /// Normalized preference profile match
    pub user_preference: f32,

    /// Intrinsic popularity signal
    pub popularity: f32,

    /// Fit against the requested budget
    pub budget_match: f32,

    /// Seasonal fit against the travel window
    pub temporal_relevance: f32,

    /// Urgency-based availability heuristic
    pub availability: f32,
}

impl CriterionScores {
    /// Neutral scores for every criterion
    pub fn neutral() -> Self {
        Self {
            semantic_similarity: NEUTRAL_SIMILARITY,
            user_preference: NEUTRAL_PREFERENCE,
            popularity: NEUTRAL_POPULARITY,
            budget_match: NEUTRAL_BUDGET,
            temporal_relevance: NEUTRAL_TEMPORAL,
            availability: NEUTRAL_TEMPORAL,
        }
    }

    /// The composite score: the exact weighted sum of the six criteria
    pub fn composite(&self, weights: &RankingWeights) -> f32 {
        self.semantic_similarity * weights.semantic_similarity
            + self.user_preference * weights.user_preference
            + self.popularity * weights.popularity
            + self.budget_match * weights.budget_match
            + self.temporal_relevance * weights.temporal_relevance
            + self.availability * weights.availability
    }

    /// Whether every score is finite and within [0, 1]
    pub fn is_well_formed(&self) -> bool {
        [
            self.semantic_similarity,
            self.user_preference,
            self.popularity,
            self.budget_match,
            self.temporal_relevance,
            self.availability,
        ]
        .iter()
        .all(|s| s.is_finite() && (0.0..=1.0).contains(s))
    }
}

/// Human-readable label for a criterion score, from fixed buckets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScoreLabel {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

impl ScoreLabel {
    /// Bucket a score: >= 0.8 very positive, >= 0.6 positive, >= 0.4
    /// neutral, >= 0.2 negative, below that very negative.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            Self::VeryPositive
        } else if score >= 0.6 {
            Self::Positive
        } else if score >= 0.4 {
            Self::Neutral
        } else if score >= 0.2 {
            Self::Negative
        } else {
            Self::VeryNegative
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryPositive => write!(f, "Very Positive"),
            Self::Positive => write!(f, "Positive"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Negative => write!(f, "Negative"),
            Self::VeryNegative => write!(f, "Very Negative"),
        }
    }
}
