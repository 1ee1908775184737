//! Criterion score calculation
//!
//! This module computes the six per-candidate criterion scores from the
//! candidate entity, the normalized query analysis and the user's
//! normalized preference profile. The heuristics are closed lookup tables
//! over tag enumerations; substring matching against category names is the
//! pragmatic fallback where structured tags are unavailable.

use crate::analysis::{BudgetInfo, BudgetTier, QueryAnalysis, Season, Urgency};
use crate::models::{EntityType, NormalizedProfile, TravelEntity};
use crate::{Result, WayfarerError};

use super::scoring::{
    CriterionScores, RankingWeights, NEUTRAL_BUDGET, NEUTRAL_POPULARITY, NEUTRAL_PREFERENCE,
    NEUTRAL_SIMILARITY, NEUTRAL_TEMPORAL,
};

/// Typical nightly rate implied by each price level, used when a property
/// carries a level but no rate
const PRICE_LEVEL_RATES: [f64; 5] = [60.0, 120.0, 220.0, 400.0, 700.0];

/// Capacity at which the derived popularity signal saturates
const CAPACITY_SATURATION: f32 = 500.0;

/// Calculator for the six ranking criteria
///
/// Holds the validated weights so the composite can be produced alongside
/// the criterion vector.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: RankingWeights,
}

impl ScoreCalculator {
    /// Create a new calculator with the given weights
    ///
    /// # Panics
    ///
    /// Panics if the weights are invalid.
    pub fn new(weights: RankingWeights) -> Self {
        if let Err(e) = weights.validate() {
            panic!("Invalid ranking weights: {}", e);
        }
        Self { weights }
    }

    /// Create a calculator, returning an error if the weights are invalid
    pub fn try_new(weights: RankingWeights) -> std::result::Result<Self, String> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// The configured weights
    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// Compute the criterion scores for one candidate.
    ///
    /// Returns an error if any computed score comes out non-finite or
    /// outside [0, 1]; the ranker treats that as a ranking failure and
    /// falls back to similarity-only ordering.
    pub fn score_candidate(
        &self,
        entity: &TravelEntity,
        similarity: Option<f32>,
        analysis: &QueryAnalysis,
        profile: Option<&NormalizedProfile>,
    ) -> Result<CriterionScores> {
        let scores = CriterionScores {
            semantic_similarity: similarity.unwrap_or(NEUTRAL_SIMILARITY),
            user_preference: self.user_preference_score(entity, profile),
            popularity: self.popularity_score(entity),
            budget_match: self.budget_match_score(entity, &analysis.budget),
            temporal_relevance: self.temporal_relevance_score(entity, analysis),
            availability: self.availability_score(analysis.urgency),
        };

        if !scores.is_well_formed() {
            return Err(WayfarerError::Ranking(format!(
                "criterion scores for entity '{}' are out of range: {:?}",
                entity.id, scores
            )));
        }

        Ok(scores)
    }

    /// Look the candidate up in the normalized preference profile.
    ///
    /// The best matching normalized weight across the maps relevant to the
    /// candidate's type becomes the score. No profile, or no match, is
    /// neutral rather than a penalty.
    fn user_preference_score(
        &self,
        entity: &TravelEntity,
        profile: Option<&NormalizedProfile>,
    ) -> f32 {
        let Some(profile) = profile else {
            return NEUTRAL_PREFERENCE;
        };

        let mut best: Option<f32> = None;
        let mut consider = |weight: Option<f32>| {
            if let Some(w) = weight {
                best = Some(best.map_or(w, |b: f32| b.max(w)));
            }
        };

        match entity.entity_type {
            EntityType::Destination => {
                consider(lookup_tags(&profile.destination_types, entity));
                consider(lookup_tags(&profile.climates, entity));
                consider(lookup_tags(&profile.activities, entity));
            }
            EntityType::Property => {
                consider(lookup_tags(&profile.accommodation_categories, entity));
                consider(
                    entity
                        .star_bucket()
                        .and_then(|bucket| profile.star_ratings.get(&bucket).copied()),
                );
                consider(lookup_tags(&profile.amenities, entity));
            }
            EntityType::Category => {
                consider(lookup_tags(&profile.accommodation_categories, entity));
                // Category names are free text; substring matching is the
                // fallback when no tag lines up.
                consider(lookup_name_substring(
                    &profile.accommodation_categories,
                    &entity.name,
                ));
            }
            EntityType::Amenity => {
                consider(lookup_tags(&profile.amenities, entity));
                consider(lookup_name_substring(&profile.amenities, &entity.name));
            }
        }

        best.unwrap_or(NEUTRAL_PREFERENCE)
    }

    /// Intrinsic popularity: the stored index when present, otherwise
    /// derived from capacity and star rating, otherwise neutral.
    fn popularity_score(&self, entity: &TravelEntity) -> f32 {
        if let Some(popularity) = entity.popularity {
            return popularity.clamp(0.0, 1.0);
        }

        let capacity_score = entity.capacity.map(|c| {
            ((1.0 + c as f32).ln() / (1.0 + CAPACITY_SATURATION).ln()).min(1.0)
        });
        let rating_score = entity.star_rating.map(|r| (r / 5.0).clamp(0.0, 1.0));

        match (capacity_score, rating_score) {
            (Some(c), Some(r)) => (c + r) / 2.0,
            (Some(c), None) => c,
            (None, Some(r)) => r,
            (None, None) => NEUTRAL_POPULARITY,
        }
    }

    /// Budget fit: full credit well under budget, partial credit at the
    /// boundary, steep penalty above it. Neutral when no budget was
    /// stated or the candidate carries no cost signal.
    fn budget_match_score(&self, entity: &TravelEntity, budget: &BudgetInfo) -> f32 {
        if budget.is_unknown() {
            return NEUTRAL_BUDGET;
        }

        let requested_cap = budget.max_per_day.or(budget.total);
        if let Some(cap) = requested_cap {
            let entity_rate = entity.nightly_rate.or_else(|| {
                entity
                    .price_level
                    .map(|level| PRICE_LEVEL_RATES[(level.clamp(1, 5) - 1) as usize])
            });
            return match entity_rate {
                Some(rate) => ratio_score(rate / cap),
                None => NEUTRAL_BUDGET,
            };
        }

        // Only a coarse tier was stated; compare against the price level.
        match (budget.tier, entity.price_level) {
            (Some(tier), Some(level)) => tier_score(tier, level),
            _ => NEUTRAL_BUDGET,
        }
    }

    /// Seasonal fit from a closed table over climate and style tags
    fn temporal_relevance_score(&self, entity: &TravelEntity, analysis: &QueryAnalysis) -> f32 {
        let Some(season) = analysis.travel_window.effective_season() else {
            return NEUTRAL_TEMPORAL;
        };

        let mut best: Option<f32> = None;
        for tag in entity.tags.iter().chain(entity.region.iter()) {
            if let Some(affinity) = season_affinity(tag, season) {
                best = Some(best.map_or(affinity, |b: f32| b.max(affinity)));
            }
        }

        best.unwrap_or(NEUTRAL_TEMPORAL)
    }

    /// Availability heuristic from the urgency tag: immediate bookings
    /// score lower than flexible or planned ones. Not an inventory check.
    fn availability_score(&self, urgency: Urgency) -> f32 {
        match urgency {
            Urgency::Immediate => 0.4,
            Urgency::Soon => 0.6,
            Urgency::Planned => 0.9,
            Urgency::Flexible => 1.0,
            Urgency::Unknown => 0.7,
        }
    }
}

fn lookup_tags(
    map: &std::collections::HashMap<String, f32>,
    entity: &TravelEntity,
) -> Option<f32> {
    map.iter()
        .filter(|(key, _)| entity.has_tag(key))
        .map(|(_, weight)| *weight)
        .fold(None, |best: Option<f32>, w| {
            Some(best.map_or(w, |b| b.max(w)))
        })
}

fn lookup_name_substring(
    map: &std::collections::HashMap<String, f32>,
    name: &str,
) -> Option<f32> {
    let name = name.to_lowercase();
    map.iter()
        .filter(|(key, _)| name.contains(&key.to_lowercase()))
        .map(|(_, weight)| *weight)
        .fold(None, |best: Option<f32>, w| {
            Some(best.map_or(w, |b| b.max(w)))
        })
}

/// Bucket the cost-to-budget ratio into the fixed credit tiers
fn ratio_score(ratio: f64) -> f32 {
    if ratio <= 0.7 {
        1.0
    } else if ratio <= 1.0 {
        0.85
    } else if ratio <= 1.25 {
        0.5
    } else if ratio <= 1.6 {
        0.25
    } else {
        0.1
    }
}

/// Coarse tier against price level when no figures were stated
fn tier_score(tier: BudgetTier, level: u8) -> f32 {
    match (tier, level.clamp(1, 5)) {
        (BudgetTier::Budget, 1..=2) => 1.0,
        (BudgetTier::Budget, 3) => 0.6,
        (BudgetTier::Budget, _) => 0.2,
        (BudgetTier::Moderate, 2..=4) => 1.0,
        (BudgetTier::Moderate, _) => 0.5,
        (BudgetTier::Luxury, 4..=5) => 1.0,
        (BudgetTier::Luxury, 3) => 0.7,
        (BudgetTier::Luxury, _) => 0.4,
    }
}

/// Closed season-affinity table over climate and style tags
fn season_affinity(tag: &str, season: Season) -> Option<f32> {
    let tag = tag.to_lowercase();
    let summer_leaning = ["beach", "island", "tropical", "coastal", "mediterranean"];
    let winter_leaning = ["ski", "alpine", "snow", "winter-sports"];
    let shoulder_leaning = ["desert", "hiking", "trekking", "safari"];
    let all_season = ["city", "culture", "museums", "urban", "food"];

    if summer_leaning.contains(&tag.as_str()) {
        Some(match season {
            Season::Summer => 1.0,
            Season::Spring | Season::Autumn => 0.75,
            Season::Winter => 0.45,
        })
    } else if winter_leaning.contains(&tag.as_str()) {
        Some(match season {
            Season::Winter => 1.0,
            Season::Spring => 0.6,
            Season::Autumn => 0.5,
            Season::Summer => 0.3,
        })
    } else if shoulder_leaning.contains(&tag.as_str()) {
        Some(match season {
            Season::Spring | Season::Autumn => 1.0,
            Season::Winter => 0.7,
            Season::Summer => 0.4,
        })
    } else if all_season.contains(&tag.as_str()) {
        Some(match season {
            Season::Spring | Season::Autumn => 0.9,
            _ => 0.8,
        })
    } else {
        None
    }
}
