//! User profile models: basic account framing plus the decaying
//! preference profile built from query and interaction signals.
//!
//! Preference weights are raw, additive and never hard-deleted. Reading a
//! profile for ranking always goes through [`PreferenceProfile::normalized`],
//! which applies stepped time decay, divides by the map maximum, and drops
//! entries under the confidence threshold. A weak signal stays in raw
//! storage and can resurface later if it keeps getting reinforced.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PreferenceConfig;

/// Basic user fields used when framing the assembled context
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    /// User identifier
    pub id: String,

    /// Display name, if known
    pub name: Option<String>,

    /// Budget the user stated on their account, per day
    pub stated_budget_per_day: Option<f64>,

    /// Interests stated on the account (not inferred)
    pub stated_interests: Vec<String>,

    /// Climate preferences stated on the account
    pub stated_climates: Vec<String>,
}

/// A single raw preference weight with its last-update time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    /// Raw additive weight, always non-negative
    pub weight: f32,

    /// When this entry last received a signal
    pub updated_at: DateTime<Utc>,
}

impl WeightEntry {
    /// Raw weight after stepped time decay.
    ///
    /// Entries untouched for longer than the decay window are halved;
    /// entries older than twice the window are quartered.
    pub fn decayed(&self, now: DateTime<Utc>, decay_window_days: i64) -> f32 {
        let age_days = now.signed_duration_since(self.updated_at).num_days();
        if decay_window_days <= 0 {
            return self.weight;
        }
        if age_days > decay_window_days * 2 {
            self.weight * 0.25
        } else if age_days > decay_window_days {
            self.weight * 0.5
        } else {
            self.weight
        }
    }
}

/// Per-user preference profile built from heterogeneous signals
///
/// Created lazily on first interaction, mutated additively on every tracked
/// signal, never hard-deleted. Concurrent writers are resolved
/// last-write-wins at the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Owning user id
    pub user_id: String,

    /// Destination-type tag weights (beach, city, mountain, ...)
    pub destination_types: HashMap<String, WeightEntry>,

    /// Climate tag weights (tropical, temperate, alpine, ...)
    pub climates: HashMap<String, WeightEntry>,

    /// Activity tag weights (hiking, diving, museums, ...)
    pub activities: HashMap<String, WeightEntry>,

    /// Amenity tag weights (pool, spa, pet-friendly, ...)
    pub amenities: HashMap<String, WeightEntry>,

    /// Accommodation category weights (boutique hotel, hostel, villa, ...)
    pub accommodation_categories: HashMap<String, WeightEntry>,

    /// Star-rating bucket weights, keyed by whole-star string ("4", "5")
    pub star_ratings: HashMap<String, WeightEntry>,

    /// Traveler-type tag weights (solo, couple, family, ...)
    pub traveler_types: HashMap<String, WeightEntry>,

    /// Most recent per-day budget figures, newest last, bounded
    pub budget_history: Vec<f64>,

    /// When the profile last received any signal
    pub updated_at: DateTime<Utc>,
}

impl PreferenceProfile {
    /// Create an empty profile for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            destination_types: HashMap::new(),
            climates: HashMap::new(),
            activities: HashMap::new(),
            amenities: HashMap::new(),
            accommodation_categories: HashMap::new(),
            star_ratings: HashMap::new(),
            traveler_types: HashMap::new(),
            budget_history: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Whether no signal has ever been recorded
    pub fn is_empty(&self) -> bool {
        self.destination_types.is_empty()
            && self.climates.is_empty()
            && self.activities.is_empty()
            && self.amenities.is_empty()
            && self.accommodation_categories.is_empty()
            && self.star_ratings.is_empty()
            && self.traveler_types.is_empty()
            && self.budget_history.is_empty()
    }

    /// Produce the normalized, decayed read-side view used by ranking.
    ///
    /// Every raw weight is decayed, divided by its map's decayed maximum,
    /// and dropped from the output if it falls below the confidence
    /// threshold. The maximum surviving weight in a non-empty map is
    /// always exactly 1.0. Raw storage is untouched.
    pub fn normalized(&self, config: &PreferenceConfig, now: DateTime<Utc>) -> NormalizedProfile {
        NormalizedProfile {
            destination_types: normalize_map(&self.destination_types, config, now),
            climates: normalize_map(&self.climates, config, now),
            activities: normalize_map(&self.activities, config, now),
            amenities: normalize_map(&self.amenities, config, now),
            accommodation_categories: normalize_map(&self.accommodation_categories, config, now),
            star_ratings: normalize_map(&self.star_ratings, config, now),
            traveler_types: normalize_map(&self.traveler_types, config, now),
            budget: BudgetSummary::from_history(&self.budget_history),
        }
    }
}

fn normalize_map(
    raw: &HashMap<String, WeightEntry>,
    config: &PreferenceConfig,
    now: DateTime<Utc>,
) -> HashMap<String, f32> {
    let decayed: Vec<(&String, f32)> = raw
        .iter()
        .map(|(key, entry)| (key, entry.decayed(now, config.decay_window_days)))
        .collect();

    let max = decayed
        .iter()
        .map(|(_, w)| *w)
        .fold(0.0_f32, f32::max);
    if max <= 0.0 {
        return HashMap::new();
    }

    decayed
        .into_iter()
        .filter_map(|(key, weight)| {
            let normalized = weight / max;
            if normalized >= config.confidence_threshold {
                Some((key.clone(), normalized))
            } else {
                None
            }
        })
        .collect()
}

/// Normalized, decayed view of a preference profile used by the ranker
#[derive(Debug, Clone, Default)]
pub struct NormalizedProfile {
    pub destination_types: HashMap<String, f32>,
    pub climates: HashMap<String, f32>,
    pub activities: HashMap<String, f32>,
    pub amenities: HashMap<String, f32>,
    pub accommodation_categories: HashMap<String, f32>,
    pub star_ratings: HashMap<String, f32>,
    pub traveler_types: HashMap<String, f32>,
    pub budget: BudgetSummary,
}

impl NormalizedProfile {
    /// Whether every normalized map came back empty
    pub fn is_empty(&self) -> bool {
        self.destination_types.is_empty()
            && self.climates.is_empty()
            && self.activities.is_empty()
            && self.amenities.is_empty()
            && self.accommodation_categories.is_empty()
            && self.star_ratings.is_empty()
            && self.traveler_types.is_empty()
    }
}

/// Budget preference summarized over the bounded history window
///
/// All fields are `None` when no budget signal has been recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub mean: Option<f64>,
}

impl BudgetSummary {
    /// Summarize a budget history window
    pub fn from_history(history: &[f64]) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<f64> = history.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let median = if sorted.len() % 2 == 1 {
            sorted[sorted.len() / 2]
        } else {
            let upper = sorted.len() / 2;
            (sorted[upper - 1] + sorted[upper]) / 2.0
        };

        Self {
            min: Some(min),
            max: Some(max),
            median: Some(median),
            mean: Some(mean),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(weight: f32, age_days: i64) -> WeightEntry {
        WeightEntry {
            weight,
            updated_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_normalization_drops_below_threshold() {
        let mut profile = PreferenceProfile::new("u1");
        profile.destination_types.insert("beach".to_string(), entry(4.0, 0));
        profile.destination_types.insert("mountain".to_string(), entry(1.0, 0));

        let config = PreferenceConfig {
            confidence_threshold: 0.3,
            ..Default::default()
        };
        let normalized = profile.normalized(&config, Utc::now());

        assert_eq!(normalized.destination_types.len(), 1);
        assert_eq!(normalized.destination_types.get("beach"), Some(&1.0));
        assert!(normalized.destination_types.get("mountain").is_none());
    }

    #[test]
    fn test_normalization_max_is_exactly_one() {
        let mut profile = PreferenceProfile::new("u1");
        profile.activities.insert("hiking".to_string(), entry(7.3, 0));
        profile.activities.insert("diving".to_string(), entry(6.1, 0));

        let normalized = profile.normalized(&PreferenceConfig::default(), Utc::now());

        let max = normalized
            .activities
            .values()
            .fold(0.0_f32, |acc, w| acc.max(*w));
        assert_eq!(max, 1.0);
        for weight in normalized.activities.values() {
            assert!(*weight >= 0.0);
        }
    }

    #[test]
    fn test_stepped_decay() {
        let config = PreferenceConfig::default();
        let now = Utc::now();

        let fresh = entry(4.0, 0);
        let stale = entry(4.0, config.decay_window_days + 1);
        let ancient = entry(4.0, config.decay_window_days * 2 + 1);

        assert_eq!(fresh.decayed(now, config.decay_window_days), 4.0);
        assert_eq!(stale.decayed(now, config.decay_window_days), 2.0);
        assert_eq!(ancient.decayed(now, config.decay_window_days), 1.0);
    }

    #[test]
    fn test_decayed_entry_can_fall_out_of_output() {
        // Two equally-weighted signals; the stale one decays under the
        // threshold relative to the fresh one but stays in raw storage.
        let mut profile = PreferenceProfile::new("u1");
        let config = PreferenceConfig {
            confidence_threshold: 0.6,
            ..Default::default()
        };
        profile.climates.insert("tropical".to_string(), entry(4.0, 0));
        profile
            .climates
            .insert("alpine".to_string(), entry(4.0, config.decay_window_days + 1));

        let normalized = profile.normalized(&config, Utc::now());
        assert!(normalized.climates.contains_key("tropical"));
        assert!(!normalized.climates.contains_key("alpine"));
        assert!(profile.climates.contains_key("alpine"));
    }

    #[test]
    fn test_budget_summary_empty_history() {
        assert_eq!(BudgetSummary::from_history(&[]), BudgetSummary::default());
    }

    #[test]
    fn test_budget_summary_statistics() {
        let summary = BudgetSummary::from_history(&[200.0, 100.0, 400.0, 300.0]);
        assert_eq!(summary.min, Some(100.0));
        assert_eq!(summary.max, Some(400.0));
        assert_eq!(summary.median, Some(250.0));
        assert_eq!(summary.mean, Some(250.0));
    }

    #[test]
    fn test_empty_map_normalizes_to_empty() {
        let profile = PreferenceProfile::new("u1");
        let normalized = profile.normalized(&PreferenceConfig::default(), Utc::now());
        assert!(normalized.is_empty());
        assert_eq!(normalized.budget, BudgetSummary::default());
    }
}
