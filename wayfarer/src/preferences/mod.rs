//! Preference tracking
//!
//! Updates the per-user preference profile from two kinds of signal: the
//! facets of a normalized query, and explicit interaction events. Both
//! entry points are pure transforms over a passed-in profile value and are
//! safe to call repeatedly; every signal is additive and the read side
//! handles scaling (see [`crate::models::PreferenceProfile::normalized`]).
//!
//! Persisting the updated profile is the caller's concern and is
//! best-effort: a failed write must never fail the originating request.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::analysis::QueryAnalysis;
use crate::config::PreferenceConfig;
use crate::models::{EntityType, PreferenceProfile, TravelEntity, WeightEntry};

/// Interaction kinds tracked against the preference profile
///
/// The increments form a fixed hierarchy: booking intent weighs more than
/// viewing a destination or property, which weighs more than amenity
/// interest, which weighs more than a plain query mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// The user opened a destination
    DestinationView,

    /// The user opened a lodging property
    PropertyView,

    /// The user showed interest in an amenity
    AmenityInterest,

    /// The user expressed intent to book
    BookingIntent,
}

/// Applies query and interaction signals to preference profiles
#[derive(Debug, Clone)]
pub struct PreferenceTracker {
    config: PreferenceConfig,
}

impl PreferenceTracker {
    /// Create a tracker with the given configuration
    pub fn new(config: PreferenceConfig) -> Self {
        Self { config }
    }

    /// Record every non-empty facet of a normalized query.
    ///
    /// Destination-type, climate, activity and amenity tags, the
    /// traveler-type tag and the accommodation property type each receive
    /// the explicit-query increment; a stated per-day budget figure is
    /// appended to the bounded budget history.
    pub fn track_from_query(&self, profile: &mut PreferenceProfile, analysis: &QueryAnalysis) {
        let now = Utc::now();
        let increment = self.config.query_increment;

        for tag in &analysis.destination_preferences.destination_types {
            bump(&mut profile.destination_types, tag, increment, now);
        }
        for tag in &analysis.destination_preferences.climates {
            bump(&mut profile.climates, tag, increment, now);
        }
        for tag in &analysis.activities {
            bump(&mut profile.activities, tag, increment, now);
        }
        for tag in &analysis.required_amenities {
            bump(&mut profile.amenities, tag, increment, now);
        }
        if let Some(traveler_type) = &analysis.traveler_info.traveler_type {
            bump(&mut profile.traveler_types, traveler_type, increment, now);
        }
        if let Some(property_type) = &analysis.accommodation.property_type {
            bump(
                &mut profile.accommodation_categories,
                property_type,
                increment,
                now,
            );
        }

        let budget_sample = analysis.budget.max_per_day.or(analysis.budget.min_per_day);
        if let Some(sample) = budget_sample {
            profile.budget_history.push(sample);
            let limit = self.config.budget_history_limit;
            if profile.budget_history.len() > limit {
                let excess = profile.budget_history.len() - limit;
                profile.budget_history.drain(..excess);
            }
        }

        profile.updated_at = now;
    }

    /// Record an explicit interaction with an entity.
    ///
    /// The increment depends on the interaction kind; the maps it lands in
    /// depend on the entity's type.
    pub fn track_interaction(
        &self,
        profile: &mut PreferenceProfile,
        kind: InteractionKind,
        entity: &TravelEntity,
    ) {
        let now = Utc::now();
        let increment = match kind {
            InteractionKind::AmenityInterest => self.config.amenity_interest_increment,
            InteractionKind::DestinationView | InteractionKind::PropertyView => {
                self.config.view_increment
            }
            InteractionKind::BookingIntent => self.config.booking_intent_increment,
        };

        match entity.entity_type {
            EntityType::Destination => {
                for tag in &entity.tags {
                    bump(&mut profile.destination_types, tag, increment, now);
                }
            }
            EntityType::Property | EntityType::Category => {
                for tag in &entity.tags {
                    bump(&mut profile.accommodation_categories, tag, increment, now);
                }
                if let Some(bucket) = entity.star_bucket() {
                    bump(&mut profile.star_ratings, &bucket, increment, now);
                }
            }
            EntityType::Amenity => {
                bump(&mut profile.amenities, &entity.name, increment, now);
                for tag in &entity.tags {
                    bump(&mut profile.amenities, tag, increment, now);
                }
            }
        }

        profile.updated_at = now;
    }
}

/// Additive bump of one weighted-map entry; keys are lowercased so lookups
/// stay case-insensitive across signal sources.
fn bump(map: &mut HashMap<String, WeightEntry>, key: &str, increment: f32, now: DateTime<Utc>) {
    let key = key.trim().to_lowercase();
    if key.is_empty() {
        return;
    }
    let entry = map.entry(key).or_insert(WeightEntry {
        weight: 0.0,
        updated_at: now,
    });
    entry.weight += increment;
    entry.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityBuilder;

    fn tracker() -> PreferenceTracker {
        PreferenceTracker::new(PreferenceConfig::default())
    }

    fn beach_query() -> QueryAnalysis {
        let mut analysis = QueryAnalysis::default();
        analysis
            .destination_preferences
            .destination_types
            .push("Beach".to_string());
        analysis
            .destination_preferences
            .climates
            .push("tropical".to_string());
        analysis.activities.push("diving".to_string());
        analysis.required_amenities.push("pool".to_string());
        analysis.traveler_info.traveler_type = Some("couple".to_string());
        analysis.budget.max_per_day = Some(220.0);
        analysis
    }

    #[test]
    fn test_track_from_query_populates_all_facets() {
        let tracker = tracker();
        let mut profile = PreferenceProfile::new("u1");
        tracker.track_from_query(&mut profile, &beach_query());

        assert_eq!(profile.destination_types.get("beach").unwrap().weight, 1.0);
        assert_eq!(profile.climates.get("tropical").unwrap().weight, 1.0);
        assert_eq!(profile.activities.get("diving").unwrap().weight, 1.0);
        assert_eq!(profile.amenities.get("pool").unwrap().weight, 1.0);
        assert_eq!(profile.traveler_types.get("couple").unwrap().weight, 1.0);
        assert_eq!(profile.budget_history, vec![220.0]);
    }

    #[test]
    fn test_repeated_queries_accumulate() {
        let tracker = tracker();
        let mut profile = PreferenceProfile::new("u1");
        tracker.track_from_query(&mut profile, &beach_query());
        tracker.track_from_query(&mut profile, &beach_query());

        assert_eq!(profile.destination_types.get("beach").unwrap().weight, 2.0);
        assert_eq!(profile.budget_history.len(), 2);
    }

    #[test]
    fn test_budget_history_is_bounded_keeping_newest() {
        let config = PreferenceConfig {
            budget_history_limit: 3,
            ..Default::default()
        };
        let tracker = PreferenceTracker::new(config);
        let mut profile = PreferenceProfile::new("u1");

        for amount in [100.0, 200.0, 300.0, 400.0, 500.0] {
            let mut analysis = QueryAnalysis::default();
            analysis.budget.max_per_day = Some(amount);
            tracker.track_from_query(&mut profile, &analysis);
        }

        assert_eq!(profile.budget_history, vec![300.0, 400.0, 500.0]);
    }

    #[test]
    fn test_interaction_increment_hierarchy() {
        let tracker = tracker();
        let destination = EntityBuilder::new(EntityType::Destination, "Naxos")
            .tag("beach")
            .build();
        let amenity = EntityBuilder::new(EntityType::Amenity, "Spa").build();

        let mut profile = PreferenceProfile::new("u1");
        tracker.track_interaction(&mut profile, InteractionKind::AmenityInterest, &amenity);
        tracker.track_interaction(&mut profile, InteractionKind::DestinationView, &destination);

        let amenity_weight = profile.amenities.get("spa").unwrap().weight;
        let view_weight = profile.destination_types.get("beach").unwrap().weight;
        assert!(view_weight > amenity_weight);

        tracker.track_interaction(&mut profile, InteractionKind::BookingIntent, &destination);
        let after_booking = profile.destination_types.get("beach").unwrap().weight;
        assert!(after_booking - view_weight > view_weight - amenity_weight);
    }

    #[test]
    fn test_property_interaction_lands_in_accommodation_maps() {
        let tracker = tracker();
        let property = EntityBuilder::new(EntityType::Property, "Cliffside Suites")
            .tag("boutique")
            .star_rating(4.5)
            .build();

        let mut profile = PreferenceProfile::new("u1");
        tracker.track_interaction(&mut profile, InteractionKind::PropertyView, &property);

        assert!(profile.accommodation_categories.contains_key("boutique"));
        assert!(profile.star_ratings.contains_key("4"));
    }

    #[test]
    fn test_keys_are_case_normalized() {
        let tracker = tracker();
        let mut profile = PreferenceProfile::new("u1");

        let mut first = QueryAnalysis::default();
        first
            .destination_preferences
            .destination_types
            .push("BEACH".to_string());
        let mut second = QueryAnalysis::default();
        second
            .destination_preferences
            .destination_types
            .push("beach".to_string());

        tracker.track_from_query(&mut profile, &first);
        tracker.track_from_query(&mut profile, &second);
        assert_eq!(profile.destination_types.len(), 1);
        assert_eq!(profile.destination_types.get("beach").unwrap().weight, 2.0);
    }
}
