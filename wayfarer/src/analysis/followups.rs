//! Clarifying follow-up question selection
//!
//! When the normalized analysis is missing too much to recommend well, the
//! engine asks for the most valuable missing facts instead of guessing.
//! The rule is deliberately simple: count the unknown core facets and, at
//! two or more, emit up to two prompts in a fixed priority order.

use super::types::QueryAnalysis;

/// Maximum number of follow-up prompts emitted per request
const MAX_PROMPTS: usize = 2;

/// Core facets counted toward the "too little information" decision
const MIN_UNKNOWN_FOR_PROMPTS: usize = 2;

/// Decide whether clarifying follow-up questions are warranted and pick
/// them in priority order: dates, budget, destination type, group size,
/// activities.
///
/// Returns an empty list when the analysis already carries enough signal.
pub fn follow_up_prompts(analysis: &QueryAnalysis) -> Vec<String> {
    let window_unknown = analysis.travel_window.is_unknown();
    let budget_unknown = analysis.budget.is_unknown();
    let destination_unknown = analysis
        .destination_preferences
        .destination_types
        .is_empty()
        && analysis.destination_preferences.named_locations.is_empty();
    let travelers_unknown = analysis.traveler_info.is_unknown();

    let unknown_count = [
        window_unknown,
        budget_unknown,
        destination_unknown,
        travelers_unknown,
    ]
    .iter()
    .filter(|unknown| **unknown)
    .count();

    if unknown_count < MIN_UNKNOWN_FOR_PROMPTS {
        return Vec::new();
    }

    let candidates: [(bool, &str); 5] = [
        (
            window_unknown,
            "When are you planning to travel, and for roughly how long?",
        ),
        (
            budget_unknown,
            "What budget are you working with, per day or for the whole trip?",
        ),
        (
            destination_unknown,
            "What kind of destination appeals to you - beach, city, mountains, something else?",
        ),
        (
            travelers_unknown,
            "Who's traveling - how many of you, and is it a family trip?",
        ),
        (
            analysis.activities.is_empty(),
            "What would you like to spend your days doing?",
        ),
    ];

    candidates
        .into_iter()
        .filter(|(unknown, _)| *unknown)
        .take(MAX_PROMPTS)
        .map(|(_, prompt)| prompt.to_string())
        .collect()
}
