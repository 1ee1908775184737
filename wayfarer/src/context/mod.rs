//! Bounded context assembly
//!
//! Renders the ranked candidates, the user profile and temporal notes into
//! a single text block for the generation step. Rendering is deterministic
//! for identical inputs, every section is independently optional, and the
//! overall output never exceeds the configured character budget: overflow
//! is truncated at the last complete line and marked explicitly.

use std::collections::BTreeMap;

use crate::analysis::{QueryAnalysis, Season};
use crate::config::ContextConfig;
use crate::models::{NormalizedProfile, UserProfile};
use crate::search::{RankedResults, ScoredCandidate};

/// Marker appended when the assembled block had to be truncated
pub const TRUNCATION_MARKER: &str = "[context truncated]";

/// Standalone property matches rendered when not nested under a destination
const MAX_STANDALONE_PROPERTIES: usize = 6;

/// The assembled, bounded context block
#[derive(Debug, Clone, PartialEq)]
pub struct RagContext {
    /// The rendered text
    pub text: String,

    /// Whether the overall budget forced truncation
    pub truncated: bool,
}

impl RagContext {
    /// Length of the rendered text in characters
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Assembles ranked results into a bounded text block
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    /// Create an assembler with the given limits
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Render the context block in fixed section order.
    ///
    /// Sections with no input are omitted entirely; the output for
    /// identical inputs is byte-identical.
    pub fn assemble(
        &self,
        ranked: &RankedResults,
        analysis: &QueryAnalysis,
        user: Option<&UserProfile>,
        preferences: Option<&NormalizedProfile>,
    ) -> RagContext {
        let mut sections: Vec<String> = Vec::new();

        sections.push(self.render_framing());
        if let Some(section) = self.render_user(user, preferences) {
            sections.push(section);
        }
        if let Some(section) = self.render_request(analysis) {
            sections.push(section);
        }
        if let Some(section) = self.render_destinations(ranked) {
            sections.push(section);
        }
        if let Some(section) = self.render_standalone_properties(ranked) {
            sections.push(section);
        }
        if let Some(section) = self.render_amenities(ranked) {
            sections.push(section);
        }
        if let Some(section) = self.render_seasonal_notes(analysis) {
            sections.push(section);
        }
        sections.push(self.render_guidelines());

        let text = sections.join("\n\n");
        self.enforce_budget(text)
    }

    fn render_framing(&self) -> String {
        "You are a travel planning assistant. Ground your response in the retrieved \
options below and prefer them over general knowledge."
            .to_string()
    }

    fn render_user(
        &self,
        user: Option<&UserProfile>,
        preferences: Option<&NormalizedProfile>,
    ) -> Option<String> {
        let mut lines: Vec<String> = Vec::new();

        if let Some(user) = user {
            if let Some(name) = &user.name {
                lines.push(format!("Name: {}", name));
            }
            if let Some(budget) = user.stated_budget_per_day {
                lines.push(format!("Stated budget per day: {:.0}", budget));
            }
            if !user.stated_interests.is_empty() {
                lines.push(format!("Interests: {}", user.stated_interests.join(", ")));
            }
            if !user.stated_climates.is_empty() {
                lines.push(format!(
                    "Preferred climates: {}",
                    user.stated_climates.join(", ")
                ));
            }
        }

        if let Some(preferences) = preferences {
            if let Some(learned) = render_weights(&preferences.destination_types) {
                lines.push(format!("Learned destination tastes: {}", learned));
            }
            if let Some(learned) = render_weights(&preferences.activities) {
                lines.push(format!("Learned activity tastes: {}", learned));
            }
            if let Some(median) = preferences.budget.median {
                let range = match (preferences.budget.min, preferences.budget.max) {
                    (Some(min), Some(max)) => format!(" (range {:.0}-{:.0})", min, max),
                    _ => String::new(),
                };
                lines.push(format!("Typical daily budget: {:.0}{}", median, range));
            }
        }

        if lines.is_empty() {
            None
        } else {
            Some(format!("## Traveler\n{}", lines.join("\n")))
        }
    }

    fn render_request(&self, analysis: &QueryAnalysis) -> Option<String> {
        let mut lines: Vec<String> = Vec::new();

        let window = &analysis.travel_window;
        if !window.is_unknown() {
            let mut parts: Vec<String> = Vec::new();
            match (window.start_date, window.end_date) {
                (Some(start), Some(end)) => parts.push(format!("{} to {}", start, end)),
                (Some(start), None) => parts.push(format!("from {}", start)),
                (None, Some(end)) => parts.push(format!("until {}", end)),
                (None, None) => {}
            }
            if let Some(duration) = window.duration_days {
                parts.push(format!("{} days", duration));
            }
            if let Some(season) = window.effective_season() {
                parts.push(season.to_string());
            }
            if window.flexible == Some(true) {
                parts.push("flexible".to_string());
            }
            lines.push(format!("Travel window: {}", parts.join(", ")));
        }

        if !analysis.budget.is_unknown() {
            let budget = &analysis.budget;
            let mut parts: Vec<String> = Vec::new();
            if let Some(max) = budget.max_per_day {
                parts.push(format!("up to {:.0} {} per day", max, budget.currency));
            } else if let Some(min) = budget.min_per_day {
                parts.push(format!("from {:.0} {} per day", min, budget.currency));
            }
            if let Some(total) = budget.total {
                parts.push(format!("{:.0} {} total", total, budget.currency));
            }
            if let Some(tier) = budget.tier {
                parts.push(format!("{:?} tier", tier).to_lowercase());
            }
            if !parts.is_empty() {
                lines.push(format!("Budget: {}", parts.join(", ")));
            }
        }

        let travelers = &analysis.traveler_info;
        if !travelers.is_unknown() {
            let mut parts: Vec<String> = Vec::new();
            if let Some(size) = travelers.group_size {
                parts.push(format!("{} travelers", size));
            }
            if let Some(kind) = &travelers.traveler_type {
                parts.push(kind.clone());
            }
            if !travelers.special_needs.is_empty() {
                parts.push(format!("needs: {}", travelers.special_needs.join(", ")));
            }
            lines.push(format!("Group: {}", parts.join(", ")));
        }

        let destinations = &analysis.destination_preferences;
        if !destinations.destination_types.is_empty() || !destinations.climates.is_empty() {
            let styles: Vec<String> = destinations
                .destination_types
                .iter()
                .chain(destinations.climates.iter())
                .cloned()
                .collect();
            lines.push(format!("Destination styles: {}", styles.join(", ")));
        }
        if !destinations.named_locations.is_empty() {
            lines.push(format!(
                "Named locations: {}",
                destinations.named_locations.join(", ")
            ));
        }
        if !destinations.exclusions.is_empty() {
            lines.push(format!("Avoid: {}", destinations.exclusions.join(", ")));
        }

        if !analysis.activities.is_empty() {
            lines.push(format!("Activities: {}", analysis.activities.join(", ")));
        }
        if !analysis.required_amenities.is_empty() {
            lines.push(format!(
                "Required amenities: {}",
                analysis.required_amenities.join(", ")
            ));
        }

        let accommodation = &analysis.accommodation;
        let mut stay_parts: Vec<String> = Vec::new();
        if let Some(kind) = &accommodation.property_type {
            stay_parts.push(kind.clone());
        }
        if let Some(room) = &accommodation.room_type {
            stay_parts.push(room.clone());
        }
        if let Some(rating) = accommodation.min_rating {
            stay_parts.push(format!("min {:.0} stars", rating));
        }
        if !stay_parts.is_empty() {
            lines.push(format!("Accommodation: {}", stay_parts.join(", ")));
        }

        if lines.is_empty() {
            None
        } else {
            Some(format!("## Request\n{}", lines.join("\n")))
        }
    }

    fn render_destinations(&self, ranked: &RankedResults) -> Option<String> {
        if ranked.destinations.is_empty() {
            return None;
        }

        let destinations: Vec<&ScoredCandidate> = ranked
            .destinations
            .iter()
            .take(self.config.max_destinations)
            .collect();

        let mut lines: Vec<String> = vec!["## Destinations".to_string()];
        for (index, destination) in destinations.iter().enumerate() {
            let mut heading = format!(
                "{}. {} - match {:.2}",
                index + 1,
                destination.entity.name,
                destination.composite_score
            );
            if let Some(country) = &destination.entity.country {
                heading = format!(
                    "{}. {} ({}) - match {:.2}",
                    index + 1,
                    destination.entity.name,
                    country,
                    destination.composite_score
                );
            }
            lines.push(heading);

            if !destination.entity.description.is_empty() {
                lines.push(format!(
                    "   {}",
                    clip_text(&destination.entity.description, self.config.field_clip_chars)
                ));
            }

            let nested: Vec<&ScoredCandidate> = ranked
                .properties
                .iter()
                .filter(|p| {
                    p.entity.destination_id.as_deref() == Some(destination.entity.id.as_str())
                })
                .take(self.config.max_properties_per_destination)
                .collect();
            if !nested.is_empty() {
                lines.push("   Stays here:".to_string());
                for property in nested {
                    lines.push(format!("   - {}", property_line(property)));
                }
            }
        }

        Some(lines.join("\n"))
    }

    fn render_standalone_properties(&self, ranked: &RankedResults) -> Option<String> {
        let listed_destinations: Vec<&str> = ranked
            .destinations
            .iter()
            .take(self.config.max_destinations)
            .map(|d| d.entity.id.as_str())
            .collect();

        let standalone: Vec<&ScoredCandidate> = ranked
            .properties
            .iter()
            .filter(|p| match p.entity.destination_id.as_deref() {
                Some(id) => !listed_destinations.contains(&id),
                None => true,
            })
            .take(MAX_STANDALONE_PROPERTIES)
            .collect();

        if standalone.is_empty() {
            return None;
        }

        let mut lines: Vec<String> = vec!["## Other stays".to_string()];
        for property in standalone {
            lines.push(format!("- {}", property_line(property)));
        }
        Some(lines.join("\n"))
    }

    fn render_amenities(&self, ranked: &RankedResults) -> Option<String> {
        if ranked.amenities.is_empty() {
            return None;
        }

        // Group by the amenity's first tag; BTreeMap keeps the rendering
        // deterministic.
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for amenity in &ranked.amenities {
            let group = amenity
                .entity
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| "general".to_string());
            groups
                .entry(group)
                .or_default()
                .push(amenity.entity.name.clone());
        }

        let mut lines: Vec<String> = vec!["## Amenities".to_string()];
        for (group, names) in groups {
            lines.push(format!("{}: {}", group, names.join(", ")));
        }
        Some(lines.join("\n"))
    }

    fn render_seasonal_notes(&self, analysis: &QueryAnalysis) -> Option<String> {
        let season = analysis.travel_window.effective_season()?;
        let note = match season {
            Season::Summer => {
                "Peak season for beach and island destinations; popular stays book out early."
            }
            Season::Winter => {
                "High season in ski regions and a quiet, cheaper stretch for most cities."
            }
            Season::Spring => {
                "Shoulder season: mild weather, thinner crowds and better rates in most regions."
            }
            Season::Autumn => {
                "Shoulder season: mild weather, thinner crowds and better rates in most regions."
            }
        };
        Some(format!(
            "## Seasonal notes\nTravel falls in {}. {}",
            season, note
        ))
    }

    fn render_guidelines(&self) -> String {
        [
            "## Guidelines",
            "- Recommend two or three options with concrete reasons tied to the request.",
            "- Mention price fit whenever a budget was stated.",
            "- Only reference destinations, stays and amenities listed above.",
            "- If key details are missing, ask for them instead of guessing.",
        ]
        .join("\n")
    }

    /// Enforce the overall character budget: truncate at the last complete
    /// line before the limit and append the explicit marker.
    fn enforce_budget(&self, text: String) -> RagContext {
        let budget = self.config.max_context_chars;
        if text.chars().count() <= budget {
            return RagContext {
                text,
                truncated: false,
            };
        }

        // Room for the kept lines, a separating newline and the marker.
        let allowed = budget.saturating_sub(TRUNCATION_MARKER.chars().count() + 1);
        let mut kept = String::new();
        let mut kept_chars = 0usize;
        for line in text.lines() {
            let line_chars = line.chars().count() + if kept.is_empty() { 0 } else { 1 };
            if kept_chars + line_chars > allowed {
                break;
            }
            if !kept.is_empty() {
                kept.push('\n');
            }
            kept.push_str(line);
            kept_chars += line_chars;
        }

        if !kept.is_empty() {
            kept.push('\n');
        }
        kept.push_str(TRUNCATION_MARKER);

        RagContext {
            text: kept,
            truncated: true,
        }
    }
}

fn property_line(property: &ScoredCandidate) -> String {
    let mut details: Vec<String> = Vec::new();
    if let Some(rating) = property.entity.star_rating {
        details.push(format!("{:.1}*", rating));
    }
    if let Some(rate) = property.entity.nightly_rate {
        details.push(format!("~{:.0}/night", rate));
    }
    let details = if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join(", "))
    };
    format!(
        "{}{} - match {:.2}",
        property.entity.name, details, property.composite_score
    )
}

fn render_weights(weights: &std::collections::HashMap<String, f32>) -> Option<String> {
    if weights.is_empty() {
        return None;
    }
    let mut entries: Vec<(&String, &f32)> = weights.iter().collect();
    // Strongest first; names break score ties so output stays stable.
    entries.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    Some(
        entries
            .into_iter()
            .map(|(name, weight)| format!("{} ({:.2})", name, weight))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Clip free text to a character budget, breaking at the nearest preceding
/// whitespace rather than mid-word.
fn clip_text(text: &str, budget: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= budget {
        return text.to_string();
    }

    let ellipsis = "...";
    let body_budget = budget.saturating_sub(ellipsis.chars().count());
    let head: String = chars.iter().take(body_budget).collect();

    let clipped = match head.rfind(char::is_whitespace) {
        Some(position) => head[..position].trim_end().to_string(),
        None => head,
    };
    format!("{}{}", clipped, ellipsis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityBuilder, EntityType};
    use crate::search::{CriterionScores, RankingWeights};

    fn candidate(entity: crate::models::TravelEntity, similarity: f32) -> ScoredCandidate {
        let scores = CriterionScores {
            semantic_similarity: similarity,
            ..CriterionScores::neutral()
        };
        ScoredCandidate {
            entity,
            similarity: Some(similarity),
            composite_score: scores.composite(&RankingWeights::default()),
            scores,
        }
    }

    fn sample_ranked() -> RankedResults {
        let santorini = EntityBuilder::new(EntityType::Destination, "Santorini")
            .id("santorini")
            .country("Greece")
            .description("Volcanic island with whitewashed villages above a deep blue caldera")
            .build();
        let suites = EntityBuilder::new(EntityType::Property, "Cliffside Suites")
            .destination_id("santorini")
            .star_rating(4.5)
            .nightly_rate(280.0)
            .build();
        let remote = EntityBuilder::new(EntityType::Property, "Harbor Inn").build();
        let spa = EntityBuilder::new(EntityType::Amenity, "Spa")
            .tag("wellness")
            .build();
        let sauna = EntityBuilder::new(EntityType::Amenity, "Sauna")
            .tag("wellness")
            .build();
        let kids_club = EntityBuilder::new(EntityType::Amenity, "Kids club")
            .tag("family")
            .build();

        RankedResults {
            destinations: vec![candidate(santorini, 0.92)],
            properties: vec![candidate(suites, 0.88), candidate(remote, 0.70)],
            categories: Vec::new(),
            amenities: vec![
                candidate(spa, 0.8),
                candidate(sauna, 0.75),
                candidate(kids_club, 0.6),
            ],
            degraded: false,
        }
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let assembler = ContextAssembler::new(ContextConfig::default());
        let ranked = sample_ranked();
        let analysis = QueryAnalysis::default();

        let first = assembler.assemble(&ranked, &analysis, None, None);
        let second = assembler.assemble(&ranked, &analysis, None, None);
        assert_eq!(first.text, second.text);
        assert!(!first.truncated);
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let assembler = ContextAssembler::new(ContextConfig::default());
        let ranked = sample_ranked();
        let mut analysis = QueryAnalysis::default();
        analysis.travel_window.season = Some(Season::Summer);

        let context = assembler.assemble(&ranked, &analysis, None, None);
        let destinations = context.text.find("## Destinations").unwrap();
        let other_stays = context.text.find("## Other stays").unwrap();
        let amenities = context.text.find("## Amenities").unwrap();
        let seasonal = context.text.find("## Seasonal notes").unwrap();
        let guidelines = context.text.find("## Guidelines").unwrap();
        assert!(destinations < other_stays);
        assert!(other_stays < amenities);
        assert!(amenities < seasonal);
        assert!(seasonal < guidelines);
    }

    #[test]
    fn test_empty_sections_omitted() {
        let assembler = ContextAssembler::new(ContextConfig::default());
        let context = assembler.assemble(
            &RankedResults::default(),
            &QueryAnalysis::default(),
            None,
            None,
        );
        assert!(!context.text.contains("## Destinations"));
        assert!(!context.text.contains("## Amenities"));
        assert!(!context.text.contains("## Traveler"));
        assert!(!context.text.contains("## Seasonal notes"));
        // Framing and guidelines always render.
        assert!(context.text.contains("travel planning assistant"));
        assert!(context.text.contains("## Guidelines"));
    }

    #[test]
    fn test_properties_nest_under_their_destination() {
        let assembler = ContextAssembler::new(ContextConfig::default());
        let context =
            assembler.assemble(&sample_ranked(), &QueryAnalysis::default(), None, None);
        assert!(context.text.contains("Stays here:"));
        assert!(context.text.contains("Cliffside Suites (4.5*, ~280/night)"));
        // The unattached property lands in the standalone section.
        let other_stays = context.text.find("## Other stays").unwrap();
        let harbor = context.text.find("Harbor Inn").unwrap();
        assert!(harbor > other_stays);
    }

    #[test]
    fn test_amenities_grouped_by_tag_in_sorted_order() {
        let assembler = ContextAssembler::new(ContextConfig::default());
        let context =
            assembler.assemble(&sample_ranked(), &QueryAnalysis::default(), None, None);
        let family = context.text.find("family: Kids club").unwrap();
        let wellness = context.text.find("wellness: Spa, Sauna").unwrap();
        assert!(family < wellness);
    }

    #[test]
    fn test_user_section_renders_profile_and_learned_tastes() {
        let assembler = ContextAssembler::new(ContextConfig::default());
        let user = UserProfile {
            id: "u1".to_string(),
            name: Some("Ada".to_string()),
            stated_budget_per_day: Some(250.0),
            stated_interests: vec!["food".to_string()],
            stated_climates: vec!["warm".to_string()],
        };
        let mut preferences = NormalizedProfile::default();
        preferences.destination_types.insert("beach".to_string(), 1.0);
        preferences.destination_types.insert("island".to_string(), 0.45);

        let context = assembler.assemble(
            &RankedResults::default(),
            &QueryAnalysis::default(),
            Some(&user),
            Some(&preferences),
        );
        assert!(context.text.contains("Name: Ada"));
        assert!(context
            .text
            .contains("Learned destination tastes: beach (1.00), island (0.45)"));
    }

    #[test]
    fn test_clip_text_breaks_at_whitespace() {
        let clipped = clip_text("an unusually long description of a place", 20);
        assert!(clipped.chars().count() <= 20);
        assert!(clipped.ends_with("..."));
        // Never mid-word: the fragment before the ellipsis is whole words.
        assert_eq!(clipped, "an unusually...");
    }

    #[test]
    fn test_clip_text_leaves_short_text_alone() {
        assert_eq!(clip_text("short", 20), "short");
    }

    #[test]
    fn test_overflow_truncates_at_line_boundary_with_marker() {
        let config = ContextConfig {
            max_context_chars: 300,
            ..Default::default()
        };
        let assembler = ContextAssembler::new(config);
        let context =
            assembler.assemble(&sample_ranked(), &QueryAnalysis::default(), None, None);

        assert!(context.truncated);
        assert!(context.len_chars() <= 300);
        assert!(context.text.ends_with(TRUNCATION_MARKER));
        // Every line before the marker is a complete line from the
        // untruncated rendering.
        let untruncated = ContextAssembler::new(ContextConfig::default()).assemble(
            &sample_ranked(),
            &QueryAnalysis::default(),
            None,
            None,
        );
        for line in context.text.lines() {
            if line != TRUNCATION_MARKER {
                assert!(untruncated.text.lines().any(|l| l == line));
            }
        }
    }

    #[test]
    fn test_output_never_exceeds_budget() {
        for budget in [50usize, 120, 400, 1000, 4000] {
            let config = ContextConfig {
                max_context_chars: budget,
                ..Default::default()
            };
            let assembler = ContextAssembler::new(config);
            let context =
                assembler.assemble(&sample_ranked(), &QueryAnalysis::default(), None, None);
            assert!(
                context.len_chars() <= budget,
                "budget {} exceeded: {}",
                budget,
                context.len_chars()
            );
        }
    }

    #[test]
    fn test_request_section_renders_facets() {
        let assembler = ContextAssembler::new(ContextConfig::default());
        let mut analysis = QueryAnalysis::default();
        analysis.travel_window.start_date = chrono::NaiveDate::from_ymd_opt(2025, 6, 1);
        analysis.travel_window.end_date = chrono::NaiveDate::from_ymd_opt(2025, 6, 8);
        analysis.travel_window.duration_days = Some(7);
        analysis.budget.max_per_day = Some(250.0);
        analysis.traveler_info.group_size = Some(2);
        analysis
            .destination_preferences
            .destination_types
            .push("beach".to_string());
        analysis.required_amenities.push("pool".to_string());

        let context = assembler.assemble(
            &RankedResults::default(),
            &analysis,
            None,
            None,
        );
        assert!(context.text.contains("Travel window: 2025-06-01 to 2025-06-08, 7 days, summer"));
        assert!(context.text.contains("Budget: up to 250 USD per day"));
        assert!(context.text.contains("Group: 2 travelers"));
        assert!(context.text.contains("Destination styles: beach"));
        assert!(context.text.contains("Required amenities: pool"));
    }
}
