//! Normalized query analysis types
//!
//! Every list-valued field is a real `Vec` and every optional scalar is a
//! typed `Option` after normalization. `Default` for these types is the
//! canonical skeleton the normalizer merges raw extraction output over.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Travel seasons used for temporal fit scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Parse a season name leniently ("fall" is accepted for autumn)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Some(Self::Winter),
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "autumn" | "fall" => Some(Self::Autumn),
            _ => None,
        }
    }

    /// Season a northern-hemisphere month falls in
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            12 | 1 | 2 => Some(Self::Winter),
            3..=5 => Some(Self::Spring),
            6..=8 => Some(Self::Summer),
            9..=11 => Some(Self::Autumn),
            _ => None,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "winter"),
            Self::Spring => write!(f, "spring"),
            Self::Summer => write!(f, "summer"),
            Self::Autumn => write!(f, "autumn"),
        }
    }
}

/// How soon the user intends to travel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Booking within days
    Immediate,
    /// Booking within a few weeks
    Soon,
    /// A concrete but distant plan
    Planned,
    /// No fixed timing
    Flexible,
    /// Not stated
    #[default]
    Unknown,
}

impl Urgency {
    /// Parse an urgency tag leniently
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "immediate" | "urgent" | "asap" | "last_minute" | "last-minute" => Self::Immediate,
            "soon" => Self::Soon,
            "planned" | "planning" => Self::Planned,
            "flexible" | "browsing" | "someday" => Self::Flexible,
            _ => Self::Unknown,
        }
    }
}

/// Coarse budget tier when no figures were stated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Budget,
    Moderate,
    Luxury,
}

impl BudgetTier {
    /// Parse a budget tier tag leniently
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "budget" | "cheap" | "low" => Some(Self::Budget),
            "moderate" | "mid" | "midrange" | "mid-range" | "medium" => Some(Self::Moderate),
            "luxury" | "high" | "premium" => Some(Self::Luxury),
            _ => None,
        }
    }
}

/// The requested travel window
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TravelWindow {
    /// Trip start date, if stated and parseable
    pub start_date: Option<NaiveDate>,

    /// Trip end date, if stated, parseable and not before the start
    pub end_date: Option<NaiveDate>,

    /// Requested or derived season
    pub season: Option<Season>,

    /// Whether the dates are flexible
    pub flexible: Option<bool>,

    /// Trip length in days; derived from the window when both ends are known
    pub duration_days: Option<i64>,
}

impl TravelWindow {
    /// Whether nothing about timing is known
    pub fn is_unknown(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.season.is_none()
    }

    /// The season the trip falls in: stated season, else derived from the
    /// start date's month
    pub fn effective_season(&self) -> Option<Season> {
        self.season.or_else(|| {
            self.start_date
                .and_then(|d| Season::from_month(chrono::Datelike::month(&d)))
        })
    }
}

/// Requested budget figures, all per-person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BudgetInfo {
    /// Minimum spend per day
    pub min_per_day: Option<f64>,

    /// Maximum spend per day
    pub max_per_day: Option<f64>,

    /// Total trip budget
    pub total: Option<f64>,

    /// ISO currency code; defaults to USD when the analyzer omits it
    pub currency: String,

    /// Coarse tier when no figures were given
    pub tier: Option<BudgetTier>,
}

impl Default for BudgetInfo {
    fn default() -> Self {
        Self {
            min_per_day: None,
            max_per_day: None,
            total: None,
            currency: "USD".to_string(),
            tier: None,
        }
    }
}

impl BudgetInfo {
    /// Whether no budget signal of any kind was stated
    pub fn is_unknown(&self) -> bool {
        self.min_per_day.is_none()
            && self.max_per_day.is_none()
            && self.total.is_none()
            && self.tier.is_none()
    }
}

/// Where the user wants to go
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DestinationPreferences {
    /// Destination-type tags (beach, city, mountain, ...)
    pub destination_types: Vec<String>,

    /// Climate tags (tropical, temperate, alpine, ...)
    pub climates: Vec<String>,

    /// Locations named outright ("Lisbon", "the Azores")
    pub named_locations: Vec<String>,

    /// Places or styles the user ruled out
    pub exclusions: Vec<String>,
}

/// Who is traveling
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TravelerInfo {
    /// Number of travelers
    pub group_size: Option<u32>,

    /// Traveler-type tag (solo, couple, family, friends, business)
    pub traveler_type: Option<String>,

    /// Age bands present in the group
    pub age_bands: Vec<String>,

    /// Accessibility or other special needs
    pub special_needs: Vec<String>,
}

impl TravelerInfo {
    /// Whether nothing about the group is known
    pub fn is_unknown(&self) -> bool {
        self.group_size.is_none() && self.traveler_type.is_none()
    }
}

/// Lodging requirements
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AccommodationPreferences {
    /// Minimum star rating
    pub min_rating: Option<f32>,

    /// Requested room type (suite, double, dorm)
    pub room_type: Option<String>,

    /// Requested property type (hotel, villa, hostel)
    pub property_type: Option<String>,
}

/// Fully normalized travel intent
///
/// Produced exclusively by [`super::QueryNormalizer`]; construction by hand
/// is only expected in tests.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct QueryAnalysis {
    /// When the user wants to travel
    pub travel_window: TravelWindow,

    /// What the user wants to spend
    pub budget: BudgetInfo,

    /// Where the user wants to go
    pub destination_preferences: DestinationPreferences,

    /// Who is traveling
    pub traveler_info: TravelerInfo,

    /// Activity preference tags
    pub activities: Vec<String>,

    /// Amenities the user requires
    pub required_amenities: Vec<String>,

    /// Lodging requirements
    pub accommodation: AccommodationPreferences,

    /// How soon the user intends to travel
    pub urgency: Urgency,

    /// Intent tag from the analyzer (inquiry, comparison, booking)
    pub intent: Option<String>,
}

impl QueryAnalysis {
    /// Flatten the per-facet tag lists into whitespace-joined search-term
    /// strings. Facets that reduce to an empty string are dropped.
    pub fn search_terms(&self) -> SearchTerms {
        let destination = join_terms(
            self.destination_preferences
                .destination_types
                .iter()
                .chain(self.destination_preferences.climates.iter())
                .chain(self.destination_preferences.named_locations.iter()),
        );
        let amenity = join_terms(self.required_amenities.iter());
        let activity = join_terms(self.activities.iter());
        let accommodation = join_terms(
            self.accommodation
                .property_type
                .iter()
                .chain(self.accommodation.room_type.iter()),
        );

        SearchTerms {
            destination,
            amenity,
            activity,
            accommodation,
        }
    }
}

fn join_terms<'a>(terms: impl Iterator<Item = &'a String>) -> Option<String> {
    let joined = terms
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Flattened per-facet search-term strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchTerms {
    /// Destination-facing terms (types, climates, named locations)
    pub destination: Option<String>,

    /// Required-amenity terms
    pub amenity: Option<String>,

    /// Activity terms
    pub activity: Option<String>,

    /// Accommodation terms (property and room type)
    pub accommodation: Option<String>,
}

impl SearchTerms {
    /// Whether every facet reduced to nothing
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.amenity.is_none()
            && self.activity.is_none()
            && self.accommodation.is_none()
    }
}
