//! Defensive normalization of raw intent-extraction output
//!
//! The analyzer's JSON is merged over the canonical default skeleton:
//! defaults win only where the raw object is absent or unusable. All
//! scalar-or-list ambiguity is resolved here, through [`MaybeList`], so the
//! rest of the engine never sees a wrapped scalar.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::types::{
    AccommodationPreferences, BudgetInfo, BudgetTier, DestinationPreferences, QueryAnalysis,
    Season, TravelWindow, TravelerInfo, Urgency,
};

/// Strict calendar format accepted for travel dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Boundary sum type for values the analyzer returns either bare or
/// wrapped in a list.
///
/// Deserialization order matters: a JSON array must be tried as `Many`
/// before `One` would reject it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MaybeList<T> {
    Many(Vec<T>),
    One(T),
}

impl MaybeList<Value> {
    /// Reduce to a single scalar: the first element if a list was
    /// supplied, the value itself otherwise. Empty lists and nulls
    /// reduce to `None`.
    fn into_scalar(self) -> Option<Value> {
        let value = match self {
            Self::Many(values) => values.into_iter().next()?,
            Self::One(value) => value,
        };
        if value.is_null() {
            None
        } else {
            Some(value)
        }
    }

    /// Reduce to a list: a bare scalar becomes a one-element list, nulls
    /// are dropped.
    fn into_list(self) -> Vec<Value> {
        match self {
            Self::Many(values) => values.into_iter().filter(|v| !v.is_null()).collect(),
            Self::One(value) => {
                if value.is_null() {
                    Vec::new()
                } else {
                    vec![value]
                }
            }
        }
    }
}

/// Normalizer for raw intent-extraction output.
///
/// Never raises: any irrecoverable parse failure is logged and replaced by
/// the canonical default [`QueryAnalysis`], so downstream stages always
/// receive a well-formed object.
#[derive(Debug, Clone, Default)]
pub struct QueryNormalizer;

impl QueryNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize the analyzer's raw response text.
    ///
    /// Non-JSON text is a structured-parse failure: it is logged and the
    /// default skeleton is returned.
    pub fn normalize_str(&self, raw: &str) -> QueryAnalysis {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.normalize(&value),
            Err(e) => {
                tracing::warn!(error = %e, "Intent extraction returned non-JSON; using default analysis");
                QueryAnalysis::default()
            }
        }
    }

    /// Normalize an already-parsed raw value
    pub fn normalize(&self, raw: &Value) -> QueryAnalysis {
        if !raw.is_object() {
            tracing::warn!("Intent extraction returned a non-object; using default analysis");
            return QueryAnalysis::default();
        }

        let mut analysis = QueryAnalysis {
            travel_window: self.normalize_window(field(raw, &["travel_dates", "travel_window"])),
            budget: self.normalize_budget(field(raw, &["budget"])),
            destination_preferences: self
                .normalize_destinations(field(raw, &["destination_preferences"])),
            traveler_info: self.normalize_travelers(field(raw, &["traveler_info", "travelers"])),
            activities: string_list(field(raw, &["activity_preferences", "activities"])),
            required_amenities: string_list(field(raw, &["required_amenities", "amenities"])),
            accommodation: self
                .normalize_accommodation(field(raw, &["accommodation_preferences", "accommodation"])),
            urgency: string_scalar(field(raw, &["urgency"]))
                .map(|s| Urgency::parse(&s))
                .unwrap_or(Urgency::Unknown),
            intent: string_scalar(field(raw, &["intent"])),
        };

        // Derived duration always wins over whatever the analyzer supplied.
        if let (Some(start), Some(end)) =
            (analysis.travel_window.start_date, analysis.travel_window.end_date)
        {
            analysis.travel_window.duration_days =
                Some(end.signed_duration_since(start).num_days());
        }

        analysis
    }

    fn normalize_window(&self, raw: Option<&Value>) -> TravelWindow {
        let start_date = date_scalar(field_in(raw, &["start_date", "start"]));
        let mut end_date = date_scalar(field_in(raw, &["end_date", "end"]));

        // A window that ends before it starts is structurally invalid.
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                tracing::warn!(%start, %end, "Travel window ends before it starts; dropping end date");
                end_date = None;
            }
        }

        TravelWindow {
            start_date,
            end_date,
            season: string_scalar(field_in(raw, &["season"])).and_then(|s| Season::parse(&s)),
            flexible: bool_scalar(field_in(raw, &["flexible", "flexibility"])),
            duration_days: f64_scalar(field_in(raw, &["duration_days", "duration"]))
                .map(|d| d as i64)
                .filter(|d| *d >= 0),
        }
    }

    fn normalize_budget(&self, raw: Option<&Value>) -> BudgetInfo {
        BudgetInfo {
            min_per_day: money_scalar(field_in(raw, &["min_per_day", "min"])),
            max_per_day: money_scalar(field_in(raw, &["max_per_day", "max"])),
            total: money_scalar(field_in(raw, &["total", "total_budget"])),
            currency: string_scalar(field_in(raw, &["currency"]))
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "USD".to_string()),
            tier: string_scalar(field_in(raw, &["tier", "level"])).and_then(|s| BudgetTier::parse(&s)),
        }
    }

    fn normalize_destinations(&self, raw: Option<&Value>) -> DestinationPreferences {
        DestinationPreferences {
            destination_types: string_list(field_in(raw, &["destination_types", "types"])),
            climates: string_list(field_in(raw, &["climates", "climate_preferences"])),
            named_locations: string_list(field_in(raw, &["named_locations", "locations"])),
            exclusions: string_list(field_in(raw, &["exclusions", "avoid"])),
        }
    }

    fn normalize_travelers(&self, raw: Option<&Value>) -> TravelerInfo {
        TravelerInfo {
            group_size: f64_scalar(field_in(raw, &["group_size", "count"]))
                .map(|n| n as i64)
                .filter(|n| *n > 0)
                .map(|n| n as u32),
            traveler_type: string_scalar(field_in(raw, &["traveler_type", "type"])),
            age_bands: string_list(field_in(raw, &["age_bands", "ages"])),
            special_needs: string_list(field_in(raw, &["special_needs"])),
        }
    }

    fn normalize_accommodation(&self, raw: Option<&Value>) -> AccommodationPreferences {
        AccommodationPreferences {
            min_rating: f64_scalar(field_in(raw, &["min_rating", "rating"]))
                .map(|r| (r as f32).clamp(0.0, 5.0)),
            room_type: string_scalar(field_in(raw, &["room_type"])),
            property_type: string_scalar(field_in(raw, &["property_type", "type"])),
        }
    }
}

/// Look a field up under any of its accepted names
fn field<'v>(raw: &'v Value, names: &[&str]) -> Option<&'v Value> {
    names.iter().find_map(|name| raw.get(*name))
}

fn field_in<'v>(raw: Option<&'v Value>, names: &[&str]) -> Option<&'v Value> {
    raw.and_then(|v| field(v, names))
}

/// Reduce a maybe-a-list value to a single scalar
fn scalar(value: Option<&Value>) -> Option<Value> {
    let value = value?;
    serde_json::from_value::<MaybeList<Value>>(value.clone())
        .ok()
        .and_then(MaybeList::into_scalar)
}

fn string_scalar(value: Option<&Value>) -> Option<String> {
    let scalar = scalar(value)?;
    match scalar {
        Value::String(s) => {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn f64_scalar(value: Option<&Value>) -> Option<f64> {
    let scalar = scalar(value)?;
    match scalar {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Budget figures are coerced to positive numeric; non-positive values are
/// treated as unknown rather than errors.
fn money_scalar(value: Option<&Value>) -> Option<f64> {
    f64_scalar(value).filter(|amount| *amount > 0.0)
}

fn bool_scalar(value: Option<&Value>) -> Option<bool> {
    let scalar = scalar(value)?;
    match scalar {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Dates are parsed against the strict calendar format; anything
/// unparseable becomes unknown rather than raising.
fn date_scalar(value: Option<&Value>) -> Option<NaiveDate> {
    let text = string_scalar(value)?;
    match NaiveDate::parse_from_str(&text, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::debug!(value = %text, "Unparseable travel date treated as unknown");
            None
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    let Ok(maybe) = serde_json::from_value::<MaybeList<Value>>(value.clone()) else {
        return Vec::new();
    };
    maybe
        .into_list()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => {
                let trimmed = s.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_list_becomes_unknown() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "travel_dates": { "start_date": [] }
        }));
        assert_eq!(analysis.travel_window.start_date, None);
    }

    #[test]
    fn test_scalar_wrapped_in_list_unwraps() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "travel_dates": { "start_date": ["2025-06-01"] },
            "destination_preferences": { "destination_types": "beach" }
        }));
        assert_eq!(
            analysis.travel_window.start_date,
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(
            analysis.destination_preferences.destination_types,
            vec!["beach".to_string()]
        );
    }

    #[test]
    fn test_non_json_yields_default_skeleton() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize_str("I'd love a beach holiday!");
        assert_eq!(analysis, QueryAnalysis::default());
    }

    #[test]
    fn test_non_object_yields_default_skeleton() {
        let normalizer = QueryNormalizer::new();
        assert_eq!(normalizer.normalize(&json!([1, 2, 3])), QueryAnalysis::default());
        assert_eq!(normalizer.normalize(&json!("beach")), QueryAnalysis::default());
    }

    #[test]
    fn test_unparseable_date_becomes_unknown() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "travel_dates": { "start_date": "June 1st, 2025", "end_date": "2025-13-40" }
        }));
        assert_eq!(analysis.travel_window.start_date, None);
        assert_eq!(analysis.travel_window.end_date, None);
    }

    #[test]
    fn test_duration_derived_from_window_overwrites_supplied() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "travel_dates": {
                "start_date": "2025-06-01",
                "end_date": "2025-06-08",
                "duration_days": 99
            }
        }));
        assert_eq!(analysis.travel_window.duration_days, Some(7));
    }

    #[test]
    fn test_end_before_start_drops_end() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "travel_dates": { "start_date": "2025-06-08", "end_date": "2025-06-01" }
        }));
        assert_eq!(
            analysis.travel_window.start_date,
            NaiveDate::from_ymd_opt(2025, 6, 8)
        );
        assert_eq!(analysis.travel_window.end_date, None);
        assert_eq!(analysis.travel_window.duration_days, None);
    }

    #[test]
    fn test_budget_coercion() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "budget": {
                "min_per_day": "-50",
                "max_per_day": "250",
                "total": 0,
                "currency": "eur"
            }
        }));
        assert_eq!(analysis.budget.min_per_day, None);
        assert_eq!(analysis.budget.max_per_day, Some(250.0));
        assert_eq!(analysis.budget.total, None);
        assert_eq!(analysis.budget.currency, "EUR");
    }

    #[test]
    fn test_currency_defaults_when_absent() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({ "budget": { "max_per_day": 100 } }));
        assert_eq!(analysis.budget.currency, "USD");
    }

    #[test]
    fn test_null_fields_stay_unknown() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "budget": { "max_per_day": null },
            "urgency": null,
            "traveler_info": { "group_size": null }
        }));
        assert_eq!(analysis.budget.max_per_day, None);
        assert_eq!(analysis.urgency, Urgency::Unknown);
        assert_eq!(analysis.traveler_info.group_size, None);
    }

    #[test]
    fn test_group_size_rejects_non_positive() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "traveler_info": { "group_size": 0 }
        }));
        assert_eq!(analysis.traveler_info.group_size, None);

        let analysis = normalizer.normalize(&json!({
            "traveler_info": { "group_size": [4], "traveler_type": "family" }
        }));
        assert_eq!(analysis.traveler_info.group_size, Some(4));
        assert_eq!(analysis.traveler_info.traveler_type.as_deref(), Some("family"));
    }

    #[test]
    fn test_urgency_and_tier_lenient_parsing() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "urgency": "ASAP",
            "budget": { "tier": "mid-range" }
        }));
        assert_eq!(analysis.urgency, Urgency::Immediate);
        assert_eq!(analysis.budget.tier, Some(BudgetTier::Moderate));
    }

    #[test]
    fn test_every_list_field_is_a_list_after_normalization() {
        let normalizer = QueryNormalizer::new();
        let analysis = normalizer.normalize(&json!({
            "activity_preferences": "hiking",
            "required_amenities": ["pool", null, 3],
            "destination_preferences": { "climates": null }
        }));
        assert_eq!(analysis.activities, vec!["hiking".to_string()]);
        assert_eq!(
            analysis.required_amenities,
            vec!["pool".to_string(), "3".to_string()]
        );
        assert!(analysis.destination_preferences.climates.is_empty());
    }
}
