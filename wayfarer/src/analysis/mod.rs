//! Query analysis: defensive normalization of extracted travel intent
//!
//! The intent extraction provider returns semi-structured JSON whose shape
//! cannot be trusted: keys go missing, scalars arrive wrapped in
//! one-element lists, dates arrive malformed. This module owns the
//! ingestion boundary. Everything downstream of [`QueryNormalizer`] works
//! with plain scalars and real `Vec`s, never with maybe-a-list values.

mod followups;
mod normalizer;
mod types;

pub use followups::follow_up_prompts;
pub use normalizer::QueryNormalizer;
pub use types::{
    AccommodationPreferences, BudgetInfo, BudgetTier, DestinationPreferences, QueryAnalysis,
    SearchTerms, Season, TravelWindow, TravelerInfo, Urgency,
};
