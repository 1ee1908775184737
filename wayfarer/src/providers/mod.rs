//! External provider contracts
//!
//! Wayfarer follows a BYOE approach: both generative collaborators are
//! consumed as black boxes behind these traits. Retries, backoff and
//! caching belong to the implementations, not to this engine; the engine
//! only validates and combines what comes back.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;

/// Produces a fixed-dimension embedding vector for a piece of text.
///
/// Implementations must be deterministic for identical input and must
/// always return vectors of the engine's configured dimension; a
/// mismatched dimension aborts the search stage loudly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Extracts structured travel intent from a free-text user message.
///
/// Returns the analyzer's raw response text. The engine tolerates missing
/// keys, scalar-wrapped-as-list values and outright non-JSON output; see
/// [`crate::analysis::QueryNormalizer`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Analyze a user message, given the current date for resolving
    /// relative expressions ("next month", "this winter")
    async fn extract(&self, message: &str, today: NaiveDate) -> Result<String>;
}
