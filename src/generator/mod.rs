//! Suggestion generator - turns a prompt into a batch of playable songs.
//!
//! One generation runs as an explicit state machine:
//!
//! ```text
//! Draft ──► Filter ──► Enrich ──┐
//!   ▲                           │ short of target, drafts left
//!   └───────────────────────────┘
//!   │ drafts exhausted / model failing after a success
//!   ▼
//! Fallback ──► Done
//! ```
//!
//! A single draft budget (`1 + backfill_rounds`) bounds the loop; reaching the
//! target ends it early. Filtering runs serially against the session's
//! [`DuplicateTracker`](crate::dedup::DuplicateTracker); enrichment runs
//! concurrently but results are applied in acceptance order.

mod mood;
mod pipeline;
mod policy;

pub use mood::MoodCategory;
pub use pipeline::{PromptResponse, SuggestionGenerator};
pub use policy::{AcceptancePolicy, GenerationPolicy};

use crate::model::Song;

/// Errors that abort a generation request
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// Rejected before any network call
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// The language-model service cannot be used (unreachable, bad key, no credits)
    #[error("Suggestion service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The catalog rejected our service credentials
    #[error("Catalog authentication failed: {0}")]
    AuthFailure(String),

    #[error("Generation cancelled")]
    Cancelled,
}

/// Result of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// Accepted songs, in acceptance order
    pub songs: Vec<Song>,
    pub target: usize,
    /// Draft requests sent to the model
    pub rounds: usize,
    /// Whether the catalog fallback queries ran
    pub fallback_used: bool,
}

impl GenerationOutcome {
    /// How many songs short of the target the batch is.
    pub fn shortfall(&self) -> usize {
        self.target.saturating_sub(self.songs.len())
    }

    pub fn is_short(&self) -> bool {
        self.shortfall() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_song;

    #[test]
    fn test_shortfall() {
        let outcome = GenerationOutcome {
            songs: vec![mock_song("1", "A", "B")],
            target: 3,
            rounds: 4,
            fallback_used: true,
        };
        assert_eq!(outcome.shortfall(), 2);
        assert!(outcome.is_short());

        let full = GenerationOutcome { target: 1, ..outcome };
        assert!(!full.is_short());
    }
}
