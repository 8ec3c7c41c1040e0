//! Tunables for one generation run.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Which enriched songs may enter a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptancePolicy {
    /// Album art AND a preview clip are required
    #[default]
    Strict,
    /// Keep whatever enrichment produced, even without art or preview
    Lenient,
}

impl AcceptancePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptancePolicy::Strict => "strict",
            AcceptancePolicy::Lenient => "lenient",
        }
    }
}

impl FromStr for AcceptancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(AcceptancePolicy::Strict),
            "lenient" => Ok(AcceptancePolicy::Lenient),
            other => Err(format!("unknown acceptance policy '{}'", other)),
        }
    }
}

/// Configuration for the suggestion generator
#[derive(Debug, Clone)]
pub struct GenerationPolicy {
    /// Default batch size when the request does not say
    pub target_count: usize,
    /// Candidates requested per draft for a full-size target
    pub candidate_batch: usize,
    /// Extra drafts after the first
    pub backfill_rounds: usize,
    /// Songs per lead artist per batch; 0 disables
    pub max_per_artist: usize,
    pub acceptance: AcceptancePolicy,
    /// Concurrent catalog lookups
    pub enrich_concurrency: usize,
    /// Attempts at the catalog credential exchange
    pub auth_attempts: usize,
    /// Delay before the second attempt; doubles each time
    pub auth_backoff: Duration,
    /// Results requested per fallback query
    pub fallback_per_query: u8,
    /// Bound on every external call
    pub call_timeout: Duration,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            target_count: 25,
            candidate_batch: 40,
            backfill_rounds: 3,
            max_per_artist: 2,
            acceptance: AcceptancePolicy::Strict,
            enrich_concurrency: 4,
            auth_attempts: 3,
            auth_backoff: Duration::from_millis(250),
            fallback_per_query: 10,
            call_timeout: Duration::from_secs(15),
        }
    }
}

impl GenerationPolicy {
    pub fn from_config(config: &Config) -> Self {
        let generation = &config.generation;
        Self {
            target_count: generation.target_count.max(1),
            candidate_batch: generation.candidate_batch.max(1),
            backfill_rounds: generation.backfill_rounds,
            max_per_artist: generation.max_per_artist,
            acceptance: generation.acceptance,
            enrich_concurrency: generation.enrich_concurrency.max(1),
            auth_attempts: generation.auth_attempts.max(1),
            auth_backoff: Duration::from_millis(generation.auth_backoff_ms),
            fallback_per_query: generation.fallback_per_query.clamp(1, 50),
            call_timeout: Duration::from_secs(config.network.request_timeout_secs.max(1)),
        }
    }

    /// Total draft requests allowed per run.
    pub fn draft_budget(&self) -> usize {
        1 + self.backfill_rounds
    }

    /// Candidates to request when `remaining` songs are still needed.
    ///
    /// Scales `candidate_batch` to the shortfall, with a small floor so tiny
    /// top-ups still leave room for rejects.
    pub fn draft_size(&self, remaining: usize) -> usize {
        let scaled = (remaining * self.candidate_batch).div_ceil(self.target_count.max(1));
        scaled.max(remaining + 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_size_scales() {
        let policy = GenerationPolicy::default();
        assert_eq!(policy.draft_size(25), 40);
        assert_eq!(policy.draft_size(3), 8);
        assert_eq!(policy.draft_budget(), 4);
    }

    #[test]
    fn test_acceptance_parse() {
        assert_eq!("Strict".parse::<AcceptancePolicy>(), Ok(AcceptancePolicy::Strict));
        assert_eq!("lenient".parse::<AcceptancePolicy>(), Ok(AcceptancePolicy::Lenient));
        assert!("sometimes".parse::<AcceptancePolicy>().is_err());
    }

    #[test]
    fn test_from_config_clamps() {
        let mut config = Config::default();
        config.generation.enrich_concurrency = 0;
        config.generation.auth_attempts = 0;
        config.generation.max_per_artist = 0;
        let policy = GenerationPolicy::from_config(&config);
        assert_eq!(policy.enrich_concurrency, 1);
        assert_eq!(policy.auth_attempts, 1);
        // Zero keeps the throttle off
        assert_eq!(policy.max_per_artist, 0);
    }
}
