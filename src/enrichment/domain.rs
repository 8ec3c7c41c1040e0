//! Internal domain models for catalog lookups and preview resolution.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

use std::time::{Duration, Instant};

/// Short-lived bearer credential for the catalog's service scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceToken {
    pub access_token: String,
    pub expires_at: Instant,
}

impl ServiceToken {
    /// Treat tokens this close to expiry as already expired.
    pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

    pub fn new(access_token: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Instant::now() + expires_in,
        }
    }

    pub fn is_fresh(&self) -> bool {
        Instant::now() + Self::EXPIRY_MARGIN < self.expires_at
    }
}

/// A track resolved on the primary catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMatch {
    /// Catalog track ID
    pub track_id: String,
    /// Catalog URI used when adding to playlists
    pub uri: String,
    /// Canonical catalog title
    pub title: String,
    /// Canonical artist credit (joined with ", ")
    pub artist: String,
    pub album: Option<String>,
    /// Largest album image
    pub album_art: Option<String>,
    /// Native 30-second preview, often absent
    pub preview_url: Option<String>,
    pub duration_secs: Option<u32>,
    /// Public web link
    pub external_url: Option<String>,
}

/// Where a preview clip came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSource {
    /// Native preview on the primary catalog match
    Catalog,
    /// Secondary public catalog
    Secondary,
}

/// A resolved preview clip
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewHit {
    pub url: String,
    pub source: PreviewSource,
    /// Artwork offered by the secondary catalog, if any
    pub artwork: Option<String>,
}

/// A track returned by the secondary preview catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewCandidate {
    pub title: String,
    pub artist: String,
    pub preview_url: Option<String>,
    pub artwork: Option<String>,
}

/// A playlist container created on the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPlaylist {
    pub id: String,
    pub url: String,
}

/// Errors that can occur talking to the catalog services
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Credential exchange rejected: {0}")]
    Auth(String),

    #[error("Bearer token rejected")]
    Unauthorized,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Missing configuration: {0}")]
    Unconfigured(String),
}

impl EnrichmentError {
    /// Map a reqwest transport error, keeping timeouts distinguishable.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EnrichmentError::Timeout
        } else {
            EnrichmentError::Network(err.to_string())
        }
    }
}
