//! Trait definitions for external catalog clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.
//!
//! # Example
//!
//! ```ignore
//! use vibe_swipe::enrichment::traits::CatalogApi;
//!
//! async fn lookup(catalog: &dyn CatalogApi) -> Result<(), EnrichmentError> {
//!     let token = catalog.service_token().await?;
//!     let hit = catalog.search_track("Heat Waves", "Glass Animals", &token.access_token).await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

use super::domain::{CreatedPlaylist, EnrichmentError, PreviewCandidate, ServiceToken, TrackMatch};

/// Primary music catalog: service credential plus track search.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Get a service-scope bearer token, cached until shortly before expiry.
    async fn service_token(&self) -> Result<ServiceToken, EnrichmentError>;

    /// Resolve a title/artist pair with progressively looser queries.
    ///
    /// Returns `Ok(None)` when every query came back empty.
    async fn search_track(
        &self,
        title: &str,
        artist: &str,
        token: &str,
    ) -> Result<Option<TrackMatch>, EnrichmentError>;

    /// Run a raw catalog query.
    async fn search(
        &self,
        query: &str,
        limit: u8,
        token: &str,
    ) -> Result<Vec<TrackMatch>, EnrichmentError>;
}

/// Playlist endpoints of the primary catalog, authorised by a user token.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    /// Account id of the token's owner.
    async fn current_user(&self, access_token: &str) -> Result<String, EnrichmentError>;

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
        public: bool,
    ) -> Result<CreatedPlaylist, EnrichmentError>;

    /// Add track URIs. Callers chunk to the provider's per-request limit.
    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), EnrichmentError>;
}

/// Secondary, unauthenticated catalog used for preview clips.
#[async_trait]
pub trait PreviewCatalogApi: Send + Sync {
    async fn search_songs(
        &self,
        term: &str,
        limit: u8,
    ) -> Result<Vec<PreviewCandidate>, EnrichmentError>;
}
