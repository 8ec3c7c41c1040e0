//! Catalog enrichment - resolves suggested songs against external music catalogs.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`spotify/dto.rs`, `itunes/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Traits** - Seams the generator and exporter depend on, with test mocks
//! - **Preview** - Native preview first, secondary catalog second
//!
//! # Usage
//!
//! ```ignore
//! use enrichment::{CatalogApi, SpotifyClient};
//!
//! let catalog = SpotifyClient::new(client_id, client_secret, timeout);
//! let token = catalog.service_token().await?;
//! let hit = catalog.search_track("Heat Waves", "Glass Animals", &token.access_token).await?;
//! ```

pub mod domain;
pub mod itunes;
pub mod preview;
pub mod spotify;
pub mod traits;

pub use domain::{
    CreatedPlaylist, EnrichmentError, PreviewCandidate, PreviewHit, PreviewSource, ServiceToken,
    TrackMatch,
};
pub use itunes::ItunesClient;
pub use preview::PreviewResolver;
pub use spotify::SpotifyClient;
pub use traits::{CatalogApi, PlaylistApi, PreviewCatalogApi};
