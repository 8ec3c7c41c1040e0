//! Playlist export - copies a liked set into a playlist on the catalog service.
//!
//! Matching is best-effort: songs the catalog cannot find are skipped and only
//! show up in the counts of the returned [`ExportSummary`].

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::enrichment::{CatalogApi, EnrichmentError, PlaylistApi};
use crate::model::Song;

/// The catalog's per-request limit for adding tracks.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Errors that abort an export
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("A user access token is required to export")]
    MissingToken,

    #[error("Could not resolve the catalog account: {0}")]
    Owner(EnrichmentError),

    #[error("Failed to create playlist: {0}")]
    Create(EnrichmentError),

    #[error("Failed to add tracks: {0}")]
    AddTracks(EnrichmentError),
}

/// Result of an export, including partial matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub playlist_id: String,
    pub playlist_url: String,
    /// Songs matched and added
    pub success_count: usize,
    /// Songs attempted
    pub total_count: usize,
}

impl ExportSummary {
    pub fn is_partial(&self) -> bool {
        self.success_count < self.total_count
    }

    /// User-facing one-liner.
    pub fn message(&self) -> String {
        if self.is_partial() {
            format!(
                "Exported {} of {} songs (some songs weren't found on Spotify)",
                self.success_count, self.total_count
            )
        } else {
            format!("Exported all {} songs", self.total_count)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Pause between per-song match requests
    pub request_delay: Duration,
    /// URIs per add-tracks request, at most [`MAX_TRACKS_PER_REQUEST`]
    pub chunk_size: usize,
    pub public: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(100),
            chunk_size: MAX_TRACKS_PER_REQUEST,
            public: false,
        }
    }
}

impl ExportSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            request_delay: Duration::from_millis(config.export.request_delay_ms),
            chunk_size: config.export.chunk_size.clamp(1, MAX_TRACKS_PER_REQUEST),
            public: config.export.public,
        }
    }
}

/// Creates catalog playlists from local song lists
pub struct PlaylistExporter {
    catalog: Arc<dyn CatalogApi>,
    playlists: Arc<dyn PlaylistApi>,
    settings: ExportSettings,
}

impl PlaylistExporter {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        playlists: Arc<dyn PlaylistApi>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            catalog,
            playlists,
            settings,
        }
    }

    /// Export for the account that owns `access_token`.
    pub async fn export_for_current_user(
        &self,
        access_token: &str,
        title: &str,
        songs: &[Song],
        description: Option<&str>,
    ) -> Result<ExportSummary, ExportError> {
        if access_token.trim().is_empty() {
            return Err(ExportError::MissingToken);
        }
        let owner_id = self
            .playlists
            .current_user(access_token)
            .await
            .map_err(ExportError::Owner)?;
        self.export(access_token, &owner_id, title, songs, description)
            .await
    }

    /// Create a playlist named `title` under `owner_id` and add every song the
    /// catalog can match.
    pub async fn export(
        &self,
        access_token: &str,
        owner_id: &str,
        title: &str,
        songs: &[Song],
        description: Option<&str>,
    ) -> Result<ExportSummary, ExportError> {
        if access_token.trim().is_empty() {
            return Err(ExportError::MissingToken);
        }

        tracing::info!(target: "vibe_swipe::export", songs = songs.len(), "Creating playlist");
        let created = self
            .playlists
            .create_playlist(access_token, owner_id, title, description, self.settings.public)
            .await
            .map_err(ExportError::Create)?;

        let mut uris = Vec::with_capacity(songs.len());
        for (index, song) in songs.iter().enumerate() {
            if index > 0 && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }
            match self.match_uri(access_token, song).await {
                Some(uri) => uris.push(uri),
                None => {
                    tracing::debug!(target: "vibe_swipe::export", song = %song.label(), "Not found on catalog");
                }
            }
        }

        for chunk in uris.chunks(self.settings.chunk_size.clamp(1, MAX_TRACKS_PER_REQUEST)) {
            self.playlists
                .add_tracks(access_token, &created.id, chunk)
                .await
                .map_err(ExportError::AddTracks)?;
        }

        let summary = ExportSummary {
            playlist_id: created.id,
            playlist_url: created.url,
            success_count: uris.len(),
            total_count: songs.len(),
        };
        tracing::info!(
            target: "vibe_swipe::export",
            matched = summary.success_count,
            total = summary.total_count,
            "Export finished"
        );
        Ok(summary)
    }

    /// First catalog URI for the song, trying the quoted query first.
    async fn match_uri(&self, access_token: &str, song: &Song) -> Option<String> {
        for query in export_queries(&song.title, &song.artist) {
            match self.catalog.search(&query, 1, access_token).await {
                Ok(matches) => {
                    if let Some(found) = matches.into_iter().next() {
                        return Some(found.uri);
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "vibe_swipe::export", song = %song.label(), "Match request failed: {}", e);
                }
            }
        }
        None
    }
}

/// Field-qualified query, then a plain one.
pub fn export_queries(title: &str, artist: &str) -> [String; 2] {
    let title = title.replace('"', "");
    let artist = artist.replace('"', "");
    [
        format!("track:\"{}\" artist:\"{}\"", title.trim(), artist.trim()),
        format!("{} {}", title.trim(), artist.trim()),
    ]
}
