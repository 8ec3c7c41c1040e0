//! Spotify Web API client
//!
//! Handles the client-credentials exchange, track search and the playlist
//! endpoints used for export.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! Service tokens are cached process-wide and dropped when the API answers 401.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::token::TokenCache;
use super::{adapter, dto};
use crate::enrichment::domain::{CreatedPlaylist, EnrichmentError, ServiceToken, TrackMatch};
use crate::enrichment::traits::{CatalogApi, PlaylistApi};

/// Results requested per ladder query
const SEARCH_LIMIT: u8 = 5;

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    accounts_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    tokens: TokenCache,
}

impl SpotifyClient {
    /// Create a new client with service credentials
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self::with_urls(
            client_id,
            client_secret,
            timeout,
            "https://accounts.spotify.com",
            "https://api.spotify.com/v1",
        )
    }

    /// Create a client against custom endpoints
    pub fn with_urls(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
        accounts_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            accounts_url: accounts_url.into(),
            api_url: api_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tokens: TokenCache::new(),
        }
    }

    /// Create a client for testing with one mock server for both hosts
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self::with_urls(
            "test-id",
            "test-secret",
            Duration::from_secs(5),
            base.clone(),
            format!("{}/v1", base),
        )
    }

    /// Exchange the client credentials for a fresh token
    async fn request_token(&self) -> Result<ServiceToken, EnrichmentError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(EnrichmentError::Unconfigured(
                "Spotify client id/secret".to_string(),
            ));
        }

        let url = format!("{}/api/token", self.accounts_url);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(EnrichmentError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let reason = match response.json::<dto::TokenError>().await {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => format!("HTTP {}", status),
            };
            tracing::warn!(target: "vibe_swipe::catalog", %status, %reason, "Token exchange rejected");
            return Err(EnrichmentError::Auth(reason));
        }

        let token = response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        tracing::debug!(target: "vibe_swipe::catalog", expires_in = token.expires_in, "Obtained service token");
        Ok(ServiceToken::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
        ))
    }

    /// Send an authorised request and decode its JSON body.
    ///
    /// A 401 drops `token` from the cache when it is the service token.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &str,
    ) -> Result<T, EnrichmentError> {
        let response = self.send(request, token).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }

    async fn send(&self, request: RequestBuilder, token: &str) -> Result<Response, EnrichmentError> {
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(EnrichmentError::from_transport)?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate(token);
            return Err(EnrichmentError::Unauthorized);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(EnrichmentError::NoMatches);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiErrorResponse>().await {
                return Err(EnrichmentError::ApiError(error.error.message));
            }
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(response)
    }
}

/// Progressively looser queries for a title/artist pair.
pub fn search_ladder(title: &str, artist: &str) -> Vec<String> {
    let title = title.replace('"', "").trim().to_string();
    let artist = artist.replace('"', "").trim().to_string();

    let mut queries = Vec::with_capacity(4);
    if !artist.is_empty() {
        queries.push(format!("track:\"{}\" artist:\"{}\"", title, artist));
        queries.push(format!("\"{}\" \"{}\"", title, artist));
        queries.push(format!("{} {}", title, artist));
    }
    queries.push(title);
    queries
}

/// Prefer the first result with a native preview, else the top result.
pub fn pick_best(mut matches: Vec<TrackMatch>) -> Option<TrackMatch> {
    let preview_idx = matches.iter().position(|m| m.preview_url.is_some());
    match preview_idx {
        Some(idx) => Some(matches.swap_remove(idx)),
        None => matches.into_iter().next(),
    }
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn service_token(&self) -> Result<ServiceToken, EnrichmentError> {
        self.tokens.get_or_fetch(|| self.request_token()).await
    }

    async fn search_track(
        &self,
        title: &str,
        artist: &str,
        token: &str,
    ) -> Result<Option<TrackMatch>, EnrichmentError> {
        // A failed rung falls through to the next one; only a 401 stops the
        // ladder so the caller can refresh the token.
        let mut answered = false;
        let mut last_error = None;
        for query in search_ladder(title, artist) {
            let matches = match self.search(&query, SEARCH_LIMIT, token).await {
                Ok(matches) => matches,
                Err(EnrichmentError::NoMatches) => Vec::new(),
                Err(e @ EnrichmentError::Unauthorized) => return Err(e),
                Err(e) => {
                    tracing::debug!(target: "vibe_swipe::catalog", %query, "Search failed: {}", e);
                    last_error = Some(e);
                    continue;
                }
            };
            answered = true;
            if !matches.is_empty() {
                tracing::debug!(target: "vibe_swipe::catalog", %query, hits = matches.len(), "Search matched");
                return Ok(pick_best(matches));
            }
        }
        match last_error {
            Some(e) if !answered => Err(e),
            _ => {
                tracing::debug!(target: "vibe_swipe::catalog", title, artist, "No catalog match");
                Ok(None)
            }
        }
    }

    async fn search(
        &self,
        query: &str,
        limit: u8,
        token: &str,
    ) -> Result<Vec<TrackMatch>, EnrichmentError> {
        let url = format!(
            "{}/search?q={}&type=track&limit={}",
            self.api_url,
            urlencoding::encode(query),
            limit
        );
        let response: dto::SearchResponse =
            self.send_json(self.http_client.get(&url), token).await?;
        Ok(adapter::to_matches(response))
    }
}

#[async_trait]
impl PlaylistApi for SpotifyClient {
    async fn current_user(&self, access_token: &str) -> Result<String, EnrichmentError> {
        let url = format!("{}/me", self.api_url);
        let user: dto::CurrentUser = self
            .send_json(self.http_client.get(&url), access_token)
            .await?;
        Ok(user.id)
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
        public: bool,
    ) -> Result<CreatedPlaylist, EnrichmentError> {
        let url = format!(
            "{}/users/{}/playlists",
            self.api_url,
            urlencoding::encode(owner_id)
        );
        let body = dto::CreatePlaylistRequest {
            name,
            description,
            public,
        };
        let response: dto::PlaylistResponse = self
            .send_json(self.http_client.post(&url).json(&body), access_token)
            .await?;
        Ok(adapter::to_created_playlist(response))
    }

    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), EnrichmentError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_url,
            urlencoding::encode(playlist_id)
        );
        let body = dto::AddTracksRequest { uris };
        self.send(self.http_client.post(&url).json(&body), access_token)
            .await?;
        Ok(())
    }
}
