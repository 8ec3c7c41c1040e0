//! Spotify Web API Data Transfer Objects
//!
//! These types match EXACTLY what the Spotify Web API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api

use serde::{Deserialize, Serialize};

/// Client-credentials token response from the accounts service
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Error body returned by the accounts service
#[derive(Debug, Clone, Deserialize)]
pub struct TokenError {
    pub error: String,
    pub error_description: Option<String>,
}

/// Error body returned by the Web API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}

/// Response from `GET /search?type=track`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<Track>,
    pub total: Option<u32>,
}

/// A full track object
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: Option<Album>,
    pub duration_ms: Option<u64>,
    /// Deprecated by the provider and frequently null
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// Response from `GET /me`
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// Body for `POST /users/{id}/playlists`
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub public: bool,
}

/// Response from `POST /users/{id}/playlists`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Body for `POST /playlists/{id}/tracks`
#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest<'a> {
    pub uris: &'a [String],
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let json = r#"{
            "access_token": "BQDf...",
            "token_type": "Bearer",
            "expires_in": 3600
        }"#;

        let token: TokenResponse = serde_json::from_str(json).expect("Should parse token");
        assert_eq!(token.access_token, "BQDf...");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_parse_token_error() {
        let json = r#"{"error": "invalid_client", "error_description": "Invalid client secret"}"#;
        let err: TokenError = serde_json::from_str(json).expect("Should parse token error");
        assert_eq!(err.error, "invalid_client");
        assert_eq!(err.error_description.as_deref(), Some("Invalid client secret"));
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "tracks": {
                "href": "https://api.spotify.com/v1/search?query=x",
                "items": [{
                    "id": "0VjIjW4GlUZAMYd2vXMi3b",
                    "uri": "spotify:track:0VjIjW4GlUZAMYd2vXMi3b",
                    "name": "Blinding Lights",
                    "artists": [{"id": "1Xyo4u8uXC1ZmMpatF05PJ", "name": "The Weeknd"}],
                    "album": {
                        "name": "After Hours",
                        "images": [
                            {"url": "https://i.scdn.co/image/640", "width": 640, "height": 640},
                            {"url": "https://i.scdn.co/image/300", "width": 300, "height": 300}
                        ]
                    },
                    "duration_ms": 200040,
                    "preview_url": null,
                    "popularity": 90,
                    "external_urls": {"spotify": "https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b"}
                }],
                "limit": 5,
                "offset": 0,
                "total": 1
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(json).expect("Should parse search");
        let page = response.tracks.expect("tracks page");
        assert_eq!(page.total, Some(1));
        let track = &page.items[0];
        assert_eq!(track.name, "Blinding Lights");
        assert_eq!(track.artists[0].name, "The Weeknd");
        assert!(track.preview_url.is_none());
        assert_eq!(track.album.as_ref().unwrap().images.len(), 2);
    }

    #[test]
    fn test_parse_search_without_tracks() {
        let response: SearchResponse = serde_json::from_str("{}").expect("Should parse empty");
        assert!(response.tracks.is_none());
    }

    #[test]
    fn test_parse_api_error() {
        let json = r#"{"error": {"status": 401, "message": "The access token expired"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(err.error.status, 401);
    }

    #[test]
    fn test_create_playlist_body() {
        let body = CreatePlaylistRequest {
            name: "Gym",
            description: None,
            public: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Gym", "public": false}));
    }
}
