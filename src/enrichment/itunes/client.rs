//! iTunes Search API client
//!
//! Unauthenticated public search, used only to find preview clips (and
//! artwork as a last resort) for tracks the primary catalog serves without one.

use std::time::Duration;

use async_trait::async_trait;

use super::{adapter, dto};
use crate::enrichment::domain::{EnrichmentError, PreviewCandidate};
use crate::enrichment::traits::PreviewCatalogApi;

/// iTunes Search API client
pub struct ItunesClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ItunesClient {
    /// Create a new client
    pub fn new(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: "https://itunes.apple.com".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(Duration::from_secs(5))
        }
    }

    async fn send_search_request(
        &self,
        term: &str,
        limit: u8,
    ) -> Result<dto::SearchResponse, EnrichmentError> {
        let url = format!(
            "{}/search?term={}&entity=song&limit={}",
            self.base_url,
            urlencoding::encode(term),
            limit
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(EnrichmentError::from_transport)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        // The store sometimes answers with a text/javascript content type
        let body = response
            .text()
            .await
            .map_err(EnrichmentError::from_transport)?;
        serde_json::from_str(&body).map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PreviewCatalogApi for ItunesClient {
    async fn search_songs(
        &self,
        term: &str,
        limit: u8,
    ) -> Result<Vec<PreviewCandidate>, EnrichmentError> {
        let response = self.send_search_request(term, limit).await?;
        Ok(adapter::to_candidates(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = ItunesClient::new(Duration::from_secs(15));
        assert_eq!(client.base_url, "https://itunes.apple.com");
    }

    #[tokio::test]
    async fn test_search_songs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("term", "Levitating Dua Lipa"))
            .and(query_param("entity", "song"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"resultCount":1,"results":[{"trackName":"Levitating","artistName":"Dua Lipa","previewUrl":"https://a/l.m4a","artworkUrl100":"https://i/100x100bb.jpg"}]}"#,
                "text/javascript",
            ))
            .mount(&server)
            .await;

        let client = ItunesClient::with_base_url(server.uri());
        let results = client.search_songs("Levitating Dua Lipa", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].preview_url.as_deref(), Some("https://a/l.m4a"));
        assert_eq!(results[0].artwork.as_deref(), Some("https://i/600x600bb.jpg"));
    }

    #[tokio::test]
    async fn test_server_error_is_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ItunesClient::with_base_url(server.uri());
        assert!(matches!(
            client.search_songs("x", 5).await,
            Err(EnrichmentError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = ItunesClient::with_base_url(server.uri());
        assert!(matches!(
            client.search_songs("x", 5).await,
            Err(EnrichmentError::Parse(_))
        ));
    }
}
