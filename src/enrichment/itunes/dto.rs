//! iTunes Search API Data Transfer Objects
//!
//! These types match EXACTLY what the iTunes Search API returns.
//! DO NOT use these types outside the itunes module - convert to domain types.
//!
//! API Reference: https://performance-partners.apple.com/search-api

use serde::Deserialize;

/// Response from `GET /search`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One result; non-song entities lack most of these fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub wrapper_type: Option<String>,
    pub kind: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub preview_url: Option<String>,
    pub artwork_url100: Option<String>,
    pub track_time_millis: Option<u64>,
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "resultCount": 1,
            "results": [{
                "wrapperType": "track",
                "kind": "song",
                "artistId": 1,
                "trackName": "Levitating",
                "artistName": "Dua Lipa",
                "collectionName": "Future Nostalgia",
                "previewUrl": "https://audio-ssl.itunes.apple.com/a.m4a",
                "artworkUrl100": "https://is1-ssl.mzstatic.com/image/100x100bb.jpg",
                "trackTimeMillis": 203064
            }]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).expect("Should parse search");
        assert_eq!(response.result_count, 1);
        let hit = &response.results[0];
        assert_eq!(hit.track_name.as_deref(), Some("Levitating"));
        assert_eq!(hit.kind.as_deref(), Some("song"));
        assert!(hit.artwork_url100.as_deref().unwrap().contains("100x100"));
    }

    #[test]
    fn test_parse_empty_response() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"resultCount": 0, "results": []}"#).expect("Should parse");
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_parse_result_without_preview() {
        let json = r#"{"results": [{"wrapperType": "collection", "collectionName": "Album"}]}"#;
        let response: SearchResponse = serde_json::from_str(json).expect("Should parse");
        assert!(response.results[0].preview_url.is_none());
        assert!(response.results[0].track_name.is_none());
    }
}
