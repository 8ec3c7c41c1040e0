//! Adapter layer: Convert iTunes DTOs to domain models
//!
//! This is the ONLY place where iTunes DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::PreviewCandidate;

/// Convert a search response, dropping results that carry no track name
pub fn to_candidates(response: dto::SearchResponse) -> Vec<PreviewCandidate> {
    response
        .results
        .into_iter()
        .filter_map(|result| {
            let title = result.track_name?;
            Some(PreviewCandidate {
                title,
                artist: result.artist_name.unwrap_or_default(),
                preview_url: result.preview_url.filter(|url| !url.is_empty()),
                artwork: result.artwork_url100.map(|url| upscale_artwork(&url)),
            })
        })
        .collect()
}

/// The store serves any square size from the same path; ask for 600px.
pub fn upscale_artwork(url: &str) -> String {
    url.replace("100x100", "600x600")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: Option<&str>, preview: Option<&str>) -> dto::SearchResult {
        dto::SearchResult {
            wrapper_type: Some("track".to_string()),
            kind: Some("song".to_string()),
            track_name: title.map(String::from),
            artist_name: Some("Tame Impala".to_string()),
            collection_name: None,
            preview_url: preview.map(String::from),
            artwork_url100: Some("https://is1.mzstatic.com/x/100x100bb.jpg".to_string()),
            track_time_millis: None,
        }
    }

    #[test]
    fn test_to_candidates_upscales_artwork() {
        let candidates = to_candidates(dto::SearchResponse {
            result_count: 1,
            results: vec![result(Some("The Less I Know the Better"), Some("https://a/p.m4a"))],
        });
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].artwork.as_deref(),
            Some("https://is1.mzstatic.com/x/600x600bb.jpg")
        );
        assert_eq!(candidates[0].preview_url.as_deref(), Some("https://a/p.m4a"));
    }

    #[test]
    fn test_results_without_track_name_dropped() {
        let candidates = to_candidates(dto::SearchResponse {
            result_count: 2,
            results: vec![result(None, Some("p")), result(Some("Borderline"), None)],
        });
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Borderline");
        assert!(candidates[0].preview_url.is_none());
    }
}
