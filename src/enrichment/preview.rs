//! Preview resolution across the primary and secondary catalogs.
//!
//! The primary catalog omits previews for a large share of tracks, so a
//! missing native preview falls back to the secondary catalog. Failures of
//! either provider degrade to "no preview" instead of an error.

use std::sync::Arc;

use super::domain::{PreviewCandidate, PreviewHit, PreviewSource, TrackMatch};
use super::traits::{CatalogApi, PreviewCatalogApi};

/// Secondary results inspected per lookup
const SECONDARY_LIMIT: u8 = 5;

/// Finds the best available preview clip for a title/artist pair
pub struct PreviewResolver {
    catalog: Arc<dyn CatalogApi>,
    secondary: Arc<dyn PreviewCatalogApi>,
}

impl PreviewResolver {
    pub fn new(catalog: Arc<dyn CatalogApi>, secondary: Arc<dyn PreviewCatalogApi>) -> Self {
        Self { catalog, secondary }
    }

    /// Resolve a preview, looking the pair up on the primary catalog first.
    pub async fn resolve(&self, title: &str, artist: &str) -> Option<PreviewHit> {
        let matched = match self.catalog.service_token().await {
            Ok(token) => self
                .catalog
                .search_track(title, artist, &token.access_token)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(target: "vibe_swipe::preview", "Catalog lookup failed: {}", e);
                    None
                }),
            Err(e) => {
                tracing::warn!(target: "vibe_swipe::preview", "Catalog token unavailable: {}", e);
                None
            }
        };
        self.resolve_with_match(title, artist, matched.as_ref()).await
    }

    /// Resolve a preview when the primary catalog lookup already happened.
    pub async fn resolve_with_match(
        &self,
        title: &str,
        artist: &str,
        matched: Option<&TrackMatch>,
    ) -> Option<PreviewHit> {
        if let Some(url) = matched.and_then(|m| m.preview_url.clone()) {
            return Some(PreviewHit {
                url,
                source: PreviewSource::Catalog,
                artwork: None,
            });
        }

        let term = format!("{} {}", title, artist);
        let candidates = match self.secondary.search_songs(term.trim(), SECONDARY_LIMIT).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(target: "vibe_swipe::preview", "Secondary preview lookup failed: {}", e);
                return None;
            }
        };

        let hit = candidates
            .into_iter()
            .find(|c| c.preview_url.is_some() && lenient_match(c, title, artist))?;

        tracing::debug!(target: "vibe_swipe::preview", title, artist, "Preview from secondary catalog");
        Some(PreviewHit {
            url: hit.preview_url?,
            source: PreviewSource::Secondary,
            artwork: hit.artwork,
        })
    }
}

/// Title or artist overlaps as a substring in either direction.
pub fn lenient_match(candidate: &PreviewCandidate, title: &str, artist: &str) -> bool {
    overlaps(&candidate.title, title) || overlaps(&candidate.artist, artist)
}

fn overlaps(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::EnrichmentError;
    use crate::enrichment::traits::mocks::{MockCatalog, MockPreviewCatalog, full_match};
    use std::sync::atomic::Ordering;

    fn candidate(title: &str, artist: &str, preview: Option<&str>) -> PreviewCandidate {
        PreviewCandidate {
            title: title.to_string(),
            artist: artist.to_string(),
            preview_url: preview.map(String::from),
            artwork: Some("https://art/600x600.jpg".to_string()),
        }
    }

    #[test]
    fn test_lenient_match_either_direction() {
        let c = candidate("Levitating (feat. DaBaby)", "Dua Lipa", None);
        assert!(lenient_match(&c, "Levitating", "Someone Else"));
        assert!(lenient_match(&c, "Other", "dua lipa"));
        let short = candidate("Hello", "Adele", None);
        assert!(lenient_match(&short, "Hello From The Other Side", "X"));
        assert!(!lenient_match(&short, "Rolling in the Deep", "Sia"));
    }

    #[test]
    fn test_empty_strings_never_match() {
        let c = candidate("", "", None);
        assert!(!lenient_match(&c, "Anything", "Anyone"));
    }

    #[tokio::test]
    async fn test_native_preview_wins() {
        let secondary = Arc::new(MockPreviewCatalog::with_results(vec![candidate(
            "Song",
            "Band",
            Some("secondary"),
        )]));
        let resolver = PreviewResolver::new(Arc::new(MockCatalog::default()), secondary.clone());

        let matched = full_match("Song", "Band");
        let hit = resolver
            .resolve_with_match("Song", "Band", Some(&matched))
            .await
            .unwrap();
        assert_eq!(hit.source, PreviewSource::Catalog);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_secondary_fallback_skips_results_without_preview() {
        let secondary = Arc::new(MockPreviewCatalog::with_results(vec![
            candidate("Song", "Band", None),
            candidate("Song (Live)", "Band", Some("https://a/live.m4a")),
        ]));
        let resolver = PreviewResolver::new(Arc::new(MockCatalog::default()), secondary);

        let mut matched = full_match("Song", "Band");
        matched.preview_url = None;
        let hit = resolver
            .resolve_with_match("Song", "Band", Some(&matched))
            .await
            .unwrap();
        assert_eq!(hit.source, PreviewSource::Secondary);
        assert_eq!(hit.url, "https://a/live.m4a");
        assert!(hit.artwork.is_some());
    }

    #[tokio::test]
    async fn test_unrelated_secondary_result_rejected() {
        let secondary = Arc::new(MockPreviewCatalog::with_results(vec![candidate(
            "Totally Different",
            "Stranger",
            Some("p"),
        )]));
        let resolver = PreviewResolver::new(Arc::new(MockCatalog::default()), secondary);
        assert!(resolver.resolve_with_match("Song", "Band", None).await.is_none());
    }

    #[tokio::test]
    async fn test_secondary_failure_degrades_to_absent() {
        let secondary = Arc::new(MockPreviewCatalog::with_error(EnrichmentError::Timeout));
        let resolver = PreviewResolver::new(Arc::new(MockCatalog::default()), secondary);
        assert!(resolver.resolve_with_match("Song", "Band", None).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_tolerates_catalog_auth_failure() {
        let catalog = Arc::new(MockCatalog::default().failing_tokens(5));
        let secondary = Arc::new(MockPreviewCatalog::with_results(vec![candidate(
            "Song",
            "Band",
            Some("https://a/s.m4a"),
        )]));
        let resolver = PreviewResolver::new(catalog, secondary);

        let hit = resolver.resolve("Song", "Band").await.unwrap();
        assert_eq!(hit.source, PreviewSource::Secondary);
    }

    #[tokio::test]
    async fn test_resolve_uses_catalog_match() {
        let catalog = Arc::new(MockCatalog::with_tracks(&[("Song", "Band")]));
        let resolver = PreviewResolver::new(catalog, Arc::new(MockPreviewCatalog::empty()));

        let hit = resolver.resolve("Song", "Band").await.unwrap();
        assert_eq!(hit.source, PreviewSource::Catalog);
    }
}
