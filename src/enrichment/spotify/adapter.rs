//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where Spotify DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::{CreatedPlaylist, TrackMatch};

/// Convert a search response into matches, keeping the provider's order
pub fn to_matches(response: dto::SearchResponse) -> Vec<TrackMatch> {
    response
        .tracks
        .map(|page| page.items.into_iter().map(to_match).collect())
        .unwrap_or_default()
}

/// Convert a single track
pub fn to_match(track: dto::Track) -> TrackMatch {
    let artist = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let (album, album_art) = match track.album {
        Some(album) => {
            let art = largest_image(&album.images);
            (Some(album.name), art)
        }
        None => (None, None),
    };

    TrackMatch {
        track_id: track.id,
        uri: track.uri,
        title: track.name,
        artist,
        album,
        album_art,
        preview_url: track.preview_url.filter(|url| !url.is_empty()),
        duration_secs: track
            .duration_ms
            .map(|ms| ((ms + 500) / 1000) as u32)
            .filter(|secs| *secs > 0),
        external_url: track.external_urls.spotify,
    }
}

pub fn to_created_playlist(response: dto::PlaylistResponse) -> CreatedPlaylist {
    let url = response
        .external_urls
        .spotify
        .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", response.id));
    CreatedPlaylist {
        id: response.id,
        url,
    }
}

/// Pick the widest image; images without a width rank last.
fn largest_image(images: &[dto::Image]) -> Option<String> {
    images
        .iter()
        .enumerate()
        .max_by_key(|(idx, img)| (img.width.unwrap_or(0), std::cmp::Reverse(*idx)))
        .map(|(_, img)| img.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, preview: Option<&str>) -> dto::Track {
        dto::Track {
            id: "id1".to_string(),
            uri: "spotify:track:id1".to_string(),
            name: name.to_string(),
            artists: vec![
                dto::SimpleArtist { name: "Silk Sonic".to_string() },
                dto::SimpleArtist { name: "Bruno Mars".to_string() },
            ],
            album: Some(dto::Album {
                name: "An Evening".to_string(),
                images: vec![
                    dto::Image { url: "small".to_string(), width: Some(64), height: Some(64) },
                    dto::Image { url: "large".to_string(), width: Some(640), height: Some(640) },
                ],
            }),
            duration_ms: Some(183_499),
            preview_url: preview.map(String::from),
            external_urls: dto::ExternalUrls {
                spotify: Some("https://open.spotify.com/track/id1".to_string()),
            },
        }
    }

    #[test]
    fn test_to_match_joins_artists_and_picks_largest_art() {
        let m = to_match(track("Leave The Door Open", Some("https://p.scdn.co/x")));
        assert_eq!(m.artist, "Silk Sonic, Bruno Mars");
        assert_eq!(m.album_art.as_deref(), Some("large"));
        assert_eq!(m.duration_secs, Some(183));
        assert_eq!(m.preview_url.as_deref(), Some("https://p.scdn.co/x"));
    }

    #[test]
    fn test_empty_preview_is_none() {
        let m = to_match(track("Song", Some("")));
        assert!(m.preview_url.is_none());
    }

    #[test]
    fn test_missing_album() {
        let mut t = track("Song", None);
        t.album = None;
        let m = to_match(t);
        assert!(m.album.is_none());
        assert!(m.album_art.is_none());
    }

    #[test]
    fn test_to_matches_without_page() {
        assert!(to_matches(dto::SearchResponse { tracks: None }).is_empty());
    }

    #[test]
    fn test_created_playlist_url_fallback() {
        let created = to_created_playlist(dto::PlaylistResponse {
            id: "pl9".to_string(),
            name: "Mix".to_string(),
            external_urls: dto::ExternalUrls::default(),
        });
        assert_eq!(created.url, "https://open.spotify.com/playlist/pl9");
    }
}
