//! Test utilities and fixtures for vibe-swipe tests.
//!
//! This module provides common test helpers, mock factories, and
//! database utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{temp_db, mock_song};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let song = mock_song("1", "Heat Waves", "Glass Animals");
//!     // ... test logic
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::model::{Genres, Song};

/// Creates a temporary database for testing.
///
/// The database lives in a temporary directory that is removed when the
/// returned `TempDir` is dropped. Migrations are run automatically.
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");

    let pool = crate::db::init_db(&crate::db::db_url(Some(db_path.as_path())))
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Creates a bare song: no album, art, preview or mood values.
///
/// Customize with struct update syntax:
///
/// ```ignore
/// let long = Song { duration: 600, ..mock_song("1", "Epic", "Band") };
/// ```
pub fn mock_song(id: &str, title: &str, artist: &str) -> Song {
    Song {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: None,
        album_art: None,
        duration: 180,
        genres: Genres::new(),
        energy: None,
        valence: None,
        preview_url: None,
    }
}

/// A song that passes strict acceptance.
pub fn complete_song(id: &str, title: &str, artist: &str) -> Song {
    Song {
        album: Some("Test Album".to_string()),
        album_art: Some(format!("https://img.example.com/{}.jpg", id)),
        preview_url: Some(format!("https://audio.example.com/{}.mp3", id)),
        ..mock_song(id, title, artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let playlists = crate::db::list_playlists(&pool, "anyone").await.unwrap();
        assert!(playlists.is_empty());
    }

    #[test]
    fn test_mock_song_defaults() {
        let song = mock_song("1", "Test Track", "Test Artist");
        assert_eq!(song.id, "1");
        assert_eq!(song.duration, 180);
        assert!(song.genres.is_empty());
        assert!(!song.is_complete());
    }

    #[test]
    fn test_complete_song_is_complete() {
        assert!(complete_song("7", "T", "A").is_complete());
    }
}
