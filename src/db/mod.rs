//! Database module for sessions, issued songs, swipes and playlists.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Suggestion sessions and the songs issued in them
//! - Swipe decisions on issued songs
//! - Rebuilding a session's [`DuplicateTracker`]
//! - Playlist CRUD, always scoped to an owner
//!
//! # Example
//!
//! ```ignore
//! use vibe_swipe::db::{init_db, create_session};
//!
//! let pool = init_db("sqlite:vibe_swipe.db").await?;
//! let session = create_session(&pool, "local", "late night drive").await?;
//! ```

use std::path::Path;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::dedup::{DuplicateKey, DuplicateTracker, IssuedSong};
use crate::model::{Playlist, Song, SwipeAction, total_duration};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "vibe_swipe.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn to_json<T: serde::Serialize>(value: &T) -> sqlx::Result<String> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> sqlx::Result<T> {
    serde_json::from_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

// ============================================================================
// Sessions
// ============================================================================

/// A suggestion session started by one prompt.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub owner_id: String,
    pub prompt: String,
    pub created_at: String,
}

/// A song issued in a session, with the user's decision if any.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSong {
    pub song: Song,
    pub swipe: Option<SwipeAction>,
}

#[derive(sqlx::FromRow)]
struct SessionSongRow {
    song_json: String,
    swipe: Option<String>,
}

/// Create a session for `owner_id`.
pub async fn create_session(pool: &SqlitePool, owner_id: &str, prompt: &str) -> sqlx::Result<Session> {
    let session = Session {
        id: format!(
            "sess_{}_{:08x}",
            chrono::Utc::now().timestamp_millis(),
            rand::random::<u32>()
        ),
        owner_id: owner_id.to_string(),
        prompt: prompt.to_string(),
        created_at: now(),
    };

    sqlx::query("INSERT INTO sessions (id, owner_id, prompt, created_at) VALUES (?, ?, ?, ?)")
        .bind(&session.id)
        .bind(&session.owner_id)
        .bind(&session.prompt)
        .bind(&session.created_at)
        .execute(pool)
        .await?;

    Ok(session)
}

pub async fn get_session(pool: &SqlitePool, session_id: &str) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>(
        "SELECT id, owner_id, prompt, created_at FROM sessions WHERE id = ?",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await
}

/// Most recent session of an owner.
pub async fn latest_session(pool: &SqlitePool, owner_id: &str) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>(
        "SELECT id, owner_id, prompt, created_at FROM sessions
         WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
    )
    .bind(owner_id)
    .fetch_optional(pool)
    .await
}

/// Append issued songs to a session, after any songs already there.
pub async fn append_session_songs(
    pool: &SqlitePool,
    session_id: &str,
    songs: &[Song],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    let (next,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM session_songs WHERE session_id = ?",
    )
    .bind(session_id)
    .fetch_one(&mut *tx)
    .await?;

    for (offset, song) in songs.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO session_songs
                (session_id, song_id, position, title, artist, duplicate_key, song_json)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(&song.id)
        .bind(next + offset as i64)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(song.duplicate_key().as_str())
        .bind(to_json(song)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Songs issued in a session, in issue order.
pub async fn session_songs(pool: &SqlitePool, session_id: &str) -> sqlx::Result<Vec<SessionSong>> {
    let rows = sqlx::query_as::<_, SessionSongRow>(
        "SELECT song_json, swipe FROM session_songs WHERE session_id = ? ORDER BY position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(SessionSong {
                song: from_json(&row.song_json)?,
                swipe: row.swipe.and_then(|s| s.parse().ok()),
            })
        })
        .collect()
}

/// Rebuild the duplicate tracker for a session from its issued songs.
pub async fn load_tracker(
    pool: &SqlitePool,
    session_id: &str,
    max_per_artist: usize,
) -> sqlx::Result<DuplicateTracker> {
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT song_id, title, artist, duplicate_key FROM session_songs
         WHERE session_id = ? ORDER BY position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(DuplicateTracker::from_history(
        max_per_artist,
        rows.into_iter().map(|(id, title, artist, key)| {
            (
                id,
                IssuedSong {
                    key: DuplicateKey::from_stored(key),
                    label: format!("{} by {}", title, artist),
                    artist,
                },
            )
        }),
    ))
}

/// Record a swipe. Returns false when the song was not issued in the session.
pub async fn record_swipe(
    pool: &SqlitePool,
    session_id: &str,
    song_id: &str,
    action: SwipeAction,
) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE session_songs SET swipe = ? WHERE session_id = ? AND song_id = ?")
        .bind(action.as_str())
        .bind(session_id)
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Liked songs of a session, in issue order.
pub async fn liked_songs(pool: &SqlitePool, session_id: &str) -> sqlx::Result<Vec<Song>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT song_json FROM session_songs
         WHERE session_id = ? AND swipe = 'like' ORDER BY position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(|(json,)| from_json(json)).collect()
}

// ============================================================================
// Playlists
// ============================================================================

#[derive(sqlx::FromRow)]
struct PlaylistRow {
    id: i64,
    owner_id: String,
    title: String,
    description: Option<String>,
    songs_json: String,
    total_duration: i64,
    spotify_url: Option<String>,
    created_at: String,
}

impl TryFrom<PlaylistRow> for Playlist {
    type Error = sqlx::Error;

    fn try_from(row: PlaylistRow) -> Result<Self, Self::Error> {
        Ok(Playlist {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            songs: from_json(&row.songs_json)?,
            total_duration: u32::try_from(row.total_duration).unwrap_or(0),
            spotify_url: row.spotify_url,
            created_at: row.created_at,
        })
    }
}

const PLAYLIST_COLUMNS: &str =
    "id, owner_id, title, description, songs_json, total_duration, spotify_url, created_at";

/// Persist a playlist; `total_duration` is computed from the songs.
pub async fn create_playlist(
    pool: &SqlitePool,
    owner_id: &str,
    title: &str,
    description: Option<&str>,
    songs: &[Song],
) -> sqlx::Result<Playlist> {
    let created_at = now();
    let total = total_duration(songs);

    let result = sqlx::query(
        r#"
        INSERT INTO playlists (owner_id, title, description, songs_json, total_duration, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(to_json(&songs)?)
    .bind(i64::from(total))
    .bind(&created_at)
    .execute(pool)
    .await?;

    Ok(Playlist {
        id: result.last_insert_rowid(),
        owner_id: owner_id.to_string(),
        title: title.to_string(),
        description: description.map(String::from),
        songs: songs.to_vec(),
        total_duration: total,
        spotify_url: None,
        created_at,
    })
}

/// Playlists of an owner, newest first.
pub async fn list_playlists(pool: &SqlitePool, owner_id: &str) -> sqlx::Result<Vec<Playlist>> {
    let rows = sqlx::query_as::<_, PlaylistRow>(&format!(
        "SELECT {} FROM playlists WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        PLAYLIST_COLUMNS
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Playlist::try_from).collect()
}

/// A playlist, if it exists and belongs to `owner_id`.
pub async fn get_playlist(
    pool: &SqlitePool,
    playlist_id: i64,
    owner_id: &str,
) -> sqlx::Result<Option<Playlist>> {
    sqlx::query_as::<_, PlaylistRow>(&format!(
        "SELECT {} FROM playlists WHERE id = ? AND owner_id = ?",
        PLAYLIST_COLUMNS
    ))
    .bind(playlist_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .map(Playlist::try_from)
    .transpose()
}

/// Change the title. Returns false when no owned playlist matched.
pub async fn rename_playlist(
    pool: &SqlitePool,
    playlist_id: i64,
    owner_id: &str,
    title: &str,
) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE playlists SET title = ? WHERE id = ? AND owner_id = ?")
        .bind(title)
        .bind(playlist_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Remember where the playlist was exported to.
pub async fn set_export_url(
    pool: &SqlitePool,
    playlist_id: i64,
    owner_id: &str,
    url: &str,
) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE playlists SET spotify_url = ? WHERE id = ? AND owner_id = ?")
        .bind(url)
        .bind(playlist_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_playlist(pool: &SqlitePool, playlist_id: i64, owner_id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ? AND owner_id = ?")
        .bind(playlist_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
