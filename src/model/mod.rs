//! Core data models shared across the suggestion pipeline.
//!
//! Defines the primary records: [`Song`], [`Candidate`], [`GenerationRequest`],
//! [`ChatReply`] and the persisted [`Playlist`]. Songs serialize with camelCase
//! field names so stored batches and playlists keep the same shape the client
//! consumes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::dedup::{self, DuplicateKey};

/// Genre tags, usually between zero and three.
pub type Genres = SmallVec<[String; 3]>;

/// Duration used when neither the catalog nor the model reports one.
pub const DEFAULT_DURATION_SECS: u32 = 180;

/// A playable song suggestion.
///
/// Once handed to a caller a `Song` is treated as a value: edits produce a new
/// `Song` rather than mutating the one that was returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Unique within a generated batch
    pub id: String,
    pub title: String,
    /// May be a composite ("A & B") for collaborations
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    /// Length in seconds, always positive
    pub duration: u32,
    #[serde(default)]
    pub genres: Genres,
    /// Perceived intensity in [0, 1]; display copy only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    /// Perceived positivity in [0, 1]; display copy only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl Song {
    /// Normalized musical identity of this song.
    pub fn duplicate_key(&self) -> DuplicateKey {
        dedup::normalize(&self.title, &self.artist)
    }

    /// Whether both album art and a preview clip are present.
    pub fn is_complete(&self) -> bool {
        self.album_art.as_deref().is_some_and(|s| !s.is_empty())
            && self.preview_url.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// "Title by Artist" label used in prompts and CLI output.
    pub fn label(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

/// A song proposed before filtering and enrichment.
///
/// Numeric fields always carry a value: missing or unusable inputs are
/// replaced by explicit defaults when the candidate is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genres: Genres,
    pub energy: f32,
    pub valence: f32,
    pub duration: u32,
}

impl Candidate {
    /// Create a candidate with neutral defaults for everything but the identity.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: None,
            genres: Genres::new(),
            energy: 0.5,
            valence: 0.5,
            duration: DEFAULT_DURATION_SECS,
        }
    }

    pub fn duplicate_key(&self) -> DuplicateKey {
        dedup::normalize(&self.title, &self.artist)
    }

    pub fn label(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

/// One "generate" or "generate more" action. Consumed once, never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Ids of songs already shown in this session
    pub exclude_ids: Vec<String>,
    pub target_count: usize,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, target_count: usize) -> Self {
        Self {
            prompt: prompt.into(),
            exclude_ids: Vec::new(),
            target_count,
        }
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.exclude_ids.extend(ids);
        self
    }

    /// The prompt with surrounding whitespace removed.
    pub fn trimmed_prompt(&self) -> &str {
        self.prompt.trim()
    }
}

/// A swipe decision on a suggested song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAction {
    Like,
    Skip,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Skip => "skip",
        }
    }
}

impl std::str::FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" | "yes" | "right" => Ok(SwipeAction::Like),
            "skip" | "no" | "left" => Ok(SwipeAction::Skip),
            other => Err(format!("unknown swipe action '{}' (expected like or skip)", other)),
        }
    }
}

/// Conversational answer to a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    /// Whether the prompt described a clear enough preference to suggest songs
    pub should_suggest: bool,
}

impl ChatReply {
    pub const DEFAULT_MESSAGE: &'static str =
        "I'd love to help you create the perfect playlist! Tell me more about what you're looking for.";
}

/// A persisted playlist built from a liked set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub songs: Vec<Song>,
    /// Sum of song durations in seconds
    pub total_duration: u32,
    pub spotify_url: Option<String>,
    pub created_at: String,
}

/// Total duration of a song list in seconds.
pub fn total_duration(songs: &[Song]) -> u32 {
    songs.iter().map(|s| s.duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_song;

    #[test]
    fn test_song_serializes_camel_case() {
        let song = Song {
            album_art: Some("https://img/1.jpg".to_string()),
            preview_url: Some("https://audio/1.mp3".to_string()),
            ..mock_song("1", "Heat Waves", "Glass Animals")
        };
        let json = serde_json::to_string(&song).unwrap();
        assert!(json.contains("\"albumArt\""));
        assert!(json.contains("\"previewUrl\""));
        assert!(!json.contains("album_art"));
    }

    #[test]
    fn test_song_completeness() {
        let mut song = mock_song("1", "Heat Waves", "Glass Animals");
        song.album_art = Some("https://img/1.jpg".to_string());
        song.preview_url = None;
        assert!(!song.is_complete());

        song.preview_url = Some(String::new());
        assert!(!song.is_complete());

        song.preview_url = Some("https://audio/1.mp3".to_string());
        assert!(song.is_complete());
    }

    #[test]
    fn test_song_deserializes_without_optional_fields() {
        let json = r#"{"id":"a","title":"T","artist":"A","duration":200}"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert!(song.genres.is_empty());
        assert!(song.album.is_none());
        assert!(song.preview_url.is_none());
    }

    #[test]
    fn test_swipe_action_parse() {
        assert_eq!("like".parse::<SwipeAction>(), Ok(SwipeAction::Like));
        assert_eq!(" SKIP ".parse::<SwipeAction>(), Ok(SwipeAction::Skip));
        assert!("maybe".parse::<SwipeAction>().is_err());
    }

    #[test]
    fn test_total_duration() {
        let songs = vec![
            mock_song("1", "A", "X"),
            Song { duration: 100, ..mock_song("2", "B", "Y") },
        ];
        assert_eq!(total_duration(&songs), 280);
    }

    #[test]
    fn test_candidate_defaults() {
        let c = Candidate::new("Song", "Artist");
        assert_eq!(c.duration, DEFAULT_DURATION_SECS);
        assert_eq!(c.energy, 0.5);
        assert_eq!(c.valence, 0.5);
    }
}
