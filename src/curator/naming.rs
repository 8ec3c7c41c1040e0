//! Playlist title and description.

use crate::model::Song;

/// Title and description for a finalized playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistMeta {
    pub title: String,
    pub description: String,
}

impl PlaylistMeta {
    pub const DEFAULT_DESCRIPTION: &'static str = "A personalized mix curated just for you";

    /// Deterministic title and description when the model is unavailable.
    ///
    /// The title combines a prompt keyword (study, workout, chill) with the
    /// first genre among the liked songs.
    pub fn fallback(liked: &[Song], prompt: &str) -> Self {
        let main_genre = liked.iter().flat_map(|s| s.genres.iter()).next();
        let genre = main_genre.map(String::as_str).unwrap_or("Music");
        let prompt = prompt.to_lowercase();

        let title = if prompt.contains("study") {
            format!("{} Study Session", genre)
        } else if prompt.contains("workout") {
            format!("{} Workout Mix", genre)
        } else if prompt.contains("chill") {
            format!("Chill {} Vibes", genre)
        } else if main_genre.is_some() {
            format!("{} Mix", genre)
        } else {
            "Your Vibe Swipe Playlist".to_string()
        };

        Self {
            title,
            description: format!(
                "A personalized {}-track playlist based on your music preferences",
                liked.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_song;

    fn song_with_genre(genre: &str) -> Song {
        let mut song = mock_song("1", "T", "A");
        song.genres.push(genre.to_string());
        song
    }

    #[test]
    fn test_fallback_uses_prompt_keyword_and_genre() {
        let liked = vec![song_with_genre("Lo-fi"), song_with_genre("Jazz")];
        let meta = PlaylistMeta::fallback(&liked, "Music to STUDY to");
        assert_eq!(meta.title, "Lo-fi Study Session");
        assert_eq!(
            meta.description,
            "A personalized 2-track playlist based on your music preferences"
        );

        assert_eq!(PlaylistMeta::fallback(&liked, "workout").title, "Lo-fi Workout Mix");
        assert_eq!(PlaylistMeta::fallback(&liked, "chill evening").title, "Chill Lo-fi Vibes");
        assert_eq!(PlaylistMeta::fallback(&liked, "anything").title, "Lo-fi Mix");
    }

    #[test]
    fn test_fallback_without_genres() {
        let liked = vec![mock_song("1", "T", "A")];
        assert_eq!(
            PlaylistMeta::fallback(&liked, "anything").title,
            "Your Vibe Swipe Playlist"
        );
        assert_eq!(PlaylistMeta::fallback(&liked, "workout").title, "Music Workout Mix");
    }
}
