//! Prompt text sent to the language model.

use super::DraftRequest;
use crate::model::Song;

/// Longest avoid-lists included in a draft prompt
const MAX_AVOID_ARTISTS: usize = 40;
const MAX_AVOID_SONGS: usize = 60;

pub const CHAT_SYSTEM: &str = r#"You are a friendly AI music curator for "Vibe Swipe", an AI playlist generator.

Your role is to:
- Understand the user's music preferences and mood
- Respond with encouragement and enthusiasm
- Suggest that they start swiping through song recommendations
- Keep responses conversational and under 100 words

Respond with JSON in this format:
{"message": "Your response message", "shouldShowSuggestions": true}

If the user describes a clear music preference, set shouldShowSuggestions to true."#;

pub const NAMING_SYSTEM: &str = r#"Based on the user's original request and their liked songs, generate a creative playlist title and description.

Return JSON in this format:
{"title": "Creative playlist title (under 50 characters)", "description": "Engaging description explaining the vibe and energy (under 150 characters)"}"#;

pub fn draft_system(count: usize) -> String {
    format!(
        r#"You are a music discovery assistant. Recommend {count} REAL, released songs that match the user's vibe and can be found on Spotify.

Rules:
- Only songs that actually exist; use the official title and primary artist credit
- Vary the artists; at most two songs per artist
- Accurate genre tags (one to three per song)

Return JSON:
{{"songs": [{{"title": "Song Title", "artist": "Artist Name", "album": "Album Name", "duration": 180, "genres": ["Genre"], "energy": 0.7, "valence": 0.6}}]}}

energy: 0-1 (0 = very calm, 1 = very energetic)
valence: 0-1 (0 = sad or angry, 1 = happy or uplifting)
duration: seconds"#
    )
}

pub fn draft_user(request: &DraftRequest) -> String {
    let mut text = format!(
        "Recommend {} songs for this vibe: \"{}\"",
        request.count, request.prompt
    );

    if !request.avoid_artists.is_empty() {
        let artists: Vec<&str> = request
            .avoid_artists
            .iter()
            .take(MAX_AVOID_ARTISTS)
            .map(String::as_str)
            .collect();
        text.push_str("\n\nThe user has already seen these artists; prefer different ones: ");
        text.push_str(&artists.join(", "));
    }

    if !request.avoid_songs.is_empty() {
        let songs: Vec<&str> = request
            .avoid_songs
            .iter()
            .rev()
            .take(MAX_AVOID_SONGS)
            .map(String::as_str)
            .collect();
        text.push_str("\n\nDo NOT suggest any of these songs again: ");
        text.push_str(&songs.join("; "));
    }

    text
}

pub fn naming_user(liked: &[Song], prompt: &str) -> String {
    let labels: Vec<String> = liked.iter().map(Song::label).collect();
    format!(
        "Original request: \"{}\"\n\nLiked songs: {}\n\nCreate a playlist title and description that captures these songs and the request.",
        prompt,
        labels.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_user_without_history() {
        let request = DraftRequest::new("rainy day jazz", 40);
        let text = draft_user(&request);
        assert!(text.contains("Recommend 40 songs"));
        assert!(text.contains("rainy day jazz"));
        assert!(!text.contains("already seen"));
    }

    #[test]
    fn test_draft_user_mentions_history() {
        let mut request = DraftRequest::new("gym", 10);
        request.avoid_artists = vec!["Eminem".to_string(), "Queen".to_string()];
        request.avoid_songs = vec!["Lose Yourself by Eminem".to_string()];
        let text = draft_user(&request);
        assert!(text.contains("Eminem, Queen"));
        assert!(text.contains("Lose Yourself by Eminem"));
    }

    #[test]
    fn test_draft_system_embeds_count() {
        assert!(draft_system(25).contains("Recommend 25 REAL"));
    }
}
