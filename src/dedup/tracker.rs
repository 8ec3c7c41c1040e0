//! Per-session record of the songs already surfaced to a user.

use std::collections::{HashMap, HashSet};

use super::normalize::{DuplicateKey, primary_artist};
use crate::model::Candidate;

/// Outcome of offering a candidate to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New work; its key is now remembered and an artist slot reserved
    Accepted,
    /// Same musical work was already surfaced
    Duplicate,
    /// The lead artist already filled its slots in this batch
    ArtistThrottled,
}

/// A song handed out earlier in the session.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedSong {
    pub key: DuplicateKey,
    pub label: String,
    pub artist: String,
}

/// Tracks surfaced works so no song is suggested twice.
///
/// The tracker is owned by one session and passed into each generation
/// request by the caller. Persisting it between requests is the caller's job
/// (see [`crate::db::load_tracker`]).
#[derive(Debug, Clone, Default)]
pub struct DuplicateTracker {
    seen: HashSet<DuplicateKey>,
    issued: HashMap<String, IssuedSong>,
    excluded_ids: HashSet<String>,
    artist_counts: HashMap<String, usize>,
    /// Maximum accepted songs per lead artist in one batch; 0 disables
    max_per_artist: usize,
}

impl DuplicateTracker {
    pub fn new(max_per_artist: usize) -> Self {
        Self {
            max_per_artist,
            ..Default::default()
        }
    }

    /// Rebuild a tracker from songs already issued in a session.
    pub fn from_history(
        max_per_artist: usize,
        history: impl IntoIterator<Item = (String, IssuedSong)>,
    ) -> Self {
        let mut tracker = Self::new(max_per_artist);
        for (id, song) in history {
            tracker.record_issued(id, song);
        }
        tracker
    }

    pub fn seen(&self, key: &DuplicateKey) -> bool {
        self.seen.contains(key)
    }

    pub fn remember(&mut self, key: DuplicateKey) {
        self.seen.insert(key);
    }

    /// Remember a song that was handed to the user under `id`.
    pub fn record_issued(&mut self, id: impl Into<String>, song: IssuedSong) {
        self.seen.insert(song.key.clone());
        self.issued.insert(id.into(), song);
    }

    /// Mark ids the caller has already shown.
    ///
    /// Known ids pull in their musical identity; unknown ids are kept so they
    /// can never be reissued verbatim.
    pub fn exclude_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a String>) {
        for id in ids {
            if let Some(song) = self.issued.get(id) {
                self.seen.insert(song.key.clone());
            }
            self.excluded_ids.insert(id.clone());
        }
    }

    pub fn is_excluded_id(&self, id: &str) -> bool {
        self.excluded_ids.contains(id) || self.issued.contains_key(id)
    }

    /// Start a new batch: per-artist counts reset, memory of works persists.
    pub fn begin_batch(&mut self) {
        self.artist_counts.clear();
    }

    /// Filter step for one candidate: duplicate check, artist throttle, then
    /// remember.
    pub fn admit(&mut self, candidate: &Candidate) -> Admission {
        let key = candidate.duplicate_key();
        if self.seen(&key) {
            return Admission::Duplicate;
        }

        let artist = primary_artist(&candidate.artist);
        let count = self.artist_counts.get(&artist).copied().unwrap_or(0);
        if self.max_per_artist > 0 && count >= self.max_per_artist {
            return Admission::ArtistThrottled;
        }

        self.artist_counts.insert(artist, count + 1);
        self.remember(key);
        Admission::Accepted
    }

    /// Give back an artist slot reserved by [`admit`](Self::admit) when the
    /// candidate did not make it into the batch.
    pub fn release_artist(&mut self, artist: &str) {
        let key = primary_artist(artist);
        if let Some(count) = self.artist_counts.get_mut(&key) {
            *count = count.saturating_sub(1);
        }
    }

    /// Move a reserved slot from the artist a candidate was admitted under to
    /// the artist the catalog credits.
    ///
    /// Returns `false` (and keeps the old reservation) when the credited
    /// artist has no free slot left.
    pub fn transfer_artist(&mut self, from: &str, to: &str) -> bool {
        let (from, to) = (primary_artist(from), primary_artist(to));
        if from == to {
            return true;
        }
        let count = self.artist_counts.get(&to).copied().unwrap_or(0);
        if self.max_per_artist > 0 && count >= self.max_per_artist {
            return false;
        }
        if let Some(reserved) = self.artist_counts.get_mut(&from) {
            *reserved = reserved.saturating_sub(1);
        }
        self.artist_counts.insert(to, count + 1);
        true
    }

    /// Distinct artists of the given issued ids, in first-seen order.
    pub fn artists_for(&self, ids: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter_map(|id| self.issued.get(id))
            .filter(|song| seen.insert(song.artist.to_lowercase()))
            .map(|song| song.artist.clone())
            .collect()
    }

    /// Labels of the given issued ids.
    pub fn labels_for(&self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.issued.get(id))
            .map(|song| song.label.clone())
            .collect()
    }

    /// Number of remembered works.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::normalize;

    fn issued(title: &str, artist: &str) -> IssuedSong {
        IssuedSong {
            key: normalize(title, artist),
            label: format!("{} by {}", title, artist),
            artist: artist.to_string(),
        }
    }

    #[test]
    fn test_admit_rejects_duplicates_by_identity() {
        let mut tracker = DuplicateTracker::new(2);
        assert_eq!(tracker.admit(&Candidate::new("Levitating", "Dua Lipa")), Admission::Accepted);
        assert_eq!(
            tracker.admit(&Candidate::new("Levitating (Remix)", "DUA LIPA")),
            Admission::Duplicate
        );
    }

    #[test]
    fn test_artist_throttle() {
        let mut tracker = DuplicateTracker::new(2);
        assert_eq!(tracker.admit(&Candidate::new("One", "Ed Sheeran")), Admission::Accepted);
        assert_eq!(tracker.admit(&Candidate::new("Two", "Ed Sheeran")), Admission::Accepted);
        assert_eq!(
            tracker.admit(&Candidate::new("Three", "Ed Sheeran ft. Someone")),
            Admission::ArtistThrottled
        );
        // A throttled candidate is not remembered
        assert!(!tracker.seen(&normalize("Three", "Ed Sheeran")));
    }

    #[test]
    fn test_throttle_disabled_with_zero() {
        let mut tracker = DuplicateTracker::new(0);
        for title in ["A", "B", "C", "D"] {
            assert_eq!(tracker.admit(&Candidate::new(title, "Same")), Admission::Accepted);
        }
    }

    #[test]
    fn test_transfer_artist_moves_reservation() {
        let mut tracker = DuplicateTracker::new(1);
        assert_eq!(tracker.admit(&Candidate::new("Hello", "Adele")), Admission::Accepted);
        assert_eq!(tracker.admit(&Candidate::new("Anything", "Someone Else")), Admission::Accepted);

        // Credited artist is full: reservation stays where it was
        assert!(!tracker.transfer_artist("Someone Else", "Adele"));
        assert_eq!(
            tracker.admit(&Candidate::new("Other", "Someone Else")),
            Admission::ArtistThrottled
        );

        // Same lead artist under another spelling is a no-op
        assert!(tracker.transfer_artist("Someone Else", "SOMEONE ELSE"));

        assert!(tracker.transfer_artist("Someone Else", "New Artist"));
        assert_eq!(
            tracker.admit(&Candidate::new("Other", "Someone Else")),
            Admission::Accepted
        );
        assert_eq!(
            tracker.admit(&Candidate::new("Second", "New Artist")),
            Admission::ArtistThrottled
        );
    }

    #[test]
    fn test_release_artist_frees_slot() {
        let mut tracker = DuplicateTracker::new(1);
        assert_eq!(tracker.admit(&Candidate::new("One", "Lizzo")), Admission::Accepted);
        tracker.release_artist("Lizzo");
        assert_eq!(tracker.admit(&Candidate::new("Two", "Lizzo")), Admission::Accepted);
    }

    #[test]
    fn test_begin_batch_resets_counts_not_memory() {
        let mut tracker = DuplicateTracker::new(1);
        tracker.admit(&Candidate::new("One", "Adele"));
        tracker.begin_batch();
        assert_eq!(tracker.admit(&Candidate::new("Two", "Adele")), Admission::Accepted);
        assert_eq!(tracker.admit(&Candidate::new("One", "Adele")), Admission::Duplicate);
    }

    #[test]
    fn test_exclude_known_id_marks_identity() {
        let mut tracker = DuplicateTracker::new(2);
        tracker.record_issued("gen_1", issued("Flowers", "Miley Cyrus"));
        tracker.exclude_ids(&["gen_1".to_string(), "unknown".to_string()]);

        assert!(tracker.is_excluded_id("gen_1"));
        assert!(tracker.is_excluded_id("unknown"));
        assert_eq!(
            tracker.admit(&Candidate::new("flowers", "Miley Cyrus")),
            Admission::Duplicate
        );
    }

    #[test]
    fn test_from_history() {
        let tracker = DuplicateTracker::from_history(
            2,
            vec![
                ("a".to_string(), issued("Song A", "Artist")),
                ("b".to_string(), issued("Song B", "Artist")),
            ],
        );
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.artists_for(&["a".to_string(), "b".to_string()]), vec!["Artist"]);
        assert_eq!(tracker.labels_for(&["b".to_string()]), vec!["Song B by Artist"]);
    }
}
