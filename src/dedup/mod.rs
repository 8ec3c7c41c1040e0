//! Duplicate tracking - keeps the same musical work from being suggested twice.
//!
//! - [`normalize`] maps a (title, artist) pair to a [`DuplicateKey`]
//! - [`DuplicateTracker`] remembers surfaced keys for a session and applies
//!   the per-artist throttle within one batch

mod normalize;
mod tracker;

pub use normalize::{DuplicateKey, normalize, normalize_artist, normalize_title, primary_artist};
pub use tracker::{Admission, DuplicateTracker, IssuedSong};
