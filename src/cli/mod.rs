//! Command-line interface for vibe-swipe.
//!
//! This module provides CLI commands for prompting suggestions, swiping,
//! building playlists and exporting them.

mod commands;

pub use commands::{Cli, Commands, run_command};
