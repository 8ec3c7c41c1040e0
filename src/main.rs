//! Vibe Swipe - describe a mood, swipe through suggested songs, keep a playlist.
//!
//! A language model drafts candidate songs for a free-text prompt. Each
//! candidate is verified against the Spotify catalog and given a preview clip
//! (falling back to iTunes), duplicates are filtered out, and the survivors
//! are served as a batch. Liked songs become a stored playlist that can be
//! exported to Spotify.

pub mod cli;
pub mod config;
pub mod curator;
pub mod db;
pub mod dedup;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod generator;
pub mod model;
pub mod session;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("vibe_swipe=info".parse()?))
        .init();

    cli::run_command(&args)
}
