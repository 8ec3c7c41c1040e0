//! Preview lookups and config management.

use std::sync::Arc;
use tokio::runtime::Runtime;

use super::{itunes_client, spotify_client};
use crate::config::{self, Config};
use crate::enrichment::{PreviewResolver, PreviewSource};

/// Resolve a preview clip for one song
pub fn cmd_preview(rt: &Runtime, config: &Config, title: &str, artist: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let resolver = PreviewResolver::new(
            Arc::new(spotify_client(config)),
            Arc::new(itunes_client(config)),
        );

        match resolver.resolve(title, artist).await {
            Some(hit) => {
                let source = match hit.source {
                    PreviewSource::Catalog => "Spotify",
                    PreviewSource::Secondary => "iTunes",
                };
                println!("✓ Preview ({}): {}", source, hit.url);
                if let Some(art) = &hit.artwork {
                    println!("  Artwork: {}", art);
                }
            }
            None => println!("✗ No preview found for \"{}\" by {}", title, artist),
        }
        Ok(())
    })
}

/// Show config location, database and credential status.
///
/// Secret values are never printed, only whether they are set.
pub fn cmd_config_check(config: &Config) -> anyhow::Result<()> {
    match config::config_path() {
        Some(path) if path.exists() => println!("Config file: {:?}", path),
        Some(path) => println!("Config file: {:?} (not created, using defaults)", path),
        None => println!("Config file: unavailable (no config directory)"),
    }
    println!("Database:    {:?}", config.database_path());
    println!("Owner:       {}", config.storage.owner_id);
    println!();

    let credentials = &config.credentials;
    println!("Credentials");
    println!("===========");
    println!("  OpenAI key:          {}", status(credentials.has_openai_key()));
    println!("  Spotify credentials: {}", status(credentials.has_spotify_credentials()));
    println!();

    let generation = &config.generation;
    println!("Generation");
    println!("==========");
    println!("  Model:        {}", config.curator.model);
    println!("  Batch size:   {}", generation.target_count);
    println!("  Acceptance:   {}", generation.acceptance.as_str());
    println!(
        "  Per artist:   {}",
        match generation.max_per_artist {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        }
    );

    if !credentials.has_openai_key() || !credentials.has_spotify_credentials() {
        println!();
        println!("Set OPENAI_API_KEY, SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET,");
        println!("or fill in the [credentials] section of the config file.");
    }
    Ok(())
}

/// Write a default config file
pub fn cmd_config_init(force: bool) -> anyhow::Result<()> {
    let existing = config::config_path().filter(|p| p.exists());
    if let (Some(path), false) = (existing, force) {
        anyhow::bail!("Config file already exists at {:?} (use --force to overwrite)", path);
    }
    let path = config::save(&Config::default())?;
    println!("Wrote default config to {:?}", path);
    Ok(())
}

fn status(present: bool) -> &'static str {
    if present { "✓ set" } else { "✗ missing" }
}
