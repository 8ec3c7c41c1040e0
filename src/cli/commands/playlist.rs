//! Stored playlist commands and export.

use tokio::runtime::Runtime;

use super::suggest::resolve_session;
use super::{build_service, format_duration, open_pool, print_song};
use crate::config::Config;

/// Build a playlist from a session's liked songs
pub fn cmd_playlist_create(
    rt: &Runtime,
    config: &Config,
    session: Option<&str>,
    title: Option<&str>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        let session_id = resolve_session(&service, session).await?;
        let playlist = service.finalize(&session_id, title).await?;

        println!("Created playlist {}: {}", playlist.id, playlist.title);
        if let Some(description) = &playlist.description {
            println!("{}", description);
        }
        println!(
            "{} songs, {}",
            playlist.songs.len(),
            format_duration(playlist.total_duration)
        );
        Ok(())
    })
}

pub fn cmd_playlist_list(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        let playlists = service.playlists().await?;

        if playlists.is_empty() {
            println!("No playlists yet. Like some songs, then run `vibe-swipe playlist create`.");
            return Ok(());
        }

        println!("{:<6} {:<40} {:>6} {:>8}", "ID", "Title", "Songs", "Length");
        println!("{:-<64}", "");
        for playlist in &playlists {
            println!(
                "{:<6} {:<40} {:>6} {:>8}{}",
                playlist.id,
                playlist.title,
                playlist.songs.len(),
                format_duration(playlist.total_duration),
                if playlist.spotify_url.is_some() { "  ✓ exported" } else { "" }
            );
        }
        Ok(())
    })
}

pub fn cmd_playlist_show(rt: &Runtime, config: &Config, id: i64) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        let playlist = service.playlist(id).await?;

        println!("{}", playlist.title);
        if let Some(description) = &playlist.description {
            println!("{}", description);
        }
        println!(
            "{} songs, {} (created {})",
            playlist.songs.len(),
            format_duration(playlist.total_duration),
            playlist.created_at
        );
        if let Some(url) = &playlist.spotify_url {
            println!("Spotify: {}", url);
        }
        println!("{:-<60}", "");
        for (i, song) in playlist.songs.iter().enumerate() {
            print_song(i, song, None);
        }
        Ok(())
    })
}

pub fn cmd_playlist_rename(rt: &Runtime, config: &Config, id: i64, title: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        service.rename_playlist(id, title).await?;
        println!("Renamed playlist {}", id);
        Ok(())
    })
}

pub fn cmd_playlist_delete(rt: &Runtime, config: &Config, id: i64) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        service.delete_playlist(id).await?;
        println!("Deleted playlist {}", id);
        Ok(())
    })
}

/// Export a stored playlist with a user access token
pub fn cmd_export(
    rt: &Runtime,
    config: &Config,
    id: i64,
    token: &str,
    account: Option<&str>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        println!("Exporting playlist {}...", id);
        let summary = service.export_playlist(id, token, account).await?;

        if summary.is_partial() {
            println!("⚠ {}", summary.message());
        } else {
            println!("✓ {}", summary.message());
        }
        println!("Open: {}", summary.playlist_url);
        Ok(())
    })
}
