//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `suggest`: Prompting, generating more, swiping and listing session songs
//! - `playlist`: Stored playlists and export
//! - `tools`: Preview lookups and config management

mod playlist;
mod suggest;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::config::{self, Config};
use crate::curator::OpenAiClient;
use crate::db;
use crate::enrichment::{ItunesClient, SpotifyClient};
use crate::error::Error;
use crate::export::{ExportSettings, PlaylistExporter};
use crate::generator::{GenerationError, GenerationPolicy, SuggestionGenerator};
use crate::model::{Song, SwipeAction};
use crate::session::SessionService;

pub use playlist::{
    cmd_export, cmd_playlist_create, cmd_playlist_delete, cmd_playlist_list, cmd_playlist_rename,
    cmd_playlist_show,
};
pub use suggest::{cmd_more, cmd_songs, cmd_suggest, cmd_swipe};
pub use tools::{cmd_config_check, cmd_config_init, cmd_preview};

/// Vibe Swipe CLI
#[derive(Parser)]
#[command(author, version, about = "Describe a vibe, swipe through songs, keep a playlist", long_about = None)]
pub struct Cli {
    /// Database path (defaults to the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Describe a vibe and get a batch of songs
    Suggest {
        /// What you want to listen to
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
        /// Suggest songs even if the prompt reads as small talk
        #[arg(short, long)]
        force: bool,
    },
    /// Another batch for a session, without repeats
    More {
        /// Session id (defaults to the latest session)
        session: Option<String>,
    },
    /// Like or skip a suggested song
    Swipe {
        session: String,
        song_id: String,
        /// like | skip
        action: SwipeAction,
    },
    /// List the songs issued in a session
    Songs {
        /// Session id (defaults to the latest session)
        session: Option<String>,
    },
    /// Manage stored playlists
    Playlist {
        #[command(subcommand)]
        command: PlaylistCommands,
    },
    /// Export a stored playlist to Spotify
    Export {
        /// Playlist id
        id: i64,
        /// User access token with playlist scopes
        #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
        /// Spotify account id (defaults to the token's owner)
        #[arg(long)]
        account: Option<String>,
    },
    /// Look up a preview clip for a song
    Preview { title: String, artist: String },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum PlaylistCommands {
    /// Turn a session's liked songs into a playlist
    Create {
        /// Session id (defaults to the latest session)
        session: Option<String>,
        /// Use this title instead of a generated one
        #[arg(short, long)]
        title: Option<String>,
    },
    /// List playlists
    List,
    /// Show a playlist and its songs
    Show { id: i64 },
    Rename { id: i64, title: String },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show where config lives and which credentials are set
    Check,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let mut config = config::load();
    if let Some(db) = &cli.db {
        config.storage.database = Some(db.clone());
    }

    match &cli.command {
        Commands::Suggest { prompt, force } => cmd_suggest(&rt, &config, &prompt.join(" "), *force),
        Commands::More { session } => cmd_more(&rt, &config, session.as_deref()),
        Commands::Swipe {
            session,
            song_id,
            action,
        } => cmd_swipe(&rt, &config, session, song_id, *action),
        Commands::Songs { session } => cmd_songs(&rt, &config, session.as_deref()),
        Commands::Playlist { command } => match command {
            PlaylistCommands::Create { session, title } => {
                cmd_playlist_create(&rt, &config, session.as_deref(), title.as_deref())
            }
            PlaylistCommands::List => cmd_playlist_list(&rt, &config),
            PlaylistCommands::Show { id } => cmd_playlist_show(&rt, &config, *id),
            PlaylistCommands::Rename { id, title } => cmd_playlist_rename(&rt, &config, *id, title),
            PlaylistCommands::Delete { id } => cmd_playlist_delete(&rt, &config, *id),
        },
        Commands::Export { id, token, account } => {
            cmd_export(&rt, &config, *id, token, account.as_deref())
        }
        Commands::Preview { title, artist } => cmd_preview(&rt, &config, title, artist),
        Commands::Config { command } => match command {
            ConfigCommands::Check => cmd_config_check(&config),
            ConfigCommands::Init { force } => cmd_config_init(*force),
        },
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Open (and migrate) the configured database, creating its directory.
pub(crate) async fn open_pool(config: &Config) -> anyhow::Result<sqlx::SqlitePool> {
    let path = config.database_path();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    tracing::debug!("Opening database {:?}", path);
    Ok(db::init_db(&db::db_url(Some(path.as_path()))).await?)
}

fn timeout(config: &Config) -> Duration {
    Duration::from_secs(config.network.request_timeout_secs.max(1))
}

pub(crate) fn spotify_client(config: &Config) -> SpotifyClient {
    let credentials = &config.credentials;
    SpotifyClient::new(
        credentials.spotify_client_id.clone().unwrap_or_default(),
        credentials.spotify_client_secret.clone().unwrap_or_default(),
        timeout(config),
    )
}

pub(crate) fn itunes_client(config: &Config) -> ItunesClient {
    ItunesClient::new(timeout(config))
}

/// Wire the live clients into a session service.
pub(crate) fn build_service(config: &Config, pool: sqlx::SqlitePool) -> SessionService {
    let curator = Arc::new(OpenAiClient::new(
        config.credentials.openai_api_key.clone().unwrap_or_default(),
        config.curator.model.clone(),
        config.curator.base_url.clone(),
        timeout(config),
    ));
    let spotify = Arc::new(spotify_client(config));
    let itunes = Arc::new(itunes_client(config));

    let generator = SuggestionGenerator::new(
        curator.clone(),
        spotify.clone(),
        itunes,
        GenerationPolicy::from_config(config),
    );
    let exporter = PlaylistExporter::new(
        spotify.clone(),
        spotify,
        ExportSettings::from_config(config),
    );
    SessionService::new(pool, generator, curator, exporter, config.storage.owner_id.clone())
}

/// Token cancelled on Ctrl-C, so an abandoned generation stops issuing calls.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling...");
            guard.cancel();
        }
    });
    cancel
}

/// Attach a hint for errors the user can fix.
pub(crate) fn explain(err: Error) -> anyhow::Error {
    let hint = match err.root() {
        Error::Generation(GenerationError::ServiceUnavailable(_)) => Some(
            "Set OPENAI_API_KEY (or credentials.openai_api_key in the config file) to a key with available credits.",
        ),
        Error::Generation(GenerationError::AuthFailure(_)) => Some(
            "Check SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET.",
        ),
        _ => None,
    };
    match hint {
        Some(hint) => anyhow::anyhow!("{}\n{}", err, hint),
        None => anyhow::Error::new(err),
    }
}

/// Print a numbered song line.
pub(crate) fn print_song(index: usize, song: &Song, swipe: Option<SwipeAction>) {
    let marker = match swipe {
        Some(SwipeAction::Like) => "♥",
        Some(SwipeAction::Skip) => "✗",
        None => " ",
    };
    println!(
        "{:>3}. {} {} [{}] ({})",
        index + 1,
        marker,
        song.label(),
        format_duration(song.duration),
        song.id
    );
    if let Some(album) = &song.album {
        println!("       Album: {}", album);
    }
    if !song.genres.is_empty() {
        println!("       Genres: {}", song.genres.join(", "));
    }
    match &song.preview_url {
        Some(url) => println!("       Preview: {}", url),
        None => println!("       Preview: none"),
    }
}

/// Format seconds as m:ss.
pub(crate) fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_suggest_joins_prompt_words() {
        let cli = Cli::parse_from(["vibe-swipe", "suggest", "rainy", "day", "jazz", "--force"]);
        match cli.command {
            Commands::Suggest { prompt, force } => {
                assert_eq!(prompt.join(" "), "rainy day jazz");
                assert!(force);
            }
            _ => panic!("expected suggest"),
        }
    }

    #[test]
    fn test_swipe_action_parses() {
        let cli = Cli::parse_from(["vibe-swipe", "swipe", "s1", "song-1", "like"]);
        assert!(matches!(
            cli.command,
            Commands::Swipe {
                action: SwipeAction::Like,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["vibe-swipe", "swipe", "s1", "song-1", "maybe"]).is_err());
    }

    #[test]
    fn test_global_db_flag() {
        let cli = Cli::parse_from(["vibe-swipe", "playlist", "list", "--db", "/tmp/x.db"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(185), "3:05");
    }

    #[test]
    fn test_explain_adds_hint_for_unavailable_service() {
        let err = Error::from(GenerationError::ServiceUnavailable("quota".into())).context("suggest");
        let msg = explain(err).to_string();
        assert!(msg.contains("OPENAI_API_KEY"));

        let plain = explain(Error::not_found("session x")).to_string();
        assert!(!plain.contains("OPENAI_API_KEY"));
    }
}
