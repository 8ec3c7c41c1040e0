//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\vibe-swipe\config.toml
//! - macOS: ~/Library/Application Support/vibe-swipe/config.toml
//! - Linux: ~/.config/vibe-swipe/config.toml
//!
//! The config file is human-readable and editable. Credentials can also come
//! from the environment (`OPENAI_API_KEY`, `SPOTIFY_CLIENT_ID`,
//! `SPOTIFY_CLIENT_SECRET`), which wins over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generator::AcceptancePolicy;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Language-model endpoint
    pub curator: CuratorConfig,

    /// Suggestion generator tunables
    pub generation: GenerationConfig,

    pub network: NetworkConfig,

    /// Playlist export settings
    pub export: ExportConfig,

    /// Database location and local owner
    pub storage: StorageConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
}

impl Credentials {
    fn present(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    pub fn has_openai_key(&self) -> bool {
        Self::present(&self.openai_api_key)
    }

    pub fn has_spotify_credentials(&self) -> bool {
        Self::present(&self.spotify_client_id) && Self::present(&self.spotify_client_secret)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    pub model: String,
    /// OpenAI-compatible API root
    pub base_url: String,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Songs per batch
    pub target_count: usize,
    /// Candidates requested from the model for a full batch
    pub candidate_batch: usize,
    /// Extra model requests when a batch comes up short
    pub backfill_rounds: usize,
    /// Songs per artist per batch (0 = unlimited)
    pub max_per_artist: usize,
    /// "strict" requires art and preview, "lenient" keeps partial songs
    pub acceptance: AcceptancePolicy,
    pub enrich_concurrency: usize,
    pub auth_attempts: usize,
    pub auth_backoff_ms: u64,
    pub fallback_per_query: u8,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_count: 25,
            candidate_batch: 40,
            backfill_rounds: 3,
            max_per_artist: 2,
            acceptance: AcceptancePolicy::Strict,
            enrich_concurrency: 4,
            auth_attempts: 3,
            auth_backoff_ms: 250,
            fallback_per_query: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Timeout applied to every external call
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pause between per-song catalog lookups
    pub request_delay_ms: u64,
    /// Tracks per add request (the catalog accepts at most 100)
    pub chunk_size: usize,
    /// Create exported playlists as public
    pub public: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 100,
            chunk_size: 100,
            public: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file (None = data directory default)
    pub database: Option<PathBuf>,
    /// Owner id for sessions and playlists created from this machine
    pub owner_id: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: None,
            owner_id: "local".to_string(),
        }
    }
}

impl Config {
    /// Apply environment overrides for credentials.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let slots = [
            ("OPENAI_API_KEY", &mut self.credentials.openai_api_key),
            ("SPOTIFY_CLIENT_ID", &mut self.credentials.spotify_client_id),
            ("SPOTIFY_CLIENT_SECRET", &mut self.credentials.spotify_client_secret),
        ];
        for (var, slot) in slots {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
        self
    }

    /// Database file to open.
    pub fn database_path(&self) -> PathBuf {
        self.storage.database.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("vibe-swipe"))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::db::DEFAULT_DB_NAME)
        })
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vibe-swipe"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk, then apply environment overrides.
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let config = match config_path() {
        Some(path) => load_from(&path),
        None => {
            tracing::warn!("Could not determine config directory, using defaults");
            Config::default()
        }
    };
    config.with_env_overrides(|var| std::env::var(var).ok())
}

/// Load configuration from a specific file, without environment overrides.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
