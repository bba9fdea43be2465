//! Configuration management for the folio CLI.
//!
//! Settings come from, in order of precedence:
//! 1. Config file (`~/.folio/config.toml`, or `--config`)
//! 2. Environment variables, for values the file leaves unset
//! 3. Default values

mod schema;

pub use schema::{
    AgentsConfig, AppConfig, ConfigIssue, ExtractionConfig, FolioConfig, GeminiSettings,
    IssueLevel,
};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Missing required field.
    #[error("missing required config: {0}")]
    MissingField(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".folio")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a specific path.
///
/// A missing file yields the default configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config_from(path: &Path) -> ConfigResult<FolioConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(FolioConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: FolioConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Save configuration to a specific path, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub async fn save_config_to(config: &FolioConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Write a default config to `path` unless one exists and `force` is unset.
///
/// Returns `true` if a file was written.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn init_config_at(path: &Path, force: bool) -> ConfigResult<bool> {
    if path.exists() && !force {
        debug!(path = %path.display(), "config file exists, leaving it");
        return Ok(false);
    }
    save_config_to(&FolioConfig::default(), path).await?;
    Ok(true)
}
