//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\history-viewer\config.toml
//! - macOS: ~/Library/Application Support/history-viewer/config.toml
//! - Linux: ~/.config/history-viewer/config.toml
//!
//! The file is human-readable and every key is optional. Command-line flags
//! override what is loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::remote::DEFAULT_BASE_URL;
use crate::view::CoordinatorSettings;
use crate::view::WindowConfig;
use crate::view::coordinator::DEFAULT_REMOTE_SORT_THRESHOLD;
use crate::view::window::{DEFAULT_INITIAL_ROWS, DEFAULT_ROW_INCREMENT};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection
    pub server: ServerConfig,

    /// Table behaviour
    pub view: ViewConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the history API, including the `/api` prefix
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Rows shown after every reset
    pub initial_rows: usize,

    /// Rows added by each "more"
    pub row_increment: usize,

    /// Above this many matching rows, sorting is done by the backend
    pub remote_sort_threshold: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_rows: DEFAULT_INITIAL_ROWS,
            row_increment: DEFAULT_ROW_INCREMENT,
            remote_sort_threshold: DEFAULT_REMOTE_SORT_THRESHOLD,
        }
    }
}

impl From<&ViewConfig> for CoordinatorSettings {
    fn from(view: &ViewConfig) -> Self {
        Self {
            window: WindowConfig {
                initial: view.initial_rows,
                increment: view.row_increment,
            },
            remote_sort_threshold: view.remote_sort_threshold,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("history-viewer"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, with the same fallbacks as [`load`]
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
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

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[view]"));
        assert!(toml.contains("localhost:5000"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[view]
initial_rows = 25
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.view.initial_rows, 25);
        assert_eq!(config.view.row_increment, 50);
        assert_eq!(config.view.remote_sort_threshold, 300);
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.server.base_url = "http://example.test/api".to_string();
        config.view.row_increment = 10;

        save_to(&config, &path).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(load_from(&path), config);
    }

    #[test]
    fn test_missing_or_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(load_from(&path), Config::default());

        std::fs::write(&path, "view = [[[").unwrap();
        assert_eq!(load_from(&path), Config::default());
    }

    #[test]
    fn test_view_config_to_settings() {
        let view = ViewConfig {
            initial_rows: 5,
            row_increment: 2,
            remote_sort_threshold: 9,
        };
        let settings = CoordinatorSettings::from(&view);
        assert_eq!(settings.window.initial, 5);
        assert_eq!(settings.window.increment, 2);
        assert_eq!(settings.remote_sort_threshold, 9);
    }

    #[test]
    fn test_timeout_never_zero() {
        let server = ServerConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(server.timeout(), Duration::from_secs(1));
    }
}
