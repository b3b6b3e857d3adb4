//! Application configuration
//!
//! Settings live in `config.json` under the per-user data directory. Missing
//! files and missing fields fall back to defaults, and a few environment
//! variables override the file for container-style deployments.

use crate::search::{Algorithm, SearchOptions, DEFAULT_CONTEXT_WINDOW};
use crate::sequence::{DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_PATTERN_LEN};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "dnaseek";
const CONFIG_FILE: &str = "config.json";

/// Default listen port
pub const DEFAULT_PORT: u16 = 50051;

/// Largest protocol frame accepted in either direction (200 MiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 200 * 1024 * 1024;

/// Overrides the port of `listen_addr`
pub const ENV_PORT: &str = "DNASEEK_PORT";
/// Overrides `listen_addr` entirely
pub const ENV_ADDR: &str = "DNASEEK_ADDR";
/// Overrides `context_window`
pub const ENV_CONTEXT_WINDOW: &str = "DNASEEK_CONTEXT_WINDOW";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Symbols of context kept on each side of a match
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Matching strategy used by the server and local searches
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Address the server binds and the client connects to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Largest protocol frame in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Per-connection read/write timeout in seconds
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,

    /// Longest pattern accepted by the CLI after normalization
    #[serde(default = "default_max_pattern_len")]
    pub max_pattern_len: usize,

    /// Largest sequence file accepted by the CLI
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_context_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

fn default_listen_addr() -> String {
    format!("127.0.0.1:{}", DEFAULT_PORT)
}

fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

fn default_io_timeout_secs() -> u64 {
    30
}

fn default_max_pattern_len() -> usize {
    DEFAULT_MAX_PATTERN_LEN
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            context_window: default_context_window(),
            algorithm: Algorithm::default(),
            listen_addr: default_listen_addr(),
            max_message_bytes: default_max_message_bytes(),
            io_timeout_secs: default_io_timeout_secs(),
            max_pattern_len: default_max_pattern_len(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory (or defaults), then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            serde_json::from_str(&content)
                .context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_ADDR) {
            self.listen_addr = addr;
        } else if let Some(port) = lookup(ENV_PORT) {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", ENV_PORT, port))?;
            let host = self
                .listen_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "127.0.0.1".to_string());
            self.listen_addr = format!("{}:{}", host, port);
        }

        if let Some(window) = lookup(ENV_CONTEXT_WINDOW) {
            self.context_window = window
                .trim()
                .parse()
                .with_context(|| format!("{} must be a non-negative integer, got '{}'", ENV_CONTEXT_WINDOW, window))?;
        }

        Ok(())
    }

    /// Search options derived from this config
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            context_window: self.context_window,
            algorithm: self.algorithm,
        }
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}
