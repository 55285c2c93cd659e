//! Console configuration.
//!
//! Stored as YAML at `~/.config/stage/config.yaml` (or the platform config
//! dir). Every field has a default, so a missing file is not an error.

use crate::error::ConfigError;
use crate::navigation::DESTINATION_LIST_PATH;
use crate::session::LatencyPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding [`ConsoleConfig::api_url`].
pub const API_URL_ENV: &str = "STAGE_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Busy floor applied to saves in the interactive console.
pub const DEFAULT_MIN_LATENCY_MS: u64 = 2000;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the platform API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where a finished edit navigates to
    #[serde(default = "default_list_path")]
    pub list_path: String,

    /// Minimum busy time for a save, in milliseconds (0 disables)
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_list_path() -> String {
    DESTINATION_LIST_PATH.to_string()
}

fn default_min_latency_ms() -> u64 {
    DEFAULT_MIN_LATENCY_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            list_path: default_list_path(),
            min_latency_ms: DEFAULT_MIN_LATENCY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ConsoleConfig {
    pub fn latency_policy(&self) -> LatencyPolicy {
        LatencyPolicy::at_least(Duration::from_millis(self.min_latency_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Apply `STAGE_API_URL` if set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".to_string()));
        }
        if !self.list_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "list_path must start with '/': {}",
                self.list_path
            )));
        }
        Ok(())
    }
}

/// Config file location and loading.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new_default() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("stage").join("config.yaml"),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file (defaults if absent), without env overrides.
    pub fn load_file(&self) -> Result<ConsoleConfig, ConfigError> {
        let config = match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => ConsoleConfig::default(),
            Ok(s) => serde_yaml::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file, using defaults");
                ConsoleConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read the file and apply environment overrides.
    pub fn load(&self) -> Result<ConsoleConfig, ConfigError> {
        let mut config = self.load_file()?;
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self, config: &ConsoleConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_yaml::to_string(config)?)?;
        Ok(())
    }
}
