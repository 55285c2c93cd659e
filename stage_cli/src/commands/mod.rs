pub mod config;
pub mod edit;
pub mod show;

use crate::cli::Cli;
use stage_core::{ConfigStore, ConsoleConfig, HttpDestinationApi};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to load destination: {0}")]
    LoadFailed(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("API error: {0}")]
    Api(#[from] stage_core::ApiError),

    #[error("Session error: {0}")]
    Session(#[from] stage_core::SessionError),

    #[error("Configuration error: {0}")]
    Config(#[from] stage_core::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Effective configuration: file, then env, then `--api-url`.
pub fn load_config(cli: &Cli) -> Result<ConsoleConfig> {
    let mut config = ConfigStore::new_default().load()?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    Ok(config)
}

pub fn api_client(config: &ConsoleConfig) -> Result<HttpDestinationApi> {
    Ok(HttpDestinationApi::new(
        &config.api_url,
        config.request_timeout(),
    )?)
}
