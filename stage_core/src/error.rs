// src/error.rs
use crate::session::SessionState;

/// Failures reported by a [`crate::api::DestinationApi`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Destination not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl ApiError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ApiError::Http(_) => "upstream_error",
            ApiError::SerdeJson(_) => "parse_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Status { status, .. } if *status == 409 => "conflict",
            ApiError::Status { .. } => "upstream_error",
            ApiError::InvalidUrl(_) => "invalid_input",
            ApiError::Timeout(_) => "timeout",
            ApiError::Other(_) => "internal_error",
        }
    }
}

/// Operations rejected by an edit session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("operation `{operation}` is not allowed while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("edit session has been closed")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
