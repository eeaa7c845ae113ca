//! Error model used by YouTrack API client operations.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, YouTrackError>;

/// Failure talking to YouTrack: HTTP errors with status and message, missing
/// entities, rejected credentials, timeouts, transport and decoding problems.
#[derive(Debug, Error)]
pub enum YouTrackError {
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl YouTrackError {
    /// Constructs an HTTP error variant with optional API-specific code.
    pub fn http(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        YouTrackError::Http {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, YouTrackError::NotFound(_))
    }
}

impl From<reqwest::Error> for YouTrackError {
    /// Converts reqwest errors into semantic YouTrackError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            YouTrackError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            YouTrackError::Http {
                status,
                code: None,
                message: err.to_string(),
            }
        } else if err.is_connect() {
            YouTrackError::Network(err.to_string())
        } else if err.is_decode() {
            YouTrackError::Serialization(err.to_string())
        } else {
            YouTrackError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for YouTrackError {
    fn from(err: serde_json::Error) -> Self {
        YouTrackError::Serialization(err.to_string())
    }
}
