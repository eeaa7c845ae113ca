//! Failure taxonomy for report and badge renders.

use thiserror::Error;
use youtrack_api::YouTrackError;

pub type Result<T> = std::result::Result<T, MacroError>;

#[derive(Debug, Error)]
pub enum MacroError {
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// Network, protocol or decoding failure talking to the tracker. Aborts
    /// the render it occurred in.
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl MacroError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        MacroError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MacroError::RemoteUnavailable(_))
    }
}

impl From<YouTrackError> for MacroError {
    fn from(err: YouTrackError) -> Self {
        match err {
            YouTrackError::NotFound(id) => MacroError::not_found("entity", id),
            other => MacroError::RemoteUnavailable(other.to_string()),
        }
    }
}

const SENSITIVE_HINTS: [&str; 6] = [
    "token",
    "authorization",
    "bearer",
    "password",
    "perm:",
    "set-cookie",
];

fn truncate_text(value: &str, limit: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    let mut truncated: String = trimmed.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Log-safe rendition of an error message: whitespace collapsed, length
/// capped, and everything after the category dropped when it hints at
/// credentials.
pub fn redact_log_details(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered = collapsed.to_lowercase();
    if SENSITIVE_HINTS.iter().any(|hint| lowered.contains(hint)) {
        let category = collapsed
            .split(':')
            .next()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .unwrap_or("error");
        return format!("{}: <redacted>", truncate_text(category, 64));
    }
    truncate_text(&collapsed, 180)
}
