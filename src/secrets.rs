use keyring::{Entry, Error as KeyringError};

use crate::error::{MacroError, Result};

const KEYRING_SERVICE: &str = "com.youtrack-macros.yt-macro";

/// Permanent YouTrack tokens kept in the OS keyring, one per tracker host.
#[derive(Debug, Clone)]
pub struct TokenStore {
    service: String,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

impl TokenStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn load(&self, host: &str) -> Result<Option<String>> {
        match self.entry(host)?.get_password() {
            Ok(token) => Ok(Some(token).filter(|t| !t.trim().is_empty())),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(err) => Err(MacroError::Config(format!(
                "Failed to read token from keyring: {err}"
            ))),
        }
    }

    pub fn store(&self, host: &str, token: &str) -> Result<()> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(MacroError::Config("Token must not be empty".into()));
        }
        self.entry(host)?
            .set_password(trimmed)
            .map_err(|err| MacroError::Config(format!("Failed to store token in keyring: {err}")))
    }

    pub fn clear(&self, host: &str) -> Result<()> {
        match self.entry(host)?.delete_credential() {
            Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
            Err(err) => Err(MacroError::Config(format!(
                "Failed to delete token from keyring: {err}"
            ))),
        }
    }

    fn entry(&self, host: &str) -> Result<Entry> {
        Entry::new(&self.service, &account_for(host))
            .map_err(|err| MacroError::Config(format!("Failed to open keyring entry: {err}")))
    }
}

/// Keyring account name for a host; scheme and trailing slashes are ignored.
fn account_for(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

/// Picks the token to use: an explicit one wins over the keyring.
pub fn resolve_token(explicit: Option<String>, store: &TokenStore, host: &str) -> Result<Option<String>> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(Some(token.trim().to_string()));
    }
    store.load(host)
}
