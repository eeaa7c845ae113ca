//! Connection settings for a YouTrack instance.

use std::time::Duration;

pub const DEFAULT_REST_PREFIX: &str = "/api";
pub const DEFAULT_USER_AGENT: &str = "youtrack-macros";
pub const DEFAULT_COOLDOWN_MS: u64 = 0;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct YouTrackConfig {
    pub base_url: String,
    pub rest_prefix: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl YouTrackConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            rest_prefix: DEFAULT_REST_PREFIX.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_rest_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rest_prefix = prefix.into();
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Base URL joined with the REST prefix, always ending in `/`.
    ///
    /// A base URL that already ends with the prefix is not prefixed twice, so
    /// both `https://yt.example.com` and `https://yt.example.com/api` work.
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.rest_prefix.trim_matches('/');
        if prefix.is_empty() || base.ends_with(&format!("/{prefix}")) {
            format!("{base}/")
        } else {
            format!("{base}/{prefix}/")
        }
    }
}
