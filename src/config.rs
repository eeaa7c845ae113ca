//! Persistent engine configuration and the file-backed manager for it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use youtrack_api::config::{DEFAULT_REST_PREFIX, DEFAULT_TIMEOUT_SECS};
use youtrack_api::YouTrackConfig;

use crate::error::{MacroError, Result};
use crate::paginator::{DEFAULT_NUM_PAGES, DEFAULT_PAGE_SIZE};

pub const DEFAULT_HOST: &str = "http://localhost:8080";
pub const DEFAULT_FIELD_LIST: &str = "summary:Summary,State,Priority,Assignee";

fn default_rest_prefix() -> String {
    DEFAULT_REST_PREFIX.to_string()
}

fn default_fields() -> String {
    DEFAULT_FIELD_LIST.to_string()
}

/// Engine settings persisted on disk: tracker location, link base and the
/// report defaults used when a macro leaves a parameter out.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub host: String,
    #[serde(default = "default_rest_prefix")]
    pub rest_prefix: String,
    pub link_base: Option<String>,
    pub page_size: usize,
    pub total_pages: usize,
    #[serde(default = "default_fields")]
    pub fields: String,
    pub request_timeout_secs: u64,
    /// Minimum delay between API calls, 0 disables pacing.
    pub cooldown_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            rest_prefix: default_rest_prefix(),
            link_base: None,
            page_size: DEFAULT_PAGE_SIZE,
            total_pages: DEFAULT_NUM_PAGES,
            fields: default_fields(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cooldown_ms: 0,
        }
    }
}

impl Config {
    pub fn client_config(&self, token: Option<String>) -> YouTrackConfig {
        let timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        let config = YouTrackConfig::new(self.host.clone())
            .with_rest_prefix(self.rest_prefix.clone())
            .with_timeout(timeout)
            .with_cooldown(Duration::from_millis(self.cooldown_ms));
        match token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            remote_host: self.host.clone(),
            rest_prefix: self.rest_prefix.clone(),
            link_base: self.link_base.clone(),
            default_fields: if self.fields.trim().is_empty() {
                default_fields()
            } else {
                self.fields.clone()
            },
            default_page_size: self.page_size.max(1),
            default_total_pages: self.total_pages,
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }
}

/// Explicit settings handed to the report engine and the badge lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    pub remote_host: String,
    /// Stripped from the host or link base when building browser links.
    pub rest_prefix: String,
    pub link_base: Option<String>,
    pub default_fields: String,
    pub default_page_size: usize,
    pub default_total_pages: usize,
    /// Upper bound for every remote call of a render.
    pub request_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Config::default().engine_settings()
    }
}

impl EngineSettings {
    /// Base URL for issue links in the tracker UI: the link base (or host)
    /// without a trailing REST prefix or slash.
    pub fn link_base(&self) -> String {
        let source = self
            .link_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .unwrap_or(self.remote_host.as_str());
        let base = source.trim_end_matches('/');
        let prefix = self.rest_prefix.trim_end_matches('/');
        let stripped = if prefix.is_empty() {
            base
        } else {
            base.strip_suffix(prefix).unwrap_or(base)
        };
        stripped.trim_end_matches('/').to_string()
    }
}

/// Loads and saves [`Config`] as JSON in the platform config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("com", "youtrack-macros", "yt-macro")
            .ok_or_else(|| MacroError::Config("could not determine config directory".to_string()))?;
        Ok(Self {
            path: dirs.config_dir().join("config.json"),
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                log::warn!("Ignoring invalid config {}: {}", self.path.display(), err);
                Config::default()
            }),
            Err(err) => {
                log::warn!("Failed to read config {}: {}", self.path.display(), err);
                Config::default()
            }
        }
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &Config) -> Result<()> {
        let io_error = |err: std::io::Error| MacroError::Config(err.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(config)
            .map_err(|err| MacroError::Config(err.to_string()))?;
        fs::write(&self.path, content).map_err(io_error)?;
        Ok(())
    }
}
