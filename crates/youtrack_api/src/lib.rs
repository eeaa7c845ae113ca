//! Typed YouTrack REST client used by the report and badge engine.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::YouTrackClient;
pub use config::YouTrackConfig;
pub use error::{Result, YouTrackError};
pub use models::{Attachment, Comment, CustomField, Issue, Project, ProjectRef, User, Visibility};
