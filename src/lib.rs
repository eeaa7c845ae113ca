//! Issue reports and inline badges rendered from a YouTrack instance.
//!
//! [`ReportEngine`] turns a query plus a field list into a paginated table;
//! [`BadgeRenderer`] turns one readable id into a linked badge. Both read the
//! tracker through [`remote::RemoteCollection`] views and hand their render
//! context to a [`template::TemplateRenderer`].

pub mod badge;
mod bridge;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod lookup;
pub mod model;
pub mod paginator;
pub mod remote;
pub mod report;
pub mod resolver;
pub mod secrets;
pub mod snapshot;
pub mod template;

pub use badge::{BadgeParams, BadgeRenderer, BadgeStyle};
pub use config::{Config, ConfigManager, EngineSettings};
pub use error::{MacroError, Result};
pub use lookup::{IssueLookup, LookupOutcome};
pub use remote::Tracker;
pub use report::{Report, ReportEngine, ReportOutcome, ReportParams};
pub use template::{HtmlTemplates, RenderContext, Template, TemplateRenderer};

/// Installs the process-wide logger; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
