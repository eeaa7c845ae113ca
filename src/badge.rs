//! Inline single-issue badge.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info};
use serde_json::Value;

use crate::config::EngineSettings;
use crate::error::{redact_log_details, Result};
use crate::lookup::{IssueLookup, LookupOutcome};
use crate::remote::Tracker;
use crate::snapshot::IssueSnapshot;
use crate::template::{escape_html, HtmlTemplates, RenderContext, Template, TemplateRenderer, ERROR};

pub const ID_PARAM: &str = "id";
pub const STYLE_PARAM: &str = "style";
pub const MISSING_ID: &str = "Missing id parameter";
const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeStyle {
    #[default]
    Short,
    Detailed,
}

impl BadgeStyle {
    /// `detailed` (any case) selects the detailed badge, anything else the short one.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(style) if style.eq_ignore_ascii_case("detailed") => BadgeStyle::Detailed,
            _ => BadgeStyle::Short,
        }
    }

    pub fn template(self) -> Template {
        match self {
            BadgeStyle::Short => Template::BadgeShort,
            BadgeStyle::Detailed => Template::BadgeDetailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeParams {
    pub id: Option<String>,
    pub style: BadgeStyle,
}

impl BadgeParams {
    pub fn from_macro(params: &HashMap<String, String>) -> Self {
        Self {
            id: params
                .get(ID_PARAM)
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            style: BadgeStyle::from_param(params.get(STYLE_PARAM).map(String::as_str)),
        }
    }
}

/// Tooltip text summarising the issue.
pub fn badge_tooltip(snapshot: &IssueSnapshot) -> String {
    let assignee = snapshot
        .assignee()
        .map(|user| user.display_name().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNASSIGNED.to_string());
    format!(
        "Reporter: {}, Priority: {}, State: {}, Assignee: {}, Votes: {}, Type: {}",
        snapshot.reporter(),
        snapshot.priority(),
        snapshot.state(),
        assignee,
        snapshot.votes(),
        snapshot.issue_type()
    )
}

/// Badge context for a resolved issue.
pub fn badge_context(snapshot: &IssueSnapshot, link_base: &str) -> RenderContext {
    let style = if snapshot.is_resolved() {
        "line-through"
    } else {
        "normal"
    };
    let mut context = RenderContext::new();
    context.insert("issue".to_string(), Value::String(snapshot.id().to_string()));
    context.insert("summary".to_string(), Value::String(escape_html(snapshot.summary())));
    context.insert("base".to_string(), Value::String(link_base.to_string()));
    context.insert("style".to_string(), Value::String(style.to_string()));
    context.insert("title".to_string(), Value::String(escape_html(&badge_tooltip(snapshot))));
    context
}

fn error_context(message: &str) -> RenderContext {
    let mut context = RenderContext::new();
    context.insert(ERROR.to_string(), Value::String(escape_html(message)));
    context
}

pub struct BadgeRenderer {
    lookup: IssueLookup,
    settings: EngineSettings,
    renderer: Arc<dyn TemplateRenderer>,
}

impl BadgeRenderer {
    pub fn new(tracker: Tracker, settings: EngineSettings) -> Self {
        Self::with_renderer(tracker, settings, Arc::new(HtmlTemplates))
    }

    pub fn with_renderer(
        tracker: Tracker,
        settings: EngineSettings,
        renderer: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            lookup: IssueLookup::new(tracker, settings.request_timeout),
            settings,
            renderer,
        }
    }

    /// Builds the badge context. Missing ids and lookup misses become an
    /// `error` entry; only remote failures are returned as errors.
    pub async fn context(&self, params: &BadgeParams) -> Result<RenderContext> {
        let Some(id) = params.id.as_deref() else {
            return Ok(error_context(MISSING_ID));
        };
        info!("badge:render id={} style={:?}", id, params.style);
        match self.lookup.lookup(id).await? {
            LookupOutcome::Found { issue, .. } => Ok(badge_context(
                &IssueSnapshot::capture(&issue),
                &self.settings.link_base(),
            )),
            miss => {
                let message = miss.failure_message().unwrap_or_default();
                debug!("badge:render {}", message);
                Ok(error_context(&message))
            }
        }
    }

    pub async fn render(&self, params: &BadgeParams) -> Result<String> {
        let context = self.context(params).await.map_err(|err| {
            error!("YouTrack badge macro failed: {}", redact_log_details(&err.to_string()));
            err
        })?;
        self.renderer.render(params.style.template(), &context)
    }
}
