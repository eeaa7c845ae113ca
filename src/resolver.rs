//! Per-cell rendering of report columns.

use std::time::Duration;

use chrono::{DateTime, Local};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::descriptor::{ColumnKind, FieldDescriptor};
use crate::error::Result;
use crate::model::{Comment, IssueField};
use crate::remote::{within, IssueComments};
use crate::snapshot::IssueSnapshot;
use crate::template::{
    escape_html, extend_context, RenderContext, Template, TemplateRenderer, COMMENT_AUTHOR, COMMENT_BODY,
    COMMENT_DATE, COMMENT_ID, ISSUE_ID,
};

/// Comments rendered per issue; the last one is followed by a "more" marker.
pub const COMMENT_CAP: usize = 11;
pub const UNKNOWN: &str = "unknown";
pub const NO_COMMENTS: &str = "No one commented yet.";
const COMMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

static LINE_BREAK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n]").expect("invalid line break regex"));
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));

/// Best-effort removal of line breaks and HTML-like tags from comment text.
pub fn sanitize_comment_text(text: &str) -> String {
    let flattened = LINE_BREAK_REGEX.replace_all(text, "");
    TAG_REGEX.replace_all(&flattened, "").into_owned()
}

/// Formats a creation timestamp in local time; a missing timestamp renders
/// as the current time.
pub fn format_comment_date(created: Option<i64>) -> String {
    let moment = created
        .and_then(DateTime::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(Local::now);
    moment.format(COMMENT_DATE_FORMAT).to_string()
}

/// Cell content for a plain field column: the field's HTML-escaped
/// projection, or [`UNKNOWN`] when the field is absent or projects to nothing.
pub fn resolve_field(snapshot: &IssueSnapshot, code: &str) -> String {
    snapshot
        .field(code)
        .and_then(IssueField::string_value)
        .map(|value| escape_html(&value))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Comment window of one report row. Fetched at most once, however many
/// comment columns the row has.
pub struct RowComments {
    source: Option<IssueComments>,
    window: OnceCell<Vec<Comment>>,
}

impl RowComments {
    pub fn new(source: Option<IssueComments>) -> Self {
        Self {
            source,
            window: OnceCell::new(),
        }
    }

    async fn window(&self, limit: Duration) -> Result<Option<&[Comment]>> {
        let Some(source) = &self.source else {
            return Ok(None);
        };
        let comments = self
            .window
            .get_or_try_init(|| within(limit, "comment query", source.query("", 0, COMMENT_CAP)))
            .await?;
        debug!(
            "report:comments issue={} fetched={}",
            source.parent(),
            comments.len()
        );
        Ok(Some(comments.as_slice()))
    }
}

pub struct FieldResolver<'a> {
    renderer: &'a dyn TemplateRenderer,
    base: &'a RenderContext,
    timeout: Duration,
}

impl<'a> FieldResolver<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, base: &'a RenderContext, timeout: Duration) -> Self {
        Self {
            renderer,
            base,
            timeout,
        }
    }

    pub async fn resolve(
        &self,
        snapshot: &IssueSnapshot,
        comments: &RowComments,
        descriptor: &FieldDescriptor,
    ) -> Result<String> {
        match descriptor.kind() {
            ColumnKind::Comments => self.render_comments(comments, false).await,
            ColumnKind::CommentsVerbose => self.render_comments(comments, true).await,
            ColumnKind::Field => Ok(resolve_field(snapshot, descriptor.code())),
        }
    }

    async fn render_comments(&self, comments: &RowComments, verbose: bool) -> Result<String> {
        let Some(window) = comments.window(self.timeout).await? else {
            return Ok(NO_COMMENTS.to_string());
        };

        let mut cell = String::new();
        for (index, comment) in window.iter().take(COMMENT_CAP).enumerate() {
            let context = self.comment_context(comment);
            if verbose {
                cell.push_str(&self.renderer.render(Template::CommentHead, &context)?);
            }
            cell.push_str(&self.renderer.render(Template::CommentBody, &context)?);
            if index + 1 == COMMENT_CAP {
                cell.push_str(&self.renderer.render(Template::CommentMore, &context)?);
                break;
            }
        }
        Ok(cell)
    }

    fn comment_context(&self, comment: &Comment) -> RenderContext {
        let author = comment
            .author
            .as_ref()
            .map(|author| author.login.as_str())
            .filter(|login| !login.is_empty())
            .unwrap_or(UNKNOWN);
        let body = comment
            .text
            .as_deref()
            .map(sanitize_comment_text)
            .unwrap_or_default();
        extend_context(
            self.base,
            [
                (
                    ISSUE_ID,
                    Value::String(escape_html(comment.issue_id.as_deref().unwrap_or(UNKNOWN))),
                ),
                (COMMENT_AUTHOR, Value::String(escape_html(author))),
                (COMMENT_BODY, Value::String(escape_html(&body))),
                (COMMENT_DATE, Value::String(format_comment_date(comment.created))),
                (COMMENT_ID, Value::String(escape_html(&comment.id))),
            ],
        )
    }
}
