//! Template collaborator: turns a render context into markup.
//!
//! The engine only assembles contexts and asks a [`TemplateRenderer`] for
//! markup. [`HtmlTemplates`] is the built-in renderer; hosts with their own
//! templating layer plug in their own implementation.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map as JsonMap, Value};

use crate::error::Result;

pub type RenderContext = JsonMap<String, Value>;

pub const LINKBASE: &str = "linkbase";
pub const ISSUE_ID: &str = "issueId";
pub const COMMENT_ID: &str = "commentId";
pub const COMMENT_AUTHOR: &str = "commentAuthor";
pub const COMMENT_BODY: &str = "commentBody";
pub const COMMENT_DATE: &str = "commentDate";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    IssueLink,
    CommentHead,
    CommentBody,
    CommentMore,
    PaginationLink,
    ReportBody,
    BadgeShort,
    BadgeDetailed,
}

pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: Template, context: &RenderContext) -> Result<String>;
}

/// Copy of `base` extended with `entries`; later entries win.
pub fn extend_context<K, V, const N: usize>(base: &RenderContext, entries: [(K, V); N]) -> RenderContext
where
    K: Into<String>,
    V: Into<Value>,
{
    let mut context = base.clone();
    for (key, value) in entries {
        context.insert(key.into(), value.into());
    }
    context
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{(\w+)\}|\$(\w+)").expect("invalid placeholder regex"));

const ISSUE_LINK: &str = r#"<a class="yt yt-issue-link" href="$linkbase/issue/$issueId">$issueId</a>"#;
const COMMENT_HEAD: &str = r#"<div class="yt yt-comment-head"><b>$commentAuthor</b> <span class="yt yt-comment-date">$commentDate</span></div>"#;
const COMMENT_BODY_HTML: &str =
    r#"<div class="yt yt-comment-body" id="comment-$commentId">$commentBody</div>"#;
const COMMENT_MORE: &str = r##"<div class="yt yt-comment-more"><a href="$linkbase/issue/$issueId#comments">Show more comments</a></div>"##;
const PAGINATION_LINK: &str =
    r#"<a class="yt yt-page" style="$style" href="$url?$param=$num">$num</a> "#;
const REPORT_BODY: &str = r#"<div class="yt yt-report"><h4>$title</h4><table class="yt yt-report-table"><tr>$header</tr>$rows</table><div class="yt yt-pagination">$pagination</div></div>"#;
const REPORT_EMPTY: &str =
    r#"<div class="yt yt-report"><h4>$title</h4><p class="yt yt-empty">No issues found.</p></div>"#;
const BADGE_SHORT: &str = r#"<a class="yt yt-badge" href="$base/issue/$issue" title="$title" style="text-decoration:$style">$issue</a>"#;
const BADGE_DETAILED: &str = r#"<span class="yt yt-badge-detailed"><a class="yt yt-badge" href="$base/issue/$issue" title="$title" style="text-decoration:$style">$issue</a> <span class="yt yt-summary">$summary</span></span>"#;
const BADGE_ERROR: &str = r#"<span class="yt yt-error">$error</span>"#;

/// Built-in HTML templates with `$name` / `${name}` placeholders. Unknown
/// placeholders are left verbatim, `null` renders as nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTemplates;

impl HtmlTemplates {
    fn source(template: Template, context: &RenderContext) -> &'static str {
        let has_error = context.get(ERROR).map(is_truthy).unwrap_or(false);
        match template {
            Template::IssueLink => ISSUE_LINK,
            Template::CommentHead => COMMENT_HEAD,
            Template::CommentBody => COMMENT_BODY_HTML,
            Template::CommentMore => COMMENT_MORE,
            Template::PaginationLink => PAGINATION_LINK,
            Template::ReportBody => {
                if context.get("hasIssues").map(is_truthy).unwrap_or(false) {
                    REPORT_BODY
                } else {
                    REPORT_EMPTY
                }
            }
            Template::BadgeShort | Template::BadgeDetailed if has_error => BADGE_ERROR,
            Template::BadgeShort => BADGE_SHORT,
            Template::BadgeDetailed => BADGE_DETAILED,
        }
    }
}

impl TemplateRenderer for HtmlTemplates {
    fn render(&self, template: Template, context: &RenderContext) -> Result<String> {
        let source = Self::source(template, context);
        let rendered = PLACEHOLDER_REGEX.replace_all(source, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match context.get(name) {
                Some(value) => value_to_text(value),
                None => caps[0].to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty() && text != "false",
        Value::Null => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> RenderContext {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn substitutes_both_placeholder_forms() {
        let ctx = context(json!({"linkbase": "https://yt", "issueId": "DEMO-1"}));
        let html = HtmlTemplates.render(Template::IssueLink, &ctx).expect("renders");
        assert_eq!(
            html,
            r#"<a class="yt yt-issue-link" href="https://yt/issue/DEMO-1">DEMO-1</a>"#
        );
    }

    #[test]
    fn unknown_placeholders_stay_verbatim_and_values_are_not_reexpanded() {
        let ctx = context(json!({"commentId": "4-1", "commentBody": "costs $linkbase"}));
        let html = HtmlTemplates.render(Template::CommentBody, &ctx).expect("renders");
        assert!(html.contains("costs $linkbase"));
        assert!(html.contains(r#"id="comment-4-1""#));
    }

    #[test]
    fn report_body_switches_on_has_issues() {
        let ctx = context(json!({"title": "q from DEMO", "hasIssues": false}));
        let html = HtmlTemplates.render(Template::ReportBody, &ctx).expect("renders");
        assert!(html.contains("No issues found."));

        let ctx = context(json!({"title": "t", "hasIssues": true, "header": "<th>Issue</th>", "rows": "", "pagination": ""}));
        let html = HtmlTemplates.render(Template::ReportBody, &ctx).expect("renders");
        assert!(html.contains("<tr><th>Issue</th></tr>"));
    }

    #[test]
    fn badge_templates_render_error_when_present() {
        let ctx = context(json!({"error": "Missing id parameter"}));
        for template in [Template::BadgeShort, Template::BadgeDetailed] {
            let html = HtmlTemplates.render(template, &ctx).expect("renders");
            assert_eq!(html, r#"<span class="yt yt-error">Missing id parameter</span>"#);
        }
    }

    #[test]
    fn extend_context_overrides_base_entries() {
        let base = context(json!({"linkbase": "https://yt", "issueId": "old"}));
        let extended = extend_context(&base, [("issueId", "DEMO-2"), ("style", "normal")]);
        assert_eq!(extended["issueId"], "DEMO-2");
        assert_eq!(extended["linkbase"], "https://yt");
        assert_eq!(base["issueId"], "old");
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}
