//! Conversion helpers from YouTrack wire payloads into the engine model.

use std::collections::HashMap;

use serde_json::Value;
use youtrack_api::{
    Attachment as NativeAttachment, Comment as NativeComment, CustomField as NativeCustomField,
    Issue as NativeIssue, Project as NativeProject, User as NativeUser,
};

use crate::error::{MacroError, Result};
use crate::model::{AttachmentValue, Comment, Issue, IssueField, IssueId, Project, UserRef};
use crate::remote::{IssueComments, ProjectIssues};

pub const SUMMARY_CODE: &str = "summary";
pub const REPORTER_CODE: &str = "reporter";
pub const VOTES_CODE: &str = "votes";
pub const ATTACHMENTS_CODE: &str = "attachments";

const PRIORITY_FIELD: &str = "Priority";
const STATE_FIELD: &str = "State";
const TYPE_FIELD: &str = "Type";
const ASSIGNEE_FIELD: &str = "Assignee";

/// Builds an engine issue. Custom fields are keyed by their field name,
/// built-in attributes by the lower-case `*_CODE` constants.
pub fn convert_issue_native(issue: NativeIssue, comments: Option<IssueComments>) -> Result<Issue> {
    let id = issue.id_readable.parse::<IssueId>().map_err(|err| {
        MacroError::RemoteUnavailable(format!("tracker returned {}", err))
    })?;

    let mut fields: HashMap<String, IssueField> = issue
        .custom_fields
        .iter()
        .filter_map(|field| convert_custom_field(field).map(|value| (field.name.clone(), value)))
        .collect();

    let summary = issue.summary.clone().unwrap_or_default();
    let reporter = issue.reporter.as_ref().and_then(convert_user);
    let votes = issue.votes.unwrap_or(0);

    fields.insert(SUMMARY_CODE.to_string(), IssueField::Text(summary.clone()));
    fields.insert(VOTES_CODE.to_string(), IssueField::Text(votes.to_string()));
    if let Some(user) = reporter.clone() {
        fields.insert(REPORTER_CODE.to_string(), IssueField::User(vec![user]));
    }
    if !issue.attachments.is_empty() {
        fields.insert(
            ATTACHMENTS_CODE.to_string(),
            IssueField::Attachment(convert_attachments_native(&issue.attachments)),
        );
    }

    let projected = |name: &str| {
        fields
            .get(name)
            .and_then(IssueField::string_value)
            .unwrap_or_default()
    };
    let priority = projected(PRIORITY_FIELD);
    let state = projected(STATE_FIELD);
    let issue_type = projected(TYPE_FIELD);
    let assignee = match fields.get(ASSIGNEE_FIELD) {
        Some(IssueField::User(users)) => users.first().cloned(),
        _ => None,
    };

    Ok(Issue {
        id,
        summary,
        reporter: reporter
            .map(|user| user.display_name().to_string())
            .unwrap_or_default(),
        assignee,
        priority,
        state,
        resolved: issue.resolved.is_some(),
        votes,
        issue_type,
        fields,
        comments,
    })
}

pub fn convert_comment_native(comment: NativeComment, issue_id: &IssueId) -> Comment {
    Comment {
        id: comment.id,
        issue_id: Some(issue_id.to_string()),
        author: comment.author.as_ref().and_then(convert_user),
        created: comment.created,
        text: comment.text,
        deleted: comment.deleted,
        visible: !comment
            .visibility
            .as_ref()
            .map(|visibility| visibility.is_limited())
            .unwrap_or(false),
        replies: Vec::new(),
    }
}

pub fn convert_project_native(project: NativeProject, issues: Option<ProjectIssues>) -> Project {
    Project {
        id: project.short_name,
        name: project.name,
        issues,
    }
}

fn convert_attachments_native(attachments: &[NativeAttachment]) -> Vec<AttachmentValue> {
    attachments
        .iter()
        .map(|attachment| AttachmentValue {
            id: attachment.id.clone(),
            url: attachment.url.clone().unwrap_or_default(),
            name: attachment.name.clone(),
        })
        .collect()
}

fn convert_user(user: &NativeUser) -> Option<UserRef> {
    let login = user.login.clone().filter(|login| !login.trim().is_empty());
    match (login, user.display_name()) {
        (Some(login), _) => Some(UserRef {
            login,
            full_name: user.full_name.clone(),
        }),
        (None, Some(name)) => Some(UserRef::new(name)),
        (None, None) => None,
    }
}

fn convert_custom_field(field: &NativeCustomField) -> Option<IssueField> {
    let kind = field.field_type.as_deref().unwrap_or_default();
    match &field.value {
        Value::Null => None,
        value if kind.contains("User") => Some(IssueField::User(collect_users(value))),
        Value::Number(number) if kind.contains("Date") => number.as_i64().map(IssueField::Date),
        Value::Array(items) => Some(IssueField::Enum(
            items.iter().filter_map(coerce_display_value).collect(),
        )),
        Value::Object(map) if map.contains_key("name") => Some(IssueField::Enum(
            coerce_display_value(&field.value).into_iter().collect(),
        )),
        value => coerce_display_value(value).map(IssueField::Text),
    }
}

fn collect_users(value: &Value) -> Vec<UserRef> {
    let parse = |item: &Value| {
        serde_json::from_value::<NativeUser>(item.clone())
            .ok()
            .and_then(|user| convert_user(&user))
    };
    match value {
        Value::Array(items) => items.iter().filter_map(parse).collect(),
        other => parse(other).into_iter().collect(),
    }
}

fn coerce_display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Object(map) => {
            for key in ["name", "presentation", "text", "fullName", "login"] {
                if let Some(candidate) = map.get(key) {
                    if let Some(text) = coerce_display_value(candidate) {
                        return Some(text);
                    }
                }
            }
            None
        }
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(coerce_display_value).collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined.join(", "))
            }
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native_issue(payload: &str) -> NativeIssue {
        serde_json::from_str(payload).expect("valid issue payload")
    }

    #[test]
    fn converts_scalars_and_custom_fields() {
        let issue = native_issue(
            r#"{
                "idReadable": "DEMO-12",
                "summary": "Login fails",
                "resolved": 1700000000000,
                "votes": 4,
                "reporter": {"login": "jane", "fullName": "Jane Doe"},
                "customFields": [
                    {"name": "Priority", "$type": "SingleEnumIssueCustomField", "value": {"name": "Critical"}},
                    {"name": "State", "$type": "StateIssueCustomField", "value": {"name": "Fixed"}},
                    {"name": "Type", "$type": "SingleEnumIssueCustomField", "value": {"name": "Bug"}},
                    {"name": "Assignee", "$type": "SingleUserIssueCustomField", "value": {"login": "bob", "fullName": "Bob Smith"}},
                    {"name": "Fix versions", "$type": "MultiVersionIssueCustomField", "value": [{"name": "1.0"}, {"name": "1.1"}]},
                    {"name": "Estimation", "$type": "PeriodIssueCustomField", "value": {"presentation": "2d"}},
                    {"name": "Due Date", "$type": "DateIssueCustomField", "value": 1700000000000},
                    {"name": "Notes", "$type": "TextIssueCustomField", "value": {"text": "check logs"}},
                    {"name": "Subsystem", "$type": "SingleOwnedIssueCustomField", "value": null}
                ],
                "attachments": [{"id": "7-1", "name": "trace.log", "url": "/api/files/7-1"}]
            }"#,
        );

        let converted = convert_issue_native(issue, None).expect("converts");
        assert_eq!(converted.id, IssueId::new("DEMO", 12));
        assert_eq!(converted.summary, "Login fails");
        assert_eq!(converted.reporter, "Jane Doe");
        assert_eq!(converted.priority, "Critical");
        assert_eq!(converted.state, "Fixed");
        assert_eq!(converted.issue_type, "Bug");
        assert!(converted.resolved);
        assert_eq!(converted.votes, 4);
        assert_eq!(
            converted.assignee.as_ref().map(UserRef::display_name),
            Some("Bob Smith")
        );

        let value = |code: &str| converted.field(code).and_then(IssueField::string_value);
        assert_eq!(value("Fix versions").as_deref(), Some("1.0, 1.1"));
        assert_eq!(value("Estimation").as_deref(), Some("2d"));
        assert_eq!(value("Due Date").as_deref(), Some("2023-11-14"));
        assert_eq!(value("Notes").as_deref(), Some("check logs"));
        assert_eq!(value(SUMMARY_CODE).as_deref(), Some("Login fails"));
        assert_eq!(value(VOTES_CODE).as_deref(), Some("4"));
        assert_eq!(value(ATTACHMENTS_CODE).as_deref(), Some("trace.log"));
        assert!(converted.field("Subsystem").is_none());
    }

    #[test]
    fn unresolved_issue_without_optional_fields() {
        let converted =
            convert_issue_native(native_issue(r#"{"idReadable": "OPS-1"}"#), None).expect("converts");
        assert!(!converted.resolved);
        assert!(converted.assignee.is_none());
        assert_eq!(converted.reporter, "");
        assert!(converted.field(REPORTER_CODE).is_none());
    }

    #[test]
    fn malformed_readable_id_is_rejected() {
        let err = convert_issue_native(native_issue(r#"{"idReadable": "broken"}"#), None)
            .expect_err("bad id");
        assert!(err.is_remote());
    }

    #[test]
    fn converts_comment_visibility_and_author() {
        let native: NativeComment = serde_json::from_str(
            r#"{"id": "4-9", "text": "done", "created": 5, "author": {"login": "jane"},
                "visibility": {"$type": "LimitedVisibility"}}"#,
        )
        .expect("valid comment");

        let comment = convert_comment_native(native, &IssueId::new("DEMO", 1));
        assert_eq!(comment.issue_id.as_deref(), Some("DEMO-1"));
        assert_eq!(comment.author.map(|a| a.login), Some("jane".to_string()));
        assert!(!comment.visible);
        assert!(!comment.deleted);
        assert!(comment.replies.is_empty());
    }
}
