//! Engine-side domain model: issues, polymorphic field values, comment trees
//! and projects, each bound to the remote collections it was fetched from.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use thiserror::Error;

use crate::remote::{IssueComments, ProjectIssues};

/// Readable issue identifier, `PROJECT-NUMBER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueId {
    pub project_id: String,
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid issue id: {0}")]
pub struct ParseIssueIdError(pub String);

impl IssueId {
    pub fn new(project_id: impl Into<String>, number: u64) -> Self {
        Self {
            project_id: project_id.into(),
            number,
        }
    }
}

impl FromStr for IssueId {
    type Err = ParseIssueIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (project, number) = trimmed
            .rsplit_once('-')
            .ok_or_else(|| ParseIssueIdError(value.to_string()))?;
        if project.is_empty() {
            return Err(ParseIssueIdError(value.to_string()));
        }
        let number = number
            .parse::<u64>()
            .map_err(|_| ParseIssueIdError(value.to_string()))?;
        Ok(IssueId::new(project, number))
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.project_id, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub login: String,
    pub full_name: Option<String>,
}

impl UserRef {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            full_name: None,
        }
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentValue {
    pub id: String,
    pub url: String,
    pub name: Option<String>,
}

/// A single issue field value. Every variant projects to a display string
/// through [`IssueField::string_value`]; the resolver never inspects the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueField {
    Text(String),
    /// Enum, state, version, build or any other bundle-backed value.
    Enum(Vec<String>),
    User(Vec<UserRef>),
    /// Epoch millis.
    Date(i64),
    Attachment(Vec<AttachmentValue>),
}

impl IssueField {
    /// Display projection of the value; `None` when there is nothing to show.
    pub fn string_value(&self) -> Option<String> {
        let rendered = match self {
            IssueField::Text(text) => text.trim().to_string(),
            IssueField::Enum(values) => join_non_empty(values.iter().map(String::as_str)),
            IssueField::User(users) => join_non_empty(users.iter().map(UserRef::display_name)),
            IssueField::Date(millis) => DateTime::from_timestamp_millis(*millis)
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            IssueField::Attachment(files) => join_non_empty(
                files
                    .iter()
                    .map(|file| file.name.as_deref().unwrap_or(file.url.as_str())),
            ),
        };
        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }

    /// Typed attachment values, only for the attachment variant.
    pub fn attachments(&self) -> Option<&[AttachmentValue]> {
        match self {
            IssueField::Attachment(files) => Some(files),
            _ => None,
        }
    }
}

fn join_non_empty<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Live issue as fetched from the tracker. Rendering reads an
/// [`IssueSnapshot`](crate::snapshot::IssueSnapshot) of it instead.
#[derive(Debug, Clone)]
pub struct Issue {
    pub id: IssueId,
    pub summary: String,
    pub reporter: String,
    pub assignee: Option<UserRef>,
    pub priority: String,
    pub state: String,
    pub resolved: bool,
    pub votes: u32,
    pub issue_type: String,
    pub fields: HashMap<String, IssueField>,
    pub comments: Option<IssueComments>,
}

impl Issue {
    pub fn new(id: IssueId) -> Self {
        Self {
            id,
            summary: String::new(),
            reporter: String::new(),
            assignee: None,
            priority: String::new(),
            state: String::new(),
            resolved: false,
            votes: 0,
            issue_type: String::new(),
            fields: HashMap::new(),
            comments: None,
        }
    }

    pub fn with_field(mut self, code: impl Into<String>, field: IssueField) -> Self {
        self.fields.insert(code.into(), field);
        self
    }

    pub fn with_comments(mut self, comments: IssueComments) -> Self {
        self.comments = Some(comments);
        self
    }

    pub fn field(&self, code: &str) -> Option<&IssueField> {
        self.fields.get(code)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub issue_id: Option<String>,
    pub author: Option<UserRef>,
    /// Epoch millis.
    pub created: Option<i64>,
    pub text: Option<String>,
    pub deleted: bool,
    pub visible: bool,
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            issue_id: None,
            author: None,
            created: None,
            text: None,
            deleted: false,
            visible: true,
            replies: Vec::new(),
        }
    }
}

/// Parent of the root collections (all projects, all issues).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerRoot {
    pub base_url: String,
}

/// Parent of a project-scoped issue collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub short_name: String,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    pub name: Option<String>,
    pub issues: Option<ProjectIssues>,
}

impl Project {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            issues: None,
        }
    }

    pub fn with_issues(mut self, issues: ProjectIssues) -> Self {
        self.issues = Some(issues);
        self
    }
}

/// Items a collection can look up by their external key.
pub trait Keyed {
    fn matches_key(&self, key: &str) -> bool;
}

impl Keyed for Issue {
    fn matches_key(&self, key: &str) -> bool {
        key.parse::<IssueId>()
            .map(|id| {
                id.number == self.id.number && id.project_id.eq_ignore_ascii_case(&self.id.project_id)
            })
            .unwrap_or(false)
    }
}

impl Keyed for Project {
    fn matches_key(&self, key: &str) -> bool {
        self.id.eq_ignore_ascii_case(key.trim())
    }
}

impl Keyed for Comment {
    fn matches_key(&self, key: &str) -> bool {
        self.id == key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_issue_id() {
        let id: IssueId = "DEMO-42".parse().expect("valid id");
        assert_eq!(id, IssueId::new("DEMO", 42));
        assert_eq!(id.to_string(), "DEMO-42");
    }

    #[test]
    fn parses_project_with_dash_in_name() {
        let id: IssueId = "MY-APP-7".parse().expect("valid id");
        assert_eq!(id.project_id, "MY-APP");
        assert_eq!(id.number, 7);
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["DEMO", "-12", "DEMO-", "DEMO-x1"] {
            assert!(raw.parse::<IssueId>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn empty_projections_are_none() {
        assert_eq!(IssueField::Text("  ".to_string()).string_value(), None);
        assert_eq!(IssueField::Enum(vec![]).string_value(), None);
        assert_eq!(IssueField::User(vec![]).string_value(), None);
    }

    #[test]
    fn projections_join_multiple_values() {
        let field = IssueField::Enum(vec!["1.0".to_string(), "".to_string(), "1.1".to_string()]);
        assert_eq!(field.string_value().as_deref(), Some("1.0, 1.1"));

        let users = IssueField::User(vec![
            UserRef::new("jane").with_full_name("Jane Doe"),
            UserRef::new("bob"),
        ]);
        assert_eq!(users.string_value().as_deref(), Some("Jane Doe, bob"));
    }

    #[test]
    fn attachment_variant_exposes_typed_values() {
        let field = IssueField::Attachment(vec![AttachmentValue {
            id: "1-5".to_string(),
            url: "/files/1-5".to_string(),
            name: None,
        }]);
        assert_eq!(field.string_value().as_deref(), Some("/files/1-5"));
        assert_eq!(field.attachments().map(|files| files[0].id.as_str()), Some("1-5"));
        assert!(IssueField::Text("x".to_string()).attachments().is_none());
    }

    #[test]
    fn date_projection_uses_calendar_day() {
        let field = IssueField::Date(1_700_000_000_000);
        assert_eq!(field.string_value().as_deref(), Some("2023-11-14"));
    }

    #[test]
    fn keyed_lookups_ignore_case() {
        let issue = Issue::new(IssueId::new("DEMO", 3));
        assert!(issue.matches_key("demo-3"));
        assert!(!issue.matches_key("DEMO-30"));
        assert!(Project::new("DEMO").matches_key("demo"));
    }
}
