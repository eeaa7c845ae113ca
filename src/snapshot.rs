//! Point-in-time, read-only copies of issues.

use std::collections::HashMap;

use crate::model::{Issue, IssueField, IssueId, UserRef};

/// Deep copy of an issue's scalar attributes and field map, taken at one
/// instant. Nothing can be written through it, so every cell of a report row
/// observes the same state of the issue.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueSnapshot {
    id: IssueId,
    summary: String,
    reporter: String,
    assignee: Option<UserRef>,
    priority: String,
    state: String,
    resolved: bool,
    votes: u32,
    issue_type: String,
    fields: HashMap<String, IssueField>,
}

impl IssueSnapshot {
    pub fn capture(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            summary: issue.summary.clone(),
            reporter: issue.reporter.clone(),
            assignee: issue.assignee.clone(),
            priority: issue.priority.clone(),
            state: issue.state.clone(),
            resolved: issue.resolved,
            votes: issue.votes,
            issue_type: issue.issue_type.clone(),
            fields: issue.fields.clone(),
        }
    }

    pub fn id(&self) -> &IssueId {
        &self.id
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn reporter(&self) -> &str {
        &self.reporter
    }

    pub fn assignee(&self) -> Option<&UserRef> {
        self.assignee.as_ref()
    }

    pub fn priority(&self) -> &str {
        &self.priority
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn votes(&self) -> u32 {
        self.votes
    }

    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    pub fn field(&self, code: &str) -> Option<&IssueField> {
        self.fields.get(code)
    }

    pub fn fields(&self) -> &HashMap<String, IssueField> {
        &self.fields
    }
}

impl From<&Issue> for IssueSnapshot {
    fn from(issue: &Issue) -> Self {
        IssueSnapshot::capture(issue)
    }
}
