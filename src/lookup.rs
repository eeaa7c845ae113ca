//! Single-issue resolution by readable id.

use std::time::Duration;

use log::debug;

use crate::error::Result;
use crate::model::{Issue, IssueId, Project};
use crate::remote::{within, Tracker};

#[derive(Debug)]
pub enum LookupOutcome {
    /// The id is not of the `PROJECT-NUMBER` form.
    InvalidId(String),
    ProjectNotFound(String),
    IssueNotFound(IssueId),
    Found { project: Project, issue: Issue },
}

impl LookupOutcome {
    /// Inline message for every outcome but [`LookupOutcome::Found`].
    pub fn failure_message(&self) -> Option<String> {
        match self {
            LookupOutcome::InvalidId(raw) => Some(format!("Invalid issue id: {}", raw)),
            LookupOutcome::ProjectNotFound(project) => Some(format!("Project not found: {}", project)),
            LookupOutcome::IssueNotFound(id) => Some(format!("Issue not found: {}", id)),
            LookupOutcome::Found { .. } => None,
        }
    }
}

pub struct IssueLookup {
    tracker: Tracker,
    timeout: Duration,
}

impl IssueLookup {
    pub fn new(tracker: Tracker, timeout: Duration) -> Self {
        Self { tracker, timeout }
    }

    /// Resolves the project first and only then the issue inside it, so an
    /// unknown project costs a single remote lookup.
    pub async fn lookup(&self, raw_id: &str) -> Result<LookupOutcome> {
        let raw_id = raw_id.trim();
        let Ok(id) = raw_id.parse::<IssueId>() else {
            return Ok(LookupOutcome::InvalidId(raw_id.to_string()));
        };

        let project = within(
            self.timeout,
            "project lookup",
            self.tracker.projects.get(&id.project_id),
        )
        .await?;
        let Some(project) = project else {
            debug!("lookup: project {} not found", id.project_id);
            return Ok(LookupOutcome::ProjectNotFound(id.project_id));
        };

        let Some(issues) = project.issues.clone() else {
            return Ok(LookupOutcome::IssueNotFound(id));
        };
        let key = id.to_string();
        let issue = within(self.timeout, "issue lookup", issues.get(&key)).await?;
        match issue {
            Some(issue) => Ok(LookupOutcome::Found { project, issue }),
            None => {
                debug!("lookup: issue {} not found", key);
                Ok(LookupOutcome::IssueNotFound(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::error::MacroError;
    use crate::model::{ProjectRef, TrackerRoot};
    use crate::remote::memory::{Call, MemoryCollection};
    use crate::remote::ProjectIssues;

    fn root() -> TrackerRoot {
        TrackerRoot {
            base_url: "https://yt.example.com".to_string(),
        }
    }

    struct Fixture {
        lookup: IssueLookup,
        projects: Arc<MemoryCollection<TrackerRoot, Project>>,
        demo_issues: Arc<MemoryCollection<ProjectRef, Issue>>,
    }

    fn fixture() -> Fixture {
        let demo_issues = Arc::new(MemoryCollection::new(
            ProjectRef {
                short_name: "DEMO".to_string(),
            },
            vec![Issue::new(IssueId::new("DEMO", 7))],
        ));
        let demo = Project::new("DEMO").with_issues(demo_issues.clone() as ProjectIssues);
        let projects = Arc::new(MemoryCollection::new(root(), vec![demo, Project::new("BARE")]));
        let all_issues = Arc::new(MemoryCollection::<TrackerRoot, Issue>::new(root(), vec![]));
        Fixture {
            lookup: IssueLookup::new(
                Tracker::new(projects.clone(), all_issues),
                Duration::from_secs(1),
            ),
            projects,
            demo_issues,
        }
    }

    #[tokio::test]
    async fn finds_issue_through_its_project() {
        let fx = fixture();
        let outcome = fx.lookup.lookup(" demo-7 ").await.expect("lookup");
        match outcome {
            LookupOutcome::Found { project, issue } => {
                assert_eq!(project.id, "DEMO");
                assert_eq!(issue.id, IssueId::new("DEMO", 7));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(fx.projects.calls(), vec![Call::Get("demo".to_string())]);
        assert_eq!(fx.demo_issues.calls(), vec![Call::Get("demo-7".to_string())]);
    }

    #[tokio::test]
    async fn unknown_project_skips_issue_fetch() {
        let fx = fixture();
        let outcome = fx.lookup.lookup("NOPE-1").await.expect("lookup");
        assert!(matches!(&outcome, LookupOutcome::ProjectNotFound(p) if p == "NOPE"));
        assert_eq!(outcome.failure_message().as_deref(), Some("Project not found: NOPE"));
        assert!(fx.demo_issues.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_issue_in_known_project() {
        let fx = fixture();
        let outcome = fx.lookup.lookup("DEMO-99").await.expect("lookup");
        assert!(matches!(outcome, LookupOutcome::IssueNotFound(ref id) if *id == IssueId::new("DEMO", 99)));
        assert_eq!(outcome.failure_message().as_deref(), Some("Issue not found: DEMO-99"));

        let outcome = fx.lookup.lookup("BARE-1").await.expect("lookup");
        assert!(matches!(outcome, LookupOutcome::IssueNotFound(_)));
    }

    #[tokio::test]
    async fn malformed_id_makes_no_calls() {
        let fx = fixture();
        let outcome = fx.lookup.lookup("DEMO").await.expect("lookup");
        assert_eq!(outcome.failure_message().as_deref(), Some("Invalid issue id: DEMO"));
        assert!(fx.projects.calls().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_propagates() {
        let projects = Arc::new(MemoryCollection::<TrackerRoot, Project>::failing(root(), "502"));
        let issues = Arc::new(MemoryCollection::<TrackerRoot, Issue>::new(root(), vec![]));
        let lookup = IssueLookup::new(Tracker::new(projects, issues), Duration::from_secs(1));
        let err = lookup.lookup("DEMO-1").await.expect_err("fails");
        assert!(matches!(err, MacroError::RemoteUnavailable(_)));
    }
}
