//! Collections backed by the YouTrack REST API.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::sync::OnceCell;
use youtrack_api::YouTrackClient;

use crate::bridge::{convert_comment_native, convert_issue_native, convert_project_native};
use crate::error::Result;
use crate::model::{Comment, Issue, IssueId, Project, ProjectRef, TrackerRoot};
use crate::remote::{RemoteCollection, Tracker};

impl Tracker {
    /// Root collections talking to the instance `client` points at.
    pub fn connect(client: YouTrackClient) -> Self {
        let root = TrackerRoot {
            base_url: client.config().base_url.clone(),
        };
        Tracker {
            projects: Arc::new(HttpProjects::new(client.clone(), root.clone())),
            issues: Arc::new(HttpIssues::new(client, root, None)),
        }
    }
}

/// All projects visible to the current user. The listing is fetched once per
/// collection instance and reused by lookups and queries.
pub struct HttpProjects {
    client: YouTrackClient,
    parent: TrackerRoot,
    listed: OnceCell<Vec<Project>>,
}

impl HttpProjects {
    pub fn new(client: YouTrackClient, parent: TrackerRoot) -> Self {
        Self {
            client,
            parent,
            listed: OnceCell::new(),
        }
    }

    fn project_issues(&self, short_name: &str) -> Arc<HttpIssues<ProjectRef>> {
        let parent = ProjectRef {
            short_name: short_name.to_string(),
        };
        Arc::new(HttpIssues::new(
            self.client.clone(),
            parent,
            Some(short_name.to_string()),
        ))
    }
}

#[async_trait]
impl RemoteCollection<TrackerRoot, Project> for HttpProjects {
    fn parent(&self) -> &TrackerRoot {
        &self.parent
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let projects = self
            .listed
            .get_or_try_init(|| async {
                let native = self.client.list_projects().await?;
                debug!("youtrack:projects listed count={}", native.len());
                Ok::<_, crate::error::MacroError>(
                    native
                        .into_iter()
                        .map(|project| {
                            let issues = self.project_issues(&project.short_name);
                            convert_project_native(project, Some(issues))
                        })
                        .collect(),
                )
            })
            .await?;
        Ok(projects.clone())
    }

    /// Case-insensitive match on short name or display name.
    async fn query(&self, filter: &str, start: usize, page_size: usize) -> Result<Vec<Project>> {
        let needle = filter.trim().to_lowercase();
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|project| {
                needle.is_empty()
                    || project.id.to_lowercase().contains(&needle)
                    || project
                        .name
                        .as_deref()
                        .map(|name| name.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .skip(start)
            .take(page_size)
            .collect())
    }
}

/// Issues of the whole tracker or, when `scope` names a project, of one project.
pub struct HttpIssues<P> {
    client: YouTrackClient,
    parent: P,
    scope: Option<String>,
}

impl<P> HttpIssues<P> {
    pub fn new(client: YouTrackClient, parent: P, scope: Option<String>) -> Self {
        Self {
            client,
            parent,
            scope,
        }
    }

    fn scoped_filter(&self, filter: &str) -> String {
        match &self.scope {
            Some(project) => format!("project: {{{}}} {}", project, filter.trim())
                .trim_end()
                .to_string(),
            None => filter.to_string(),
        }
    }

    fn in_scope(&self, issue: &Issue) -> bool {
        self.scope
            .as_deref()
            .map(|project| issue.id.project_id.eq_ignore_ascii_case(project))
            .unwrap_or(true)
    }

    fn attach(&self, native: youtrack_api::Issue) -> Result<Issue> {
        let id = native.id_readable.parse::<IssueId>().ok();
        let comments = id.map(|id| {
            Arc::new(HttpComments::new(self.client.clone(), id)) as crate::remote::IssueComments
        });
        convert_issue_native(native, comments)
    }
}

#[async_trait]
impl<P> RemoteCollection<P, Issue> for HttpIssues<P>
where
    P: Send + Sync + 'static,
{
    fn parent(&self) -> &P {
        &self.parent
    }

    async fn list(&self) -> Result<Vec<Issue>> {
        let native = self.client.list_issues(&self.scoped_filter("")).await?;
        native.into_iter().map(|issue| self.attach(issue)).collect()
    }

    async fn query(&self, filter: &str, start: usize, page_size: usize) -> Result<Vec<Issue>> {
        let filter = self.scoped_filter(filter);
        debug!(
            "youtrack:issues query start={} page_size={} filter_len={}",
            start,
            page_size,
            filter.len()
        );
        let native = self.client.search_issues(&filter, start, page_size).await?;
        native.into_iter().map(|issue| self.attach(issue)).collect()
    }

    async fn get(&self, key: &str) -> Result<Option<Issue>> {
        match self.client.get_issue(key.trim()).await {
            Ok(native) => {
                let issue = self.attach(native)?;
                Ok(Some(issue).filter(|issue| self.in_scope(issue)))
            }
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Top-level comments of one issue.
pub struct HttpComments {
    client: YouTrackClient,
    parent: IssueId,
}

impl HttpComments {
    pub fn new(client: YouTrackClient, parent: IssueId) -> Self {
        Self { client, parent }
    }
}

#[async_trait]
impl RemoteCollection<IssueId, Comment> for HttpComments {
    fn parent(&self) -> &IssueId {
        &self.parent
    }

    async fn list(&self) -> Result<Vec<Comment>> {
        let native = self
            .client
            .list_issue_comments(&self.parent.to_string())
            .await?;
        Ok(native
            .into_iter()
            .map(|comment| convert_comment_native(comment, &self.parent))
            .collect())
    }

    /// The comments endpoint has no search; a non-empty `filter` is applied
    /// to the fetched window as a case-insensitive text match.
    async fn query(&self, filter: &str, start: usize, page_size: usize) -> Result<Vec<Comment>> {
        let native = self
            .client
            .get_issue_comments(&self.parent.to_string(), start, page_size)
            .await?;
        let needle = filter.trim().to_lowercase();
        Ok(native
            .into_iter()
            .map(|comment| convert_comment_native(comment, &self.parent))
            .filter(|comment| {
                needle.is_empty()
                    || comment
                        .text
                        .as_deref()
                        .map(|text| text.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .collect())
    }
}
