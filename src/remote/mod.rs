//! Lazily fetched, windowed views over tracker collections.
//!
//! A [`RemoteCollection`] is bound to exactly one parent (the tracker root, a
//! project, an issue) and materialises its items either completely through
//! [`RemoteCollection::list`] or one window at a time through
//! [`RemoteCollection::query`]. Windows are independent round-trips, never
//! resumable cursors. Collections are read-only.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{MacroError, Result};
use crate::model::{Comment, Issue, IssueId, Keyed, Project, ProjectRef, TrackerRoot};

pub mod http;
#[cfg(test)]
pub(crate) mod memory;

#[async_trait]
pub trait RemoteCollection<P, I>: Send + Sync
where
    P: Send + Sync + 'static,
    I: Keyed + Send + 'static,
{
    fn parent(&self) -> &P;

    /// Every item of the collection. Meant for small, bounded collections.
    async fn list(&self) -> Result<Vec<I>>;

    /// At most `page_size` items matching `filter`, starting at the 0-based
    /// `start` index of the logical result set.
    async fn query(&self, filter: &str, start: usize, page_size: usize) -> Result<Vec<I>>;

    /// Single item by its external key; `Ok(None)` when absent.
    async fn get(&self, key: &str) -> Result<Option<I>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|item| item.matches_key(key)))
    }
}

impl<P, I> fmt::Debug for dyn RemoteCollection<P, I>
where
    P: Send + Sync + 'static,
    I: Keyed + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RemoteCollection")
    }
}

pub type SharedCollection<P, I> = Arc<dyn RemoteCollection<P, I>>;
pub type RootProjects = SharedCollection<TrackerRoot, Project>;
pub type RootIssues = SharedCollection<TrackerRoot, Issue>;
pub type ProjectIssues = SharedCollection<ProjectRef, Issue>;
pub type IssueComments = SharedCollection<IssueId, Comment>;

/// Entry points into one tracker: every project and every issue.
#[derive(Clone)]
pub struct Tracker {
    pub projects: RootProjects,
    pub issues: RootIssues,
}

impl Tracker {
    pub fn new(projects: RootProjects, issues: RootIssues) -> Self {
        Self { projects, issues }
    }
}

/// Bounds a remote call; expiry surfaces as [`MacroError::RemoteUnavailable`].
pub async fn within<T, F>(limit: Duration, what: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(MacroError::RemoteUnavailable(format!(
            "{} timed out after {}ms",
            what,
            limit.as_millis()
        ))),
    }
}
