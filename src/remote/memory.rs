//! In-memory collection that records every call made against it.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{MacroError, Result};
use crate::model::Keyed;
use crate::remote::RemoteCollection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Query {
        filter: String,
        start: usize,
        page_size: usize,
    },
    Get(String),
}

pub(crate) struct MemoryCollection<P, I> {
    parent: P,
    items: Vec<I>,
    failure: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl<P, I> MemoryCollection<P, I> {
    pub(crate) fn new(parent: P, items: Vec<I>) -> Self {
        Self {
            parent,
            items,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `RemoteUnavailable(message)`.
    pub(crate) fn failing(parent: P, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(parent, Vec::new())
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(MacroError::RemoteUnavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<P, I> RemoteCollection<P, I> for MemoryCollection<P, I>
where
    P: Send + Sync + 'static,
    I: Keyed + Clone + Send + Sync + 'static,
{
    fn parent(&self) -> &P {
        &self.parent
    }

    async fn list(&self) -> Result<Vec<I>> {
        self.record(Call::List)?;
        Ok(self.items.clone())
    }

    async fn query(&self, filter: &str, start: usize, page_size: usize) -> Result<Vec<I>> {
        self.record(Call::Query {
            filter: filter.to_string(),
            start,
            page_size,
        })?;
        Ok(self.items.iter().skip(start).take(page_size).cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<Option<I>> {
        self.record(Call::Get(key.to_string()))?;
        Ok(self.items.iter().find(|item| item.matches_key(key)).cloned())
    }
}
