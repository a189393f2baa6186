//! Message passing between the popup, the background context and page
//! agents, plus the directory of tabs that currently host an agent.
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mscroller_core::protocol::{InjectionResponse, Request, Response, TabId};
use mscroller_engine::AgentRegistry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("no page agent listening in tab {0}")]
    NoReceiver(TabId),
    #[error("page agent already shut down")]
    Detached,
}

/// The popup's view of the browser: one call to make sure an agent runs in
/// a tab and one to message it.
#[async_trait(?Send)]
pub trait TabMessenger {
    async fn ensure_agent(&self, tab: TabId) -> InjectionResponse;
    async fn send(&self, tab: TabId, request: Request) -> Result<Response, ProtocolError>;
}

/// Tabs with a live page agent.
#[derive(Debug, Default)]
pub struct AgentDirectory {
    tabs: Mutex<HashSet<TabId>>,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn tabs(&self) -> MutexGuard<'_, HashSet<TabId>> {
        match self.tabs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl AgentRegistry for AgentDirectory {
    fn has_agent(&self, tab: TabId) -> bool {
        self.tabs().contains(&tab)
    }
}

/// Marks a tab as hosting an agent for as long as this value lives.
#[derive(Debug)]
pub struct AgentPresence {
    directory: Arc<AgentDirectory>,
    tab: TabId,
}

impl AgentPresence {
    pub fn announce(directory: Arc<AgentDirectory>, tab: TabId) -> Self {
        directory.tabs().insert(tab);
        Self { directory, tab }
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }
}

impl Drop for AgentPresence {
    fn drop(&mut self) {
        self.directory.tabs().remove(&self.tab);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_lasts_as_long_as_the_guard() {
        let directory = Arc::new(AgentDirectory::new());
        let presence = AgentPresence::announce(directory.clone(), 4);
        assert!(directory.has_agent(4));
        assert!(!directory.has_agent(5));
        drop(presence);
        assert!(!directory.has_agent(4));
    }
}
