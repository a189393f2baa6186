use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use agent_logging::{agent_info, agent_warn};
use async_trait::async_trait;
use mscroller_core::protocol::{BackgroundRequest, InjectionResponse, TabId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    #[error("cannot inject into restricted page: {0}")]
    Restricted(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("tab {0} not found")]
    NoSuchTab(TabId),
}

/// Puts page-agent code into a tab.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    async fn inject(&self, tab: TabId) -> Result<(), InjectionError>;
}

/// Answers whether a tab already runs a page agent.
pub trait AgentRegistry: Send + Sync {
    fn has_agent(&self, tab: TabId) -> bool;
}

#[derive(Debug, Default)]
struct TabTracker {
    /// Tabs the user activated; re-injected after each navigation.
    tracked: HashSet<TabId>,
    /// Tabs where injection failed; skipped until they navigate.
    incapable: HashSet<TabId>,
}

/// Makes sure a page agent is present in a tab before it is messaged.
pub struct InjectionService<I> {
    injector: I,
    registry: Arc<dyn AgentRegistry>,
    tabs: Mutex<TabTracker>,
}

impl<I: ScriptInjector> InjectionService<I> {
    pub fn new(injector: I, registry: Arc<dyn AgentRegistry>) -> Self {
        Self {
            injector,
            registry,
            tabs: Mutex::new(TabTracker::default()),
        }
    }

    pub async fn handle(&self, request: BackgroundRequest) -> InjectionResponse {
        match request {
            BackgroundRequest::EnsureContentScript { tab_id } => self.ensure(tab_id).await,
        }
    }

    pub async fn ensure(&self, tab: TabId) -> InjectionResponse {
        if self.registry.has_agent(tab) {
            self.with_tabs(|tabs| {
                tabs.tracked.insert(tab);
            });
            return InjectionResponse::AlreadyInjected;
        }
        if self.with_tabs(|tabs| tabs.incapable.contains(&tab)) {
            return InjectionResponse::Failed {
                error: format!("tab {tab} does not accept the page agent"),
            };
        }

        match self.injector.inject(tab).await {
            Ok(()) => {
                agent_info!("injected page agent into tab {}", tab);
                self.with_tabs(|tabs| {
                    tabs.tracked.insert(tab);
                });
                InjectionResponse::Injected
            }
            Err(err) => {
                agent_warn!("injection into tab {} failed: {}", tab, err);
                self.with_tabs(|tabs| {
                    tabs.incapable.insert(tab);
                });
                InjectionResponse::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// The tab finished loading a new document.
    pub async fn tab_navigated(&self, tab: TabId) {
        let tracked = self.with_tabs(|tabs| {
            tabs.incapable.remove(&tab);
            tabs.tracked.contains(&tab)
        });
        if !tracked || self.registry.has_agent(tab) {
            return;
        }
        if let Err(err) = self.injector.inject(tab).await {
            agent_warn!("re-injection into tab {} failed: {}", tab, err);
            self.with_tabs(|tabs| {
                tabs.tracked.remove(&tab);
                tabs.incapable.insert(tab);
            });
        }
    }

    pub fn tab_removed(&self, tab: TabId) {
        self.with_tabs(|tabs| {
            tabs.tracked.remove(&tab);
            tabs.incapable.remove(&tab);
        });
    }

    pub fn is_tracked(&self, tab: TabId) -> bool {
        self.with_tabs(|tabs| tabs.tracked.contains(&tab))
    }

    fn with_tabs<T>(&self, f: impl FnOnce(&mut TabTracker) -> T) -> T {
        let mut guard = match self.tabs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}
