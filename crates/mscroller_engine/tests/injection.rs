use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mscroller_core::protocol::{BackgroundRequest, InjectionResponse, TabId};
use mscroller_engine::{AgentRegistry, InjectionError, InjectionService, ScriptInjector};

/// Injecting into a tab registers an agent there, like a real content script.
#[derive(Clone, Default)]
struct FakeTabs {
    agents: Arc<Mutex<HashSet<TabId>>>,
    restricted: Arc<Mutex<HashSet<TabId>>>,
    injections: Arc<AtomicUsize>,
}

impl FakeTabs {
    fn restrict(&self, tab: TabId) {
        self.restricted.lock().unwrap().insert(tab);
    }

    fn navigate(&self, tab: TabId) {
        self.agents.lock().unwrap().remove(&tab);
    }

    fn injections(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptInjector for FakeTabs {
    async fn inject(&self, tab: TabId) -> Result<(), InjectionError> {
        self.injections.fetch_add(1, Ordering::SeqCst);
        if self.restricted.lock().unwrap().contains(&tab) {
            return Err(InjectionError::Restricted(format!("tab {tab}")));
        }
        self.agents.lock().unwrap().insert(tab);
        Ok(())
    }
}

impl AgentRegistry for FakeTabs {
    fn has_agent(&self, tab: TabId) -> bool {
        self.agents.lock().unwrap().contains(&tab)
    }
}

fn service() -> (FakeTabs, InjectionService<FakeTabs>) {
    let tabs = FakeTabs::default();
    let service = InjectionService::new(tabs.clone(), Arc::new(tabs.clone()));
    (tabs, service)
}

#[tokio::test]
async fn second_request_does_not_inject_twice() {
    let (tabs, service) = service();
    let request = BackgroundRequest::EnsureContentScript { tab_id: 3 };

    assert_eq!(service.handle(request.clone()).await, InjectionResponse::Injected);
    assert_eq!(service.handle(request).await, InjectionResponse::AlreadyInjected);
    assert_eq!(tabs.injections(), 1);
    assert!(service.is_tracked(3));
}

#[tokio::test]
async fn failures_are_reported_and_remembered_until_navigation() {
    let (tabs, service) = service();
    tabs.restrict(9);

    let first = service.ensure(9).await;
    assert!(matches!(first, InjectionResponse::Failed { .. }));
    assert!(!first.is_available());
    assert!(matches!(service.ensure(9).await, InjectionResponse::Failed { .. }));
    assert_eq!(tabs.injections(), 1);

    tabs.restricted.lock().unwrap().clear();
    service.tab_navigated(9).await;
    assert_eq!(service.ensure(9).await, InjectionResponse::Injected);
}

#[tokio::test]
async fn tracked_tabs_are_reinjected_after_navigation() {
    let (tabs, service) = service();
    service.ensure(4).await;

    tabs.navigate(4);
    service.tab_navigated(4).await;
    assert_eq!(tabs.injections(), 2);
    assert!(tabs.has_agent(4));

    // Untracked tabs are left alone.
    tabs.navigate(5);
    service.tab_navigated(5).await;
    assert_eq!(tabs.injections(), 2);
}

#[tokio::test]
async fn closed_tabs_are_forgotten() {
    let (tabs, service) = service();
    service.ensure(6).await;
    service.tab_removed(6);
    assert!(!service.is_tracked(6));

    tabs.navigate(6);
    service.tab_navigated(6).await;
    assert_eq!(tabs.injections(), 1);
}
