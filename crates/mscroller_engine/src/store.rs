//! Key-value stores with get/set/on-change semantics, standing in for the
//! browser's synchronized and local extension storage.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::persist::PersistError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The hosting context is gone (or was never there).
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed store data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// One key's transition, as delivered to change listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Value,
}

pub type SubscriptionId = u64;
pub type ChangeListener = Box<dyn Fn(&[StoreChange]) + Send + Sync>;
type SharedListener = Arc<dyn Fn(&[StoreChange]) + Send + Sync>;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Merges `entries` into the store, last writer wins per key. Listeners
    /// hear about the keys whose value actually changed, in one batch.
    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError>;

    fn subscribe(&self, listener: ChangeListener) -> Result<SubscriptionId, StoreError>;

    /// Removing an unknown subscription is a no-op.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Convenience for single-key writes.
pub fn set_one(store: &dyn KeyValueStore, key: &str, value: Value) -> Result<(), StoreError> {
    let mut entries = Map::new();
    entries.insert(key.to_string(), value);
    store.set(entries)
}

/// Listener registry shared by the store implementations.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: SubscriptionId,
    listeners: BTreeMap<SubscriptionId, SharedListener>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, listener: ChangeListener) -> SubscriptionId {
        self.next_id += 1;
        self.listeners.insert(self.next_id, Arc::from(listener));
        self.next_id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) {
        self.listeners.remove(&id);
    }

    /// Snapshot so listeners run without the store lock held.
    pub(crate) fn snapshot(&self) -> Vec<SharedListener> {
        self.listeners.values().cloned().collect()
    }
}

/// Applies `entries` to `data`, returning the per-key transitions.
pub(crate) fn merge(data: &mut Map<String, Value>, entries: Map<String, Value>) -> Vec<StoreChange> {
    let mut changes = Vec::new();
    for (key, new_value) in entries {
        let old_value = data.insert(key.clone(), new_value.clone());
        if old_value.as_ref() != Some(&new_value) {
            changes.push(StoreChange {
                key,
                old_value,
                new_value,
            });
        }
    }
    changes
}

pub(crate) fn notify(listeners: &[SharedListener], changes: &[StoreChange]) {
    if changes.is_empty() {
        return;
    }
    for listener in listeners {
        (**listener)(changes);
    }
}

#[derive(Default)]
struct MemoryInner {
    data: Map<String, Value>,
    subscribers: Subscribers,
    available: bool,
}

/// In-process store. Can be switched unavailable to mimic a torn-down host.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                available: true,
                ..MemoryInner::default()
            })),
        }
    }

    pub fn set_available(&self, available: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.available = available;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        if inner.available {
            Ok(inner)
        } else {
            Err(StoreError::Unavailable("host context torn down".into()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.data.get(key).cloned())
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let (changes, listeners) = {
            let mut inner = self.lock()?;
            let changes = merge(&mut inner.data, entries);
            (changes, inner.subscribers.snapshot())
        };
        notify(&listeners, &changes);
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) -> Result<SubscriptionId, StoreError> {
        Ok(self.lock()?.subscribers.add(listener))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribers.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listeners_see_only_real_changes() {
        let store = MemoryStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store
            .subscribe(Box::new(move |changes| {
                sink.lock().unwrap().extend(changes.iter().map(|c| c.key.clone()));
            }))
            .unwrap();

        set_one(&store, "speed", json!(4)).unwrap();
        set_one(&store, "speed", json!(4)).unwrap();
        set_one(&store, "autoNext", json!(false)).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["speed", "autoNext"]);
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let store = MemoryStore::new();
        let hits = Arc::new(Mutex::new(0));
        let sink = hits.clone();
        let id = store
            .subscribe(Box::new(move |_| *sink.lock().unwrap() += 1))
            .unwrap();
        set_one(&store, "speed", json!(1)).unwrap();
        store.unsubscribe(id);
        store.unsubscribe(id);
        set_one(&store, "speed", json!(2)).unwrap();
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn unavailable_store_refuses_everything() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(store.get("speed"), Err(StoreError::Unavailable(_))));
        assert!(set_one(&store, "speed", json!(1)).is_err());
        store.set_available(true);
        assert_eq!(store.get("speed").unwrap(), None);
    }
}
