use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use agent_logging::agent_info;
use serde_json::{Map, Value};

use crate::persist::AtomicFileWriter;
use crate::store::{
    merge, notify, ChangeListener, KeyValueStore, StoreError, Subscribers, SubscriptionId,
};

struct FileInner {
    data: Map<String, Value>,
    subscribers: Subscribers,
}

/// A store persisted as one JSON object per file.
///
/// The file is read once on open; every `set` rewrites it atomically. Two
/// processes sharing a file race per write, last writer wins.
pub struct JsonFileStore {
    writer: AtomicFileWriter,
    inner: Mutex<FileInner>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(StoreError::Unavailable(format!("{}: {err}", path.display()))),
        };
        agent_info!("opened store {} with {} keys", path.display(), data.len());
        Ok(Self {
            writer: AtomicFileWriter::new(path),
            inner: Mutex::new(FileInner {
                data,
                subscribers: Subscribers::default(),
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, FileInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.data.get(key).cloned())
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let (changes, listeners) = {
            let mut inner = self.lock()?;
            let mut next = inner.data.clone();
            let changes = merge(&mut next, entries);
            if changes.is_empty() {
                return Ok(());
            }
            let content = serde_json::to_vec_pretty(&next)?;
            self.writer.write(&content)?;
            inner.data = next;
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
