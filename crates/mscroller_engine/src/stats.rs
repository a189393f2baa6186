use std::sync::Arc;

use mscroller_core::{record_visit, HistoryEntry};
use serde::Serialize;
use serde_json::{json, Value};

use crate::store::{set_one, KeyValueStore, StoreError};

pub const TOTAL_TIME_KEY: &str = "totalTime";
pub const CHAPTERS_READ_KEY: &str = "chaptersRead";
pub const HISTORY_KEY: &str = "history";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    /// Cumulative seconds across all sessions.
    pub total_time: u64,
    pub chapters_read: u64,
    /// Most recent first.
    pub history: Vec<HistoryEntry>,
}

/// Typed view over the local stats store.
///
/// Counters are read, bumped and written back with no atomicity; a second
/// context writing between the read and the write loses one update.
#[derive(Clone)]
pub struct StatsStore {
    store: Arc<dyn KeyValueStore>,
    history_cap: usize,
}

impl StatsStore {
    pub fn new(store: Arc<dyn KeyValueStore>, history_cap: usize) -> Self {
        Self { store, history_cap }
    }

    pub fn snapshot(&self) -> Result<ReadingStats, StoreError> {
        Ok(ReadingStats {
            total_time: self.counter(TOTAL_TIME_KEY)?,
            chapters_read: self.counter(CHAPTERS_READ_KEY)?,
            history: self.history()?,
        })
    }

    pub fn add_session_time(&self, seconds: u64) -> Result<u64, StoreError> {
        let total = self.counter(TOTAL_TIME_KEY)?.saturating_add(seconds);
        set_one(self.store.as_ref(), TOTAL_TIME_KEY, json!(total))?;
        Ok(total)
    }

    pub fn increment_chapters_read(&self) -> Result<u64, StoreError> {
        let count = self.counter(CHAPTERS_READ_KEY)?.saturating_add(1);
        set_one(self.store.as_ref(), CHAPTERS_READ_KEY, json!(count))?;
        Ok(count)
    }

    pub fn record_history(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut history = self.history()?;
        record_visit(&mut history, entry, self.history_cap);
        set_one(self.store.as_ref(), HISTORY_KEY, serde_json::to_value(&history)?)
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match self.store.get(HISTORY_KEY)? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    fn counter(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self
            .store
            .get(key)?
            .and_then(|value| value.as_u64())
            .unwrap_or(0))
    }
}
