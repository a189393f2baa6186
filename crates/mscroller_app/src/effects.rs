use std::path::Path;
use std::sync::Arc;

use agent_logging::{agent_debug, agent_warn};
use mscroller_core::{AgentConfig, HistoryEntry, Settings, VisitedChapter};
use mscroller_engine::{
    ensure_data_dir, ContinuationToken, JsonFileStore, KeyValueStore, MemorySessionStorage,
    MemoryStore, PageSessionStorage, SettingsStore, StatsStore, StoreError,
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const STATS_FILE: &str = "stats.json";

/// The three storage areas a page agent touches.
#[derive(Clone)]
pub struct AgentStores {
    /// Synchronized settings (`speed`, `autoNext`, `nextDelay`).
    pub settings: Arc<dyn KeyValueStore>,
    /// Local stats (`totalTime`, `chaptersRead`, `history`).
    pub stats: Arc<dyn KeyValueStore>,
    /// Survives navigation within one tab only.
    pub session: Arc<dyn PageSessionStorage>,
}

impl AgentStores {
    /// File-backed settings and stats under `data_dir`, created if needed.
    pub fn open(data_dir: &Path, session: Arc<dyn PageSessionStorage>) -> Result<Self, StoreError> {
        ensure_data_dir(data_dir)?;
        Ok(Self {
            settings: Arc::new(JsonFileStore::open(data_dir.join(SETTINGS_FILE))?),
            stats: Arc::new(JsonFileStore::open(data_dir.join(STATS_FILE))?),
            session,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            settings: Arc::new(MemoryStore::new()),
            stats: Arc::new(MemoryStore::new()),
            session: Arc::new(MemorySessionStorage::new()),
        }
    }
}

/// Runs the storage side of agent effects. Every failure is logged and the
/// write abandoned; none of them reaches the state machine.
pub(crate) struct StoreEffects {
    settings: SettingsStore,
    stats: StatsStore,
    session: Arc<dyn PageSessionStorage>,
}

impl StoreEffects {
    pub(crate) fn new(stores: AgentStores, config: &AgentConfig) -> Self {
        Self {
            settings: SettingsStore::new(stores.settings, config.profile),
            stats: StatsStore::new(stores.stats, config.history_cap),
            session: stores.session,
        }
    }

    pub(crate) fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub(crate) fn load_settings(&self) -> Option<Settings> {
        self.settings.load().map_err(|err| warn("load settings", &err)).ok()
    }

    pub(crate) fn consume_continuation(&self) -> bool {
        ContinuationToken::consume(self.session.as_ref())
    }

    pub(crate) fn write_continuation(&self) {
        ContinuationToken::write(self.session.as_ref());
    }

    pub(crate) fn persist_speed(&self, speed: u32) {
        if let Err(err) = self.settings.save_speed(i64::from(speed)) {
            warn("persist speed", &err);
        }
    }

    pub(crate) fn record_chapter_read(&self, visit: Option<VisitedChapter>, timestamp_ms: i64) {
        match self.stats.increment_chapters_read() {
            Ok(count) => agent_debug!("chapters read: {}", count),
            Err(err) => warn("count chapter", &err),
        }
        if let Some(visit) = visit {
            self.record_visit(&visit, timestamp_ms);
        }
    }

    pub(crate) fn record_visit(&self, visit: &VisitedChapter, timestamp_ms: i64) {
        let entry = HistoryEntry::from_visit(visit, timestamp_ms);
        if let Err(err) = self.stats.record_history(entry) {
            warn("record history", &err);
        }
    }

    pub(crate) fn flush_session_time(&self, seconds: u64) {
        match self.stats.add_session_time(seconds) {
            Ok(total) => agent_debug!("session {}s, total {}s", seconds, total),
            Err(err) => warn("flush session time", &err),
        }
    }
}

fn warn(action: &str, err: &StoreError) {
    agent_warn!("{} failed: {}", action, err);
}
