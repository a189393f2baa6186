use agent_logging::{agent_debug, agent_warn};
use mscroller_core::protocol::{InfoResponse, Request, Response, TabId};
use mscroller_core::{format_duration, HistoryEntry, Settings};
use mscroller_engine::{ReadingStats, SettingsStore, StatsStore};
use serde::Serialize;

use crate::messaging::TabMessenger;

/// Stats as the popup prints them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_time: String,
    pub chapters_read: u64,
    pub history: Vec<HistoryEntry>,
}

impl From<ReadingStats> for StatsSummary {
    fn from(stats: ReadingStats) -> Self {
        Self {
            total_time: format_duration(i64::try_from(stats.total_time).unwrap_or(i64::MAX)),
            chapters_read: stats.chapters_read,
            history: stats.history,
        }
    }
}

/// Popup-side client for the agent in one tab. Messaging failures are
/// swallowed: the popup shows nothing rather than an error.
pub struct PopupClient<M> {
    messenger: M,
    settings: SettingsStore,
    stats: StatsStore,
    tab: TabId,
}

impl<M: TabMessenger> PopupClient<M> {
    pub fn new(messenger: M, settings: SettingsStore, stats: StatsStore, tab: TabId) -> Self {
        Self {
            messenger,
            settings,
            stats,
            tab,
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Start button: make sure an agent runs, show its panel, then toggle.
    /// Returns the new scrolling state, or `None` when the page cannot host
    /// an agent.
    pub async fn start(&self) -> Option<bool> {
        let injection = self.messenger.ensure_agent(self.tab).await;
        if !injection.is_available() {
            agent_debug!("tab {} unavailable: {:?}", self.tab, injection);
            return None;
        }
        self.send(Request::ShowPanel).await?;
        match self.send(Request::Toggle).await? {
            Response::Toggled { scrolling } => Some(scrolling),
            _ => None,
        }
    }

    /// One poll of the agent's live state.
    pub async fn info(&self) -> Option<InfoResponse> {
        match self.send(Request::GetInfo).await? {
            Response::Info(info) => Some(info),
            _ => None,
        }
    }

    /// Speed slider: persist first, then tell the page. Returns the value
    /// that was stored.
    pub async fn set_speed(&self, speed: i64) -> Option<u32> {
        let stored = match self.settings.save_speed(speed) {
            Ok(stored) => stored,
            Err(err) => {
                agent_warn!("saving speed failed: {}", err);
                return None;
            }
        };
        self.send(Request::UpdateSpeed {
            speed: i64::from(stored),
        })
        .await;
        Some(stored)
    }

    pub fn set_auto_next(&self, auto_next: bool) {
        if let Err(err) = self.settings.save_auto_next(auto_next) {
            agent_warn!("saving autoNext failed: {}", err);
        }
    }

    pub fn set_next_delay(&self, seconds: u32) {
        if let Err(err) = self.settings.save_next_delay(seconds) {
            agent_warn!("saving nextDelay failed: {}", err);
        }
    }

    /// Values for the popup's controls.
    pub fn settings(&self) -> Settings {
        self.settings.load().unwrap_or_else(|err| {
            agent_warn!("loading settings failed: {}", err);
            Settings::defaults_for(self.settings.profile())
        })
    }

    pub fn stats(&self) -> Option<StatsSummary> {
        match self.stats.snapshot() {
            Ok(snapshot) => Some(snapshot.into()),
            Err(err) => {
                agent_warn!("reading stats failed: {}", err);
                None
            }
        }
    }

    async fn send(&self, request: Request) -> Option<Response> {
        match self.messenger.send(self.tab, request).await {
            Ok(response) => Some(response),
            Err(err) => {
                agent_debug!("tab {} did not answer: {}", self.tab, err);
                None
            }
        }
    }
}
