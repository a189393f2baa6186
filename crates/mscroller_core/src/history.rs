use serde::{Deserialize, Serialize};
use url::Url;

/// The chapter a reader is leaving, as seen by the page agent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisitedChapter {
    pub title: String,
    pub chapter: Option<String>,
    pub url: String,
}

/// One persisted reading-history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub chapter: String,
    pub url: String,
    pub site: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn from_visit(visit: &VisitedChapter, timestamp: i64) -> Self {
        Self {
            title: visit.title.clone(),
            chapter: visit
                .chapter
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            url: visit.url.clone(),
            site: site_of(&visit.url),
            timestamp,
        }
    }

    fn same_series(&self, other: &HistoryEntry) -> bool {
        self.site == other.site && self.title == other.title
    }
}

/// Hostname of `url`, or an empty string when it has none.
pub fn site_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default()
}

/// Inserts `entry` at the front of `history`, replacing any entry for the
/// same site and title, and trims the list to `cap` entries.
pub fn record_visit(history: &mut Vec<HistoryEntry>, entry: HistoryEntry, cap: usize) {
    history.retain(|existing| !existing.same_series(&entry));
    history.insert(0, entry);
    history.truncate(cap);
}
