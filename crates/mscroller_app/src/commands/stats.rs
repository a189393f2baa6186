use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use mscroller_app::{StatsSummary, STATS_FILE};
use mscroller_core::AgentConfig;
use mscroller_engine::{JsonFileStore, StatsStore};

pub fn execute(data_dir: &Path, config: &AgentConfig, json: bool) -> Result<()> {
    let store = JsonFileStore::open(data_dir.join(STATS_FILE))?;
    let stats = StatsStore::new(Arc::new(store), config.history_cap);
    let summary = StatsSummary::from(stats.snapshot()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Total time:     {}", summary.total_time);
    println!("Chapters read:  {}", summary.chapters_read);
    if summary.history.is_empty() {
        return Ok(());
    }
    println!();
    println!("Recent:");
    for entry in &summary.history {
        let when = DateTime::<Utc>::from_timestamp_millis(entry.timestamp)
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "  {when:<16}  {} - ch. {}  ({})",
            entry.title, entry.chapter, entry.site
        );
    }
    Ok(())
}
