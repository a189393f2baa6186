use crate::PanelState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownView {
    pub next_chapter: bool,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentViewModel {
    pub scrolling: bool,
    pub speed: u32,
    pub max_speed: u32,
    pub auto_next: bool,
    pub next_delay: u32,
    pub panel: PanelState,
    pub keyboard_enabled: bool,
    pub countdown: Option<CountdownView>,
    pub dirty: bool,
}

/// What the floating panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub scrolling: bool,
    pub speed: u32,
    pub title: String,
    pub chapter: String,
    pub elapsed: String,
}

impl PanelView {
    pub fn new(view: &AgentViewModel, title: String, chapter: Option<String>, elapsed_secs: u64) -> Self {
        Self {
            scrolling: view.scrolling,
            speed: view.speed,
            title,
            chapter: chapter.unwrap_or_else(|| "Unknown".to_string()),
            elapsed: format_duration(elapsed_secs as i64),
        }
    }

    pub fn play_label(&self) -> &'static str {
        if self.scrolling {
            "Stop"
        } else {
            "Start"
        }
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up. Non-positive input reads `0:00`.
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0:00".to_string();
    }
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
