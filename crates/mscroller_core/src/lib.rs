//! MScroller core: pure page-agent state machine and view-model helpers.
mod config;
mod countdown;
mod effect;
mod history;
mod keyboard;
mod msg;
pub mod protocol;
mod scroll;
mod settings;
mod state;
mod update;
mod view_model;

pub use config::{AgentConfig, SpeedProfile, MIN_SPEED};
pub use countdown::{Countdown, CountdownPurpose, CountdownTick, TimerId, TICK_MS};
pub use effect::Effect;
pub use history::{record_visit, site_of, HistoryEntry, VisitedChapter};
pub use keyboard::{shortcut_for, Focus, Key, KeyInput, Shortcut};
pub use msg::Msg;
pub use scroll::{FrameId, FrameStep, ScrollEngine, ScrollPhase, Viewport};
pub use settings::{Settings, SettingsChange};
pub use state::{AgentState, PanelState};
pub use update::update;
pub use view_model::{format_duration, AgentViewModel, CountdownView, PanelView};
