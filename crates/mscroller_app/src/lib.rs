//! MScroller runtime: page agents on a virtual clock, the popup client and
//! the plumbing the `mscroller` binary shares with tests.
mod agent;
pub mod config;
mod effects;
mod host;
pub mod logging;
mod messaging;
mod popup;
pub mod scheduler;

pub use agent::{PageAgent, RunOutcome};
pub use config::{load_config, ConfigError};
pub use effects::{AgentStores, SETTINGS_FILE, STATS_FILE};
pub use host::{HostEvent, PageHost, SimulatedPage, Toast};
pub use messaging::{AgentDirectory, AgentPresence, ProtocolError, TabMessenger};
pub use popup::{PopupClient, StatsSummary};
pub use scheduler::{Callback, Scheduler, FRAME_INTERVAL_MS};
