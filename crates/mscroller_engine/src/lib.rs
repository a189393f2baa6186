//! MScroller engine: page heuristics, stores and the injection boundary.
mod continuation;
mod decode;
mod fetch;
mod file_store;
pub mod heuristics;
mod injection;
mod page;
mod persist;
mod settings_store;
mod stats;
mod store;

pub use continuation::{ContinuationToken, MemorySessionStorage, PageSessionStorage, CONTINUE_KEY};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use fetch::{FailureKind, FetchError, FetchSettings, PageFetcher};
pub use file_store::JsonFileStore;
pub use heuristics::{visited_chapter, ChapterInfo};
pub use injection::{AgentRegistry, InjectionError, InjectionService, ScriptInjector};
pub use page::{PageDocument, PageError};
pub use persist::{ensure_data_dir, AtomicFileWriter, PersistError};
pub use settings_store::{settings_change, SettingsStore, AUTO_NEXT_KEY, NEXT_DELAY_KEY, SPEED_KEY};
pub use stats::{ReadingStats, StatsStore, CHAPTERS_READ_KEY, HISTORY_KEY, TOTAL_TIME_KEY};
pub use store::{
    set_one, ChangeListener, KeyValueStore, MemoryStore, StoreChange, StoreError, SubscriptionId,
};
