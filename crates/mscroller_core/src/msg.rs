use crate::{FrameId, KeyInput, Settings, SettingsChange, TimerId, VisitedChapter, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The page finished loading. `continued` is true when the previous
    /// page left a continuation token that has now been consumed.
    PageLoaded {
        now_ms: f64,
        continued: bool,
        xml_document: bool,
    },
    /// Initial read of the settings store.
    SettingsLoaded(Settings),
    /// One notification from the settings store's change stream.
    SettingsChanged(SettingsChange),
    /// Play/stop from the panel button or the popup.
    ToggleRequested { now_ms: f64 },
    /// A requested frame callback fired.
    FrameDelivered {
        frame: FrameId,
        timestamp_ms: f64,
        viewport: Viewport,
    },
    /// An interval timer owned by the agent fired.
    TimerFired { timer: TimerId, now_ms: f64 },
    /// Panel +/- button.
    SpeedStepped { delta: i32 },
    /// Speed pushed from another context that already persisted it.
    SpeedSet { speed: i64 },
    ShowPanelRequested,
    /// The panel's close control.
    PanelClosed,
    KeyPressed { input: KeyInput, now_ms: f64 },
    NextChapterRequested,
    PrevChapterRequested,
    /// Heuristic lookup for the next chapter completed.
    NextChapterResolved {
        url: Option<String>,
        leaving: VisitedChapter,
    },
    /// Heuristic lookup for the previous chapter completed.
    PrevChapterResolved {
        url: Option<String>,
        leaving: VisitedChapter,
    },
    PageUnloading { now_ms: f64 },
    NoOp,
}
