use crate::{FrameId, TimerId, VisitedChapter};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestFrame { frame: FrameId },
    CancelFrame { frame: FrameId },
    ScrollBy { pixels: f64 },
    StartInterval { timer: TimerId, period_ms: u64 },
    CancelInterval { timer: TimerId },
    ShowToast { text: String },
    /// Build the panel; emitted once per page load.
    ConstructPanel,
    SetKeyboardCapture { enabled: bool },
    ResolveNextChapter,
    ResolvePrevChapter,
    /// Bump the chapters-read counter and, when `visit` is set, log it.
    RecordChapterRead { visit: Option<VisitedChapter> },
    /// Log a visit without counting it as read.
    RecordVisit { visit: VisitedChapter },
    WriteContinuationToken,
    Navigate { url: String },
    PersistSpeed { speed: u32 },
    FlushSessionTime { seconds: u64 },
}
