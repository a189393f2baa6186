use serde::{Deserialize, Serialize};

/// Identifies one requested frame callback.
pub type FrameId = u64;

/// Vertical geometry of the page at the time a frame is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, viewport_height: f64, content_height: f64) -> Self {
        Self {
            scroll_y,
            viewport_height,
            content_height,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Viewport after scrolling by `pixels`, pinned to the scrollable range.
    pub fn scrolled_by(self, pixels: f64) -> Self {
        Self {
            scroll_y: (self.scroll_y + pixels).clamp(0.0, self.max_scroll()),
            ..self
        }
    }

    pub fn is_at_bottom(&self, tolerance_px: f64) -> bool {
        self.viewport_height + self.scroll_y >= self.content_height - tolerance_px
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    #[default]
    Idle,
    Scrolling,
}

/// What a delivered frame callback amounts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStep {
    /// The frame was cancelled or superseded; nothing moves.
    Stale,
    /// Scrolled and requested the following frame.
    Advanced { pixels: f64, next_frame: FrameId },
    /// Scrolled onto the end of content with auto-advance on; now idle.
    ReachedBottom { pixels: f64 },
}

/// Per-frame scroll driver. Holds at most one outstanding frame request;
/// a frame whose id does not match it is ignored, which is what makes
/// `stop` final even if the host still delivers a callback afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollEngine {
    phase: ScrollPhase,
    last_frame_ms: f64,
    pending: Option<FrameId>,
    issued: FrameId,
}

impl ScrollEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn is_scrolling(&self) -> bool {
        self.phase == ScrollPhase::Scrolling
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    /// Begins scrolling and returns the first frame to request, or `None`
    /// when already scrolling.
    pub fn start(&mut self, now_ms: f64) -> Option<FrameId> {
        if self.is_scrolling() {
            return None;
        }
        self.phase = ScrollPhase::Scrolling;
        self.last_frame_ms = now_ms;
        Some(self.request_frame())
    }

    /// Stops scrolling and hands back the outstanding frame, if any, so the
    /// caller can cancel it. Calling it again returns `None`.
    pub fn stop(&mut self) -> Option<FrameId> {
        self.phase = ScrollPhase::Idle;
        self.pending.take()
    }

    pub fn step(
        &mut self,
        frame: FrameId,
        timestamp_ms: f64,
        viewport: Viewport,
        velocity: f64,
        auto_next: bool,
        config: &crate::AgentConfig,
    ) -> FrameStep {
        if !self.is_scrolling() || self.pending != Some(frame) {
            return FrameStep::Stale;
        }
        self.pending = None;

        let elapsed_ms = (timestamp_ms - self.last_frame_ms).clamp(0.0, config.max_frame_gap_ms);
        self.last_frame_ms = timestamp_ms;
        let pixels = velocity * elapsed_ms / 1000.0;

        let projected = viewport.scrolled_by(pixels);
        if auto_next && projected.is_at_bottom(config.bottom_tolerance_px) {
            self.phase = ScrollPhase::Idle;
            return FrameStep::ReachedBottom { pixels };
        }

        FrameStep::Advanced {
            pixels,
            next_frame: self.request_frame(),
        }
    }

    fn request_frame(&mut self) -> FrameId {
        self.issued += 1;
        self.pending = Some(self.issued);
        self.issued
    }
}
