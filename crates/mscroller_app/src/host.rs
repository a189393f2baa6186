use mscroller_core::{PanelView, Viewport};
use mscroller_engine::PageDocument;

/// A transient notification. Only one is shown at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub shown_at_ms: f64,
    pub duration_ms: u64,
}

impl Toast {
    pub fn is_visible_at(&self, now_ms: f64) -> bool {
        now_ms >= self.shown_at_ms && now_ms < self.shown_at_ms + self.duration_ms as f64
    }
}

/// The page a [`PageAgent`](crate::PageAgent) lives in: its document, its
/// scroll position and the overlay surfaces the agent draws on.
pub trait PageHost {
    fn document(&self) -> &PageDocument;
    fn viewport(&self) -> Viewport;
    fn scroll_by(&mut self, pixels: f64);
    /// Leaves for `url`. The agent is torn down right after.
    fn navigate(&mut self, url: &str, now_ms: f64);
    /// Replaces whatever toast is currently showing.
    fn show_toast(&mut self, toast: Toast);
    fn construct_panel(&mut self);
    fn render_panel(&mut self, view: &PanelView, visible: bool);
    fn set_keyboard_capture(&mut self, enabled: bool);
}

/// What a [`SimulatedPage`] saw, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Toast(Toast),
    Navigated { url: String, at_ms: f64 },
    PanelConstructed,
    KeyboardCapture(bool),
}

/// In-memory page with a fixed content height.
#[derive(Debug)]
pub struct SimulatedPage {
    document: PageDocument,
    viewport: Viewport,
    panel: Option<(PanelView, bool)>,
    keyboard_capture: bool,
    events: Vec<HostEvent>,
}

impl SimulatedPage {
    pub fn new(document: PageDocument, viewport_height: f64, content_height: f64) -> Self {
        Self {
            document,
            viewport: Viewport::new(0.0, viewport_height, content_height),
            panel: None,
            keyboard_capture: false,
            events: Vec::new(),
        }
    }

    pub fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.events.iter().filter_map(|event| match event {
            HostEvent::Toast(toast) => Some(toast),
            _ => None,
        })
    }

    /// The toast on screen at `now_ms`, if any.
    pub fn active_toast(&self, now_ms: f64) -> Option<&Toast> {
        self.toasts()
            .last()
            .filter(|toast| toast.is_visible_at(now_ms))
    }

    pub fn navigated_to(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            HostEvent::Navigated { url, .. } => Some(url.as_str()),
            _ => None,
        })
    }

    /// Last rendered panel contents and whether the panel is visible.
    pub fn panel(&self) -> Option<&(PanelView, bool)> {
        self.panel.as_ref()
    }

    pub fn keyboard_capture(&self) -> bool {
        self.keyboard_capture
    }
}

impl PageHost for SimulatedPage {
    fn document(&self) -> &PageDocument {
        &self.document
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_by(&mut self, pixels: f64) {
        self.viewport = self.viewport.scrolled_by(pixels);
    }

    fn navigate(&mut self, url: &str, now_ms: f64) {
        self.events.push(HostEvent::Navigated {
            url: url.to_string(),
            at_ms: now_ms,
        });
    }

    fn show_toast(&mut self, toast: Toast) {
        self.events.push(HostEvent::Toast(toast));
    }

    fn construct_panel(&mut self) {
        self.events.push(HostEvent::PanelConstructed);
    }

    fn render_panel(&mut self, view: &PanelView, visible: bool) {
        self.panel = Some((view.clone(), visible));
    }

    fn set_keyboard_capture(&mut self, enabled: bool) {
        self.keyboard_capture = enabled;
        self.events.push(HostEvent::KeyboardCapture(enabled));
    }
}
