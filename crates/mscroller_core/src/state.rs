use crate::countdown::{Countdown, CountdownPurpose, TimerId};
use crate::view_model::{AgentViewModel, CountdownView};
use crate::{AgentConfig, ScrollEngine, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    /// Not constructed yet.
    #[default]
    Absent,
    Hidden,
    Visible,
}

/// Everything one page load knows about its reading session. Created when
/// the agent starts and dropped when the page unloads.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    config: AgentConfig,
    settings: Settings,
    scroll: ScrollEngine,
    session_start_ms: f64,
    panel: PanelState,
    panel_supported: bool,
    keyboard_enabled: bool,
    countdown: Option<Countdown>,
    clock_timer: Option<TimerId>,
    issued_timers: TimerId,
    dirty: bool,
}

impl AgentState {
    pub fn new(config: AgentConfig) -> Self {
        let settings = Settings::defaults_for(config.profile);
        Self {
            config,
            settings,
            scroll: ScrollEngine::new(),
            session_start_ms: 0.0,
            panel: PanelState::Absent,
            panel_supported: true,
            keyboard_enabled: false,
            countdown: None,
            clock_timer: None,
            issued_timers: 0,
            dirty: false,
        }
    }

    pub fn view(&self) -> AgentViewModel {
        AgentViewModel {
            scrolling: self.scroll.is_scrolling(),
            speed: self.settings.speed,
            max_speed: self.config.profile.max_speed(),
            auto_next: self.settings.auto_next,
            next_delay: self.settings.next_delay,
            panel: self.panel,
            keyboard_enabled: self.keyboard_enabled,
            countdown: self.countdown.as_ref().map(|countdown| CountdownView {
                next_chapter: matches!(countdown.purpose(), CountdownPurpose::NextChapter { .. }),
                remaining: countdown.remaining(),
            }),
            dirty: self.dirty,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_scrolling()
    }

    pub fn pending_frame(&self) -> Option<crate::FrameId> {
        self.scroll.pending_frame()
    }

    pub fn session_elapsed_secs(&self, now_ms: f64) -> u64 {
        ((now_ms - self.session_start_ms).max(0.0) / 1000.0).floor() as u64
    }

    /// Returns whether the view changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub(crate) fn scroll_mut(&mut self) -> &mut ScrollEngine {
        &mut self.scroll
    }

    pub(crate) fn scroll_parts(&mut self) -> (&mut ScrollEngine, &Settings, &AgentConfig) {
        (&mut self.scroll, &self.settings, &self.config)
    }

    pub(crate) fn begin_session(&mut self, now_ms: f64, panel_supported: bool) {
        self.session_start_ms = now_ms;
        self.panel_supported = panel_supported;
    }

    pub(crate) fn panel(&self) -> PanelState {
        self.panel
    }

    pub(crate) fn panel_supported(&self) -> bool {
        self.panel_supported
    }

    pub(crate) fn set_panel(&mut self, panel: PanelState) {
        if self.panel != panel {
            self.panel = panel;
            self.dirty = true;
        }
    }

    pub(crate) fn keyboard_enabled(&self) -> bool {
        self.keyboard_enabled
    }

    pub(crate) fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard_enabled = enabled;
    }

    pub(crate) fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    pub(crate) fn countdown_mut(&mut self) -> Option<&mut Countdown> {
        self.countdown.as_mut()
    }

    pub(crate) fn set_countdown(&mut self, countdown: Countdown) -> Option<Countdown> {
        self.dirty = true;
        self.countdown.replace(countdown)
    }

    pub(crate) fn take_countdown(&mut self) -> Option<Countdown> {
        self.dirty = true;
        self.countdown.take()
    }

    pub(crate) fn clock_timer(&self) -> Option<TimerId> {
        self.clock_timer
    }

    pub(crate) fn set_clock_timer(&mut self, timer: TimerId) {
        self.clock_timer = Some(timer);
    }

    pub(crate) fn take_clock_timer(&mut self) -> Option<TimerId> {
        self.clock_timer.take()
    }

    pub(crate) fn allocate_timer(&mut self) -> TimerId {
        self.issued_timers += 1;
        self.issued_timers
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}
