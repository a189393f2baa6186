use std::collections::VecDeque;
use std::sync::mpsc;

use agent_logging::{agent_debug, agent_info, agent_warn};
use mscroller_core::protocol::{InfoResponse, Request, Response};
use mscroller_core::{
    update, AgentConfig, AgentState, Effect, KeyInput, Msg, PanelState, PanelView, SettingsChange,
};
use mscroller_engine::heuristics::{chapter_id, find_next_link, find_prev_link, title};
use mscroller_engine::{visited_chapter, SubscriptionId};

use crate::effects::{AgentStores, StoreEffects};
use crate::host::{PageHost, Toast};
use crate::messaging::{AgentPresence, ProtocolError};
use crate::scheduler::{Callback, Scheduler};

/// Why [`PageAgent::run_until`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The agent navigated away and has shut down.
    Navigated(String),
    /// The agent was unloaded without navigating.
    Closed,
    /// Nothing left to wait for.
    Idle,
    TimeLimit,
}

/// The per-page runtime: owns one [`AgentState`], feeds it page events and
/// carries out the effects it asks for.
pub struct PageAgent<H: PageHost> {
    state: AgentState,
    host: H,
    stores: StoreEffects,
    scheduler: Scheduler,
    settings_rx: mpsc::Receiver<SettingsChange>,
    subscription: Option<SubscriptionId>,
    presence: Option<AgentPresence>,
    leaving_for: Option<String>,
    closed: bool,
}

impl<H: PageHost> PageAgent<H> {
    /// Boots an agent on a freshly loaded page: subscribes to settings,
    /// loads them, then consumes the continuation token.
    pub fn start(host: H, stores: AgentStores, config: AgentConfig, scheduler: Scheduler) -> Self {
        let stores = StoreEffects::new(stores, &config);
        let (settings_tx, settings_rx) = mpsc::channel();
        let subscription = match stores.settings().subscribe(move |change| {
            let _ = settings_tx.send(change);
        }) {
            Ok(id) => Some(id),
            Err(err) => {
                agent_warn!("settings subscription failed: {}", err);
                None
            }
        };

        let mut agent = Self {
            state: AgentState::new(config),
            host,
            stores,
            scheduler,
            settings_rx,
            subscription,
            presence: None,
            leaving_for: None,
            closed: false,
        };

        if let Some(settings) = agent.stores.load_settings() {
            agent.dispatch(Msg::SettingsLoaded(settings));
        }
        let continued = agent.stores.consume_continuation();
        let xml_document = agent.host.document().is_xml();
        agent.dispatch(Msg::PageLoaded {
            now_ms: agent.scheduler.now_ms(),
            continued,
            xml_document,
        });
        agent_info!("page agent ready on {}", agent.host.document().href());
        agent
    }

    /// Keeps `presence` alive until the agent shuts down.
    pub fn with_presence(mut self, presence: AgentPresence) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Play/stop button.
    pub fn toggle(&mut self) {
        let now_ms = self.scheduler.now_ms();
        self.interact(Msg::ToggleRequested { now_ms });
    }

    /// Panel +/- buttons.
    pub fn step_speed(&mut self, delta: i32) {
        self.interact(Msg::SpeedStepped { delta });
    }

    pub fn show_panel(&mut self) {
        self.interact(Msg::ShowPanelRequested);
    }

    /// The panel's close control.
    pub fn close_panel(&mut self) {
        self.interact(Msg::PanelClosed);
    }

    pub fn key_pressed(&mut self, input: KeyInput) {
        let now_ms = self.scheduler.now_ms();
        self.interact(Msg::KeyPressed { input, now_ms });
    }

    pub fn next_chapter(&mut self) {
        self.interact(Msg::NextChapterRequested);
    }

    pub fn prev_chapter(&mut self) {
        self.interact(Msg::PrevChapterRequested);
    }

    /// Answers one protocol request.
    pub fn handle_request(&mut self, request: Request) -> Result<Response, ProtocolError> {
        if self.closed {
            return Err(ProtocolError::Detached);
        }
        agent_debug!("request {:?}", request);
        let response = match request {
            Request::Toggle => {
                self.toggle();
                Response::Toggled {
                    scrolling: self.state.is_scrolling(),
                }
            }
            Request::GetInfo => {
                self.pump_settings();
                Response::Info(self.info())
            }
            Request::UpdateSpeed { speed } => {
                self.interact(Msg::SpeedSet { speed });
                Response::ack()
            }
            Request::ShowPanel => {
                self.show_panel();
                Response::ack()
            }
        };
        Ok(response)
    }

    /// [`handle_request`](Self::handle_request) over JSON text.
    pub fn handle_message(&mut self, raw: &str) -> Result<String, ProtocolError> {
        let request: Request = serde_json::from_str(raw)?;
        let response = self.handle_request(request)?;
        Ok(serde_json::to_string(&response)?)
    }

    /// Live snapshot for the popup. Title and chapter are derived afresh.
    pub fn info(&self) -> InfoResponse {
        let document = self.host.document();
        InfoResponse {
            scrolling: self.state.is_scrolling(),
            speed: self.state.settings().speed,
            title: title(document),
            chapter: chapter_id(document.href()).unwrap_or_else(|| "Unknown".to_string()),
            session_time: self.state.session_elapsed_secs(self.scheduler.now_ms()),
        }
    }

    /// Delivers callbacks until `limit_ms` on the page clock, or until the
    /// agent shuts down.
    pub fn run_until(&mut self, limit_ms: f64) -> RunOutcome {
        loop {
            self.pump_settings();
            if self.closed {
                return match &self.leaving_for {
                    Some(url) => RunOutcome::Navigated(url.clone()),
                    None => RunOutcome::Closed,
                };
            }
            if self.scheduler.is_idle() {
                return RunOutcome::Idle;
            }
            match self.scheduler.next_until(limit_ms) {
                Some(callback) => self.deliver(callback),
                None => return RunOutcome::TimeLimit,
            }
        }
    }

    pub fn run_for(&mut self, duration_ms: f64) -> RunOutcome {
        let limit_ms = self.scheduler.now_ms() + duration_ms;
        self.run_until(limit_ms)
    }

    /// Page teardown: stops scrolling, cancels timers and flushes the
    /// session time. Safe to call more than once.
    pub fn unload(&mut self) {
        if self.closed {
            return;
        }
        let now_ms = self.scheduler.now_ms();
        self.process(Msg::PageUnloading { now_ms });
        self.closed = true;
        if let Some(id) = self.subscription.take() {
            self.stores.settings().unsubscribe(id);
        }
        self.presence = None;
        agent_info!("page agent unloaded after {:.0}ms", now_ms);
    }

    fn interact(&mut self, msg: Msg) {
        self.pump_settings();
        self.dispatch(msg);
    }

    fn pump_settings(&mut self) {
        while let Ok(change) = self.settings_rx.try_recv() {
            self.dispatch(Msg::SettingsChanged(change));
        }
    }

    fn deliver(&mut self, callback: Callback) {
        let msg = match callback {
            Callback::Frame {
                frame,
                timestamp_ms,
            } => Msg::FrameDelivered {
                frame,
                timestamp_ms,
                viewport: self.host.viewport(),
            },
            Callback::Interval { timer } => Msg::TimerFired {
                timer,
                now_ms: self.scheduler.now_ms(),
            },
        };
        self.dispatch(msg);
    }

    fn dispatch(&mut self, msg: Msg) {
        if self.closed {
            return;
        }
        self.process(msg);
        if self.leaving_for.is_some() {
            self.unload();
        }
    }

    /// Runs `msg` and every message its effects produce, then redraws.
    fn process(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            for effect in effects {
                if let Some(follow_up) = self.apply(effect) {
                    inbox.push_back(follow_up);
                }
            }
        }
        self.render_if_dirty();
    }

    fn apply(&mut self, effect: Effect) -> Option<Msg> {
        let now_ms = self.scheduler.now_ms();
        match effect {
            Effect::RequestFrame { frame } => self.scheduler.request_frame(frame),
            Effect::CancelFrame { frame } => {
                self.scheduler.cancel_frame(frame);
            }
            Effect::ScrollBy { pixels } => self.host.scroll_by(pixels),
            Effect::StartInterval { timer, period_ms } => {
                self.scheduler.start_interval(timer, period_ms)
            }
            Effect::CancelInterval { timer } => {
                self.scheduler.cancel_interval(timer);
            }
            Effect::ShowToast { text } => {
                agent_debug!("toast: {}", text);
                self.host.show_toast(Toast {
                    text,
                    shown_at_ms: now_ms,
                    duration_ms: self.state.config().toast_duration_ms,
                });
            }
            Effect::ConstructPanel => self.host.construct_panel(),
            Effect::SetKeyboardCapture { enabled } => self.host.set_keyboard_capture(enabled),
            Effect::ResolveNextChapter => {
                let document = self.host.document();
                return Some(Msg::NextChapterResolved {
                    url: find_next_link(document),
                    leaving: visited_chapter(document),
                });
            }
            Effect::ResolvePrevChapter => {
                let document = self.host.document();
                return Some(Msg::PrevChapterResolved {
                    url: find_prev_link(document),
                    leaving: visited_chapter(document),
                });
            }
            Effect::RecordChapterRead { visit } => self
                .stores
                .record_chapter_read(visit, self.scheduler.epoch_ms()),
            Effect::RecordVisit { visit } => {
                self.stores.record_visit(&visit, self.scheduler.epoch_ms())
            }
            Effect::WriteContinuationToken => self.stores.write_continuation(),
            Effect::Navigate { url } => {
                agent_info!("navigating to {}", url);
                self.host.navigate(&url, now_ms);
                self.leaving_for = Some(url);
            }
            Effect::PersistSpeed { speed } => self.stores.persist_speed(speed),
            Effect::FlushSessionTime { seconds } => self.stores.flush_session_time(seconds),
        }
        None
    }

    fn render_if_dirty(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        let view = self.state.view();
        if view.panel == PanelState::Absent {
            return;
        }
        let document = self.host.document();
        let panel = PanelView::new(
            &view,
            title(document),
            chapter_id(document.href()),
            self.state.session_elapsed_secs(self.scheduler.now_ms()),
        );
        self.host
            .render_panel(&panel, view.panel == PanelState::Visible);
    }
}

impl<H: PageHost> Drop for PageAgent<H> {
    fn drop(&mut self) {
        self.unload();
    }
}
