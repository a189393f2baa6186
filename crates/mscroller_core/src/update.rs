use agent_logging::{agent_debug, agent_info};

use crate::countdown::{Countdown, CountdownPurpose, CountdownTick, TICK_MS};
use crate::keyboard::{shortcut_for, Shortcut};
use crate::{AgentState, Effect, FrameStep, Msg, PanelState, VisitedChapter};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AgentState, msg: Msg) -> (AgentState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded {
            now_ms,
            continued,
            xml_document,
        } => {
            state.begin_session(now_ms, !xml_document);
            if continued {
                agent_info!("continuing from previous chapter");
                let mut effects = show_panel(&mut state);
                effects.extend(start_continue_countdown(&mut state, now_ms));
                effects
            } else {
                Vec::new()
            }
        }
        Msg::SettingsLoaded(settings) => {
            let profile = state.config().profile;
            *state.settings_mut() = settings.clamped(profile);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SettingsChanged(change) => {
            if change.is_empty() {
                return (state, Vec::new());
            }
            agent_debug!("settings changed: {:?}", change);
            let profile = state.config().profile;
            let settings = state.settings_mut();
            change.apply_to(settings);
            *settings = settings.clamped(profile);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ToggleRequested { now_ms } => toggle(&mut state, now_ms),
        Msg::FrameDelivered {
            frame,
            timestamp_ms,
            viewport,
        } => {
            let (scroll, settings, config) = state.scroll_parts();
            let velocity = config.profile.velocity(settings.speed);
            match scroll.step(frame, timestamp_ms, viewport, velocity, settings.auto_next, config) {
                FrameStep::Stale => Vec::new(),
                FrameStep::Advanced { pixels, next_frame } => vec![
                    Effect::ScrollBy { pixels },
                    Effect::RequestFrame { frame: next_frame },
                ],
                FrameStep::ReachedBottom { pixels } => {
                    agent_info!("reached end of content");
                    state.mark_dirty();
                    let mut effects = vec![Effect::ScrollBy { pixels }];
                    effects.extend(request_next(&state));
                    effects
                }
            }
        }
        Msg::TimerFired { timer, now_ms } => on_timer(&mut state, timer, now_ms),
        Msg::SpeedStepped { delta } => {
            let speed = step_speed(&mut state, delta);
            vec![Effect::PersistSpeed { speed }]
        }
        Msg::SpeedSet { speed } => {
            let speed = state.config().profile.clamp_speed(speed);
            state.settings_mut().speed = speed;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ShowPanelRequested => show_panel(&mut state),
        Msg::PanelClosed => {
            if state.panel() == PanelState::Absent {
                return (state, Vec::new());
            }
            state.set_panel(PanelState::Hidden);
            set_keyboard(&mut state, false)
        }
        Msg::KeyPressed { input, now_ms } => {
            if !state.keyboard_enabled() {
                return (state, Vec::new());
            }
            match shortcut_for(input) {
                Some(shortcut) => on_shortcut(&mut state, shortcut, now_ms),
                None => Vec::new(),
            }
        }
        Msg::NextChapterRequested => request_next(&state),
        Msg::PrevChapterRequested => vec![Effect::ResolvePrevChapter],
        Msg::NextChapterResolved { url, leaving } => on_next_resolved(&mut state, url, leaving),
        Msg::PrevChapterResolved { url, leaving } => match url {
            Some(url) => {
                agent_info!("previous chapter: {}", url);
                let mut effects = Vec::with_capacity(2);
                if state.config().profile.tracks_history() {
                    effects.push(Effect::RecordVisit { visit: leaving });
                }
                effects.push(Effect::Navigate { url });
                effects
            }
            None => vec![toast("No previous chapter found")],
        },
        Msg::PageUnloading { now_ms } => {
            let mut effects = stop(&mut state);
            if let Some(countdown) = state.take_countdown() {
                effects.push(Effect::CancelInterval {
                    timer: countdown.timer(),
                });
            }
            if let Some(timer) = state.take_clock_timer() {
                effects.push(Effect::CancelInterval { timer });
            }
            effects.extend(set_keyboard(&mut state, false));
            effects.push(Effect::FlushSessionTime {
                seconds: state.session_elapsed_secs(now_ms),
            });
            effects
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn toast(text: impl Into<String>) -> Effect {
    Effect::ShowToast { text: text.into() }
}

fn start(state: &mut AgentState, now_ms: f64) -> Vec<Effect> {
    match state.scroll_mut().start(now_ms) {
        Some(frame) => {
            agent_info!("scrolling started at speed {}", state.settings().speed);
            state.mark_dirty();
            vec![Effect::RequestFrame { frame }]
        }
        None => Vec::new(),
    }
}

fn stop(state: &mut AgentState) -> Vec<Effect> {
    let was_scrolling = state.is_scrolling();
    let pending = state.scroll_mut().stop();
    if was_scrolling {
        agent_info!("scrolling stopped");
        state.mark_dirty();
    }
    pending
        .map(|frame| vec![Effect::CancelFrame { frame }])
        .unwrap_or_default()
}

fn toggle(state: &mut AgentState, now_ms: f64) -> Vec<Effect> {
    if state.is_scrolling() {
        stop(state)
    } else {
        start(state, now_ms)
    }
}

fn step_speed(state: &mut AgentState, delta: i32) -> u32 {
    let profile = state.config().profile;
    let speed = profile.clamp_speed(i64::from(state.settings().speed) + i64::from(delta));
    state.settings_mut().speed = speed;
    state.mark_dirty();
    speed
}

fn set_keyboard(state: &mut AgentState, enabled: bool) -> Vec<Effect> {
    if state.keyboard_enabled() == enabled {
        return Vec::new();
    }
    state.set_keyboard_enabled(enabled);
    vec![Effect::SetKeyboardCapture { enabled }]
}

fn show_panel(state: &mut AgentState) -> Vec<Effect> {
    if !state.panel_supported() {
        return Vec::new();
    }
    let mut effects = Vec::new();
    if state.panel() == PanelState::Absent {
        let timer = state.allocate_timer();
        state.set_clock_timer(timer);
        effects.push(Effect::ConstructPanel);
        effects.push(Effect::StartInterval {
            timer,
            period_ms: TICK_MS,
        });
    }
    state.set_panel(PanelState::Visible);
    effects.extend(set_keyboard(state, true));
    effects
}

fn next_countdown_pending(state: &AgentState) -> bool {
    matches!(
        state.countdown().map(Countdown::purpose),
        Some(CountdownPurpose::NextChapter { .. })
    )
}

fn request_next(state: &AgentState) -> Vec<Effect> {
    if next_countdown_pending(state) {
        agent_debug!("next chapter already counting down");
        return Vec::new();
    }
    vec![Effect::ResolveNextChapter]
}

/// Starts `countdown`, replacing any countdown already running.
fn begin_countdown(state: &mut AgentState, purpose: CountdownPurpose, seconds: u32) -> Vec<Effect> {
    let timer = state.allocate_timer();
    let countdown = Countdown::new(purpose, seconds, timer);
    let text = countdown.message();
    let mut effects = Vec::with_capacity(3);
    if let Some(previous) = state.set_countdown(countdown) {
        effects.push(Effect::CancelInterval {
            timer: previous.timer(),
        });
    }
    effects.push(toast(text));
    effects.push(Effect::StartInterval {
        timer,
        period_ms: TICK_MS,
    });
    effects
}

fn start_continue_countdown(state: &mut AgentState, now_ms: f64) -> Vec<Effect> {
    let seconds = state.config().continue_countdown_secs;
    if seconds == 0 {
        return start(state, now_ms);
    }
    begin_countdown(state, CountdownPurpose::Continue, seconds)
}

fn on_next_resolved(state: &mut AgentState, url: Option<String>, leaving: VisitedChapter) -> Vec<Effect> {
    let Some(url) = url else {
        agent_info!("no next chapter link on page");
        return vec![toast("No next chapter found")];
    };
    if next_countdown_pending(state) {
        return Vec::new();
    }
    agent_info!("next chapter: {}", url);

    let visit = state.config().profile.tracks_history().then_some(leaving);
    let mut effects = vec![
        Effect::RecordChapterRead { visit },
        Effect::WriteContinuationToken,
    ];
    let delay = state.settings().next_delay;
    if delay == 0 {
        if let Some(previous) = state.take_countdown() {
            effects.push(Effect::CancelInterval {
                timer: previous.timer(),
            });
        }
        effects.push(Effect::Navigate { url });
    } else {
        effects.extend(begin_countdown(
            state,
            CountdownPurpose::NextChapter { url },
            delay,
        ));
    }
    effects
}

fn on_timer(state: &mut AgentState, timer: crate::TimerId, now_ms: f64) -> Vec<Effect> {
    if state.clock_timer() == Some(timer) {
        state.mark_dirty();
        return Vec::new();
    }

    let Some(countdown) = state.countdown_mut().filter(|c| c.timer() == timer) else {
        return Vec::new();
    };
    match countdown.tick() {
        CountdownTick::Remaining(_) => {
            let text = countdown.message();
            state.mark_dirty();
            vec![toast(text)]
        }
        CountdownTick::Finished => {
            let Some(finished) = state.take_countdown() else {
                return Vec::new();
            };
            let mut effects = vec![Effect::CancelInterval { timer }];
            match finished.purpose() {
                CountdownPurpose::NextChapter { url } => {
                    effects.push(Effect::Navigate { url: url.clone() });
                }
                CountdownPurpose::Continue => effects.extend(start(state, now_ms)),
            }
            effects
        }
    }
}

fn on_shortcut(state: &mut AgentState, shortcut: Shortcut, now_ms: f64) -> Vec<Effect> {
    match shortcut {
        Shortcut::Toggle => toggle(state, now_ms),
        Shortcut::Faster | Shortcut::Slower => {
            let delta = if shortcut == Shortcut::Faster { 1 } else { -1 };
            let speed = step_speed(state, delta);
            vec![
                Effect::PersistSpeed { speed },
                toast(format!("Speed: {speed}")),
            ]
        }
        Shortcut::Next => request_next(state),
        Shortcut::Previous => vec![Effect::ResolvePrevChapter],
        Shortcut::TogglePanel => {
            match state.panel() {
                PanelState::Visible => state.set_panel(PanelState::Hidden),
                PanelState::Hidden => state.set_panel(PanelState::Visible),
                PanelState::Absent => {}
            }
            Vec::new()
        }
    }
}
