use std::sync::Arc;

use mscroller_app::{AgentStores, HostEvent, PageAgent, ProtocolError, RunOutcome, Scheduler, SimulatedPage};
use mscroller_core::protocol::{Request, Response};
use mscroller_core::{AgentConfig, Key, KeyInput, Settings, SpeedProfile};
use mscroller_engine::{
    MemorySessionStorage, MemoryStore, PageDocument, PageSessionStorage, SettingsStore, StatsStore,
    CONTINUE_KEY,
};
use pretty_assertions::assert_eq;

const CHAPTER_1: &str = "https://reader.example/series/solo/chapter-1";
const CHAPTER_2: &str = "https://reader.example/series/solo/chapter-2";
const EPOCH_MS: i64 = 1_700_000_000_000;

struct Fixture {
    settings: MemoryStore,
    stats: MemoryStore,
    session: MemorySessionStorage,
}

impl Fixture {
    fn new() -> Self {
        agent_logging::initialize_for_tests();
        Self {
            settings: MemoryStore::new(),
            stats: MemoryStore::new(),
            session: MemorySessionStorage::new(),
        }
    }

    fn stores(&self) -> AgentStores {
        AgentStores {
            settings: Arc::new(self.settings.clone()),
            stats: Arc::new(self.stats.clone()),
            session: Arc::new(self.session.clone()),
        }
    }

    fn settings_store(&self) -> SettingsStore {
        SettingsStore::new(Arc::new(self.settings.clone()), SpeedProfile::Standard)
    }

    fn stats_store(&self) -> StatsStore {
        StatsStore::new(Arc::new(self.stats.clone()), 100)
    }

    fn agent(&self, url: &str, next: Option<&str>, content_height: f64) -> PageAgent<SimulatedPage> {
        let link = next
            .map(|href| format!(r#"<a rel="next" href="{href}">Next</a>"#))
            .unwrap_or_default();
        let html = format!(
            r#"<html><head><title>Solo Leveling - Chapter 1</title></head>
               <body><h1 class="manga-title">Solo Leveling</h1>{link}</body></html>"#
        );
        let page = SimulatedPage::new(PageDocument::parse(url, &html).unwrap(), 900.0, content_height);
        PageAgent::start(
            page,
            self.stores(),
            AgentConfig::default(),
            Scheduler::starting_at(EPOCH_MS),
        )
    }
}

fn toast_texts(agent: &PageAgent<SimulatedPage>) -> Vec<String> {
    agent.host().toasts().map(|toast| toast.text.clone()).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
}

#[test]
fn toggling_twice_leaves_nothing_scheduled() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 50_000.0);

    agent.toggle();
    assert_eq!(agent.run_for(500.0), RunOutcome::TimeLimit);
    let scrolled = agent.host().scroll_y();
    assert!(scrolled > 0.0);

    agent.toggle();
    assert!(!agent.state().is_scrolling());
    assert!(!agent.scheduler().has_pending_frame());
    assert_eq!(agent.run_for(5_000.0), RunOutcome::Idle);
    assert_eq!(agent.host().scroll_y(), scrolled);
}

#[test]
fn bottom_of_chapter_counts_down_then_navigates() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, Some(CHAPTER_2), 2_000.0);

    agent.toggle();
    let outcome = agent.run_for(60_000.0);
    assert_eq!(outcome, RunOutcome::Navigated(CHAPTER_2.to_string()));
    assert!(agent.is_closed());

    assert_eq!(
        toast_texts(&agent),
        vec!["Next chapter in 3...", "Next chapter in 2...", "Next chapter in 1..."]
    );
    let shown: Vec<f64> = agent.host().toasts().map(|toast| toast.shown_at_ms).collect();
    assert_close(shown[1] - shown[0], 1000.0);
    assert_close(shown[2] - shown[1], 1000.0);
    let navigated_at = agent
        .host()
        .events()
        .iter()
        .find_map(|event| match event {
            HostEvent::Navigated { at_ms, .. } => Some(*at_ms),
            _ => None,
        })
        .unwrap();
    assert_close(navigated_at - shown[2], 1000.0);

    assert_eq!(fixture.session.get_item(CONTINUE_KEY).as_deref(), Some("1"));
    let stats = fixture.stats_store().snapshot().unwrap();
    assert_eq!(stats.chapters_read, 1);
    assert_eq!(stats.total_time, (navigated_at / 1000.0).floor() as u64);
    assert_eq!(stats.history.len(), 1);
    assert_eq!(stats.history[0].title, "Solo Leveling");
    assert_eq!(stats.history[0].chapter, "1");
    assert_eq!(stats.history[0].site, "reader.example");
    assert!(stats.history[0].timestamp >= EPOCH_MS);
}

#[test]
fn next_page_continues_after_its_own_countdown() {
    let fixture = Fixture::new();
    fixture.settings_store().save_next_delay(0).unwrap();

    let mut first = fixture.agent(CHAPTER_1, Some(CHAPTER_2), 1_500.0);
    first.toggle();
    assert_eq!(
        first.run_for(60_000.0),
        RunOutcome::Navigated(CHAPTER_2.to_string())
    );
    assert!(toast_texts(&first).is_empty());

    let mut second = fixture.agent(CHAPTER_2, None, 50_000.0);
    assert_eq!(fixture.session.get_item(CONTINUE_KEY), None);
    assert!(second.host().events().contains(&HostEvent::PanelConstructed));
    assert!(second.host().keyboard_capture());
    assert!(!second.state().is_scrolling());

    second.run_for(1_500.0);
    assert!(!second.state().is_scrolling());
    second.run_for(600.0);
    assert!(second.state().is_scrolling());
    assert_eq!(
        toast_texts(&second),
        vec!["Continuing in 2...", "Continuing in 1..."]
    );

    // Without a token the next load starts idle and quiet.
    let third = fixture.agent(CHAPTER_2, None, 50_000.0);
    assert!(third.host().events().is_empty());
}

#[test]
fn speed_requests_are_clamped_and_steps_persisted() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 50_000.0);

    let response = agent
        .handle_request(Request::UpdateSpeed { speed: 99 })
        .unwrap();
    assert_eq!(response, Response::ack());
    assert_eq!(agent.info().speed, 50);

    agent.step_speed(-100);
    assert_eq!(agent.info().speed, 1);
    assert_eq!(fixture.settings_store().load().unwrap().speed, 1);
}

#[test]
fn settings_written_elsewhere_reach_the_agent() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 50_000.0);

    fixture
        .settings_store()
        .save(Settings {
            speed: 20,
            auto_next: false,
            next_delay: 5,
        })
        .unwrap();
    agent.run_for(10.0);

    assert_eq!(agent.state().settings().speed, 20);
    assert!(!agent.state().settings().auto_next);
    assert_eq!(agent.state().settings().next_delay, 5);
}

#[test]
fn auto_next_off_parks_at_the_bottom() {
    let fixture = Fixture::new();
    fixture.settings_store().save_auto_next(false).unwrap();
    let mut agent = fixture.agent(CHAPTER_1, Some(CHAPTER_2), 1_500.0);

    agent.toggle();
    assert_eq!(agent.run_for(20_000.0), RunOutcome::TimeLimit);
    assert_eq!(agent.host().scroll_y(), 600.0);
    assert_eq!(agent.host().navigated_to(), None);
    assert_eq!(fixture.session.get_item(CONTINUE_KEY), None);
}

#[test]
fn missing_next_link_is_reported_once() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 1_500.0);

    agent.toggle();
    agent.run_for(20_000.0);
    assert!(!agent.state().is_scrolling());
    assert_eq!(toast_texts(&agent), vec!["No next chapter found"]);
    let now = agent.scheduler().now_ms();
    assert!(agent.host().active_toast(now).is_some());
    assert!(agent.host().active_toast(now + 3_000.0).is_none());
}

#[test]
fn keyboard_shortcuts_follow_the_panel() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 50_000.0);

    agent.key_pressed(KeyInput::plain(Key::Space));
    assert!(!agent.state().is_scrolling());

    agent.show_panel();
    agent.key_pressed(KeyInput::plain(Key::Space));
    assert!(agent.state().is_scrolling());
    agent.key_pressed(KeyInput::shifted(Key::ArrowUp));
    assert_eq!(toast_texts(&agent), vec!["Speed: 6"]);
    assert_eq!(fixture.settings_store().load().unwrap().speed, 6);

    agent.close_panel();
    assert!(!agent.host().keyboard_capture());
    agent.key_pressed(KeyInput::plain(Key::Space));
    assert!(agent.state().is_scrolling());
}

#[test]
fn panel_shows_session_time_and_title() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 50_000.0);
    agent.show_panel();
    agent.run_for(65_000.0);

    let (panel, visible) = agent.host().panel().cloned().unwrap();
    assert!(visible);
    assert_eq!(panel.title, "Solo Leveling");
    assert_eq!(panel.chapter, "1");
    assert_eq!(panel.elapsed, "1:05");
    assert_eq!(panel.play_label(), "Start");
}

#[test]
fn unload_flushes_session_time_and_detaches() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 50_000.0);
    agent.toggle();
    agent.run_for(42_500.0);
    agent.unload();
    agent.unload();

    assert_eq!(fixture.stats_store().snapshot().unwrap().total_time, 42);
    assert!(matches!(
        agent.handle_request(Request::GetInfo),
        Err(ProtocolError::Detached)
    ));
}

#[test]
fn torn_down_stores_do_not_stop_navigation() {
    let fixture = Fixture::new();
    fixture.settings_store().save_next_delay(0).unwrap();
    fixture.stats.set_available(false);

    let mut agent = fixture.agent(CHAPTER_1, Some(CHAPTER_2), 1_500.0);
    agent.toggle();
    assert_eq!(
        agent.run_for(60_000.0),
        RunOutcome::Navigated(CHAPTER_2.to_string())
    );
}

#[test]
fn json_requests_round_the_dispatch_table() {
    let fixture = Fixture::new();
    let mut agent = fixture.agent(CHAPTER_1, None, 50_000.0);

    let toggled = agent.handle_message(r#"{"type":"toggle"}"#).unwrap();
    assert_eq!(toggled, r#"{"scrolling":true}"#);

    let info: serde_json::Value =
        serde_json::from_str(&agent.handle_message(r#"{"type":"getInfo"}"#).unwrap()).unwrap();
    assert_eq!(info["title"], "Solo Leveling");
    assert_eq!(info["chapter"], "1");
    assert_eq!(info["sessionTime"], 0);

    assert!(matches!(
        agent.handle_message(r#"{"type":"selfDestruct"}"#),
        Err(ProtocolError::Malformed(_))
    ));
}
