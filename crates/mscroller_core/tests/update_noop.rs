use mscroller_core::{update, AgentState, Msg};

#[test]
fn noop_leaves_state_untouched() {
    let state = AgentState::default();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn empty_settings_change_is_noop() {
    let state = AgentState::default();
    let (next, effects) = update(state.clone(), Msg::SettingsChanged(Default::default()));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
