use deskhand_core::{update, AppState, Msg};

#[test]
fn tick_and_noop_change_nothing() {
    let state = AppState::new();
    let before = state.view();

    let (mut state, effects) = update(state, Msg::Tick);
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
    assert!(!state.consume_dirty());

    let (mut state, effects) = update(state, Msg::NoOp);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}
