use assistant_core::{update, AppState, Msg, Panel};

#[test]
fn dismissing_empty_panels_changes_nothing() {
    let mut state = AppState::new();
    assert!(!state.consume_dirty());

    for panel in [Panel::Upload, Panel::Report, Panel::Chat] {
        let (next, effects) = update(state.clone(), Msg::NoticeDismissed(panel));
        assert_eq!(next, state);
        assert!(effects.is_empty());
        state = next;
    }
}

#[test]
fn expiry_for_unknown_notice_changes_nothing() {
    let state = AppState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::NoticeExpired {
            panel: Panel::Chat,
            notice_id: 99,
        },
    );

    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn fresh_state_is_not_ready() {
    let view = AppState::new().view();

    assert!(!view.is_ready);
    assert!(!view.chat.input_enabled);
    assert!(!view.report.can_generate);
    assert_eq!(view.upload.selection_label, "Choose Files");
    assert_eq!(view.chat.placeholder, "Upload documents first...");
}
