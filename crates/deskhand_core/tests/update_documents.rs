use std::sync::Once;

use deskhand_core::{
    update, AppState, DocumentRow, DocumentStatus, Effect, Msg, RequestSeq, NO_DOCUMENTS,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn row(id: u64, filename: &str) -> DocumentRow {
    DocumentRow {
        id,
        filename: filename.to_string(),
        category: None,
        status: DocumentStatus::Completed,
        size_bytes: 4096,
        processed_at: Some("2026-08-06T10:00:00".to_string()),
    }
}

fn list_seq(effects: &[Effect]) -> RequestSeq {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::LoadDocuments { seq, .. } => Some(*seq),
            _ => None,
        })
        .expect("load documents effect")
}

/// State with three rendered rows.
fn loaded_state() -> AppState {
    let (state, effects) = update(
        AppState::new(),
        Msg::Started {
            channel: "default".into(),
        },
    );
    let seq = list_seq(&effects);
    let (state, _) = update(
        state,
        Msg::DocumentsLoaded {
            seq,
            result: Ok(vec![row(1, "a.pdf"), row(2, "b.pdf"), row(3, "c.pdf")]),
        },
    );
    state
}

#[test]
fn empty_list_renders_the_placeholder() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::Started {
            channel: "default".into(),
        },
    );
    let seq = list_seq(&effects);
    let (state, _) = update(
        state,
        Msg::DocumentsLoaded {
            seq,
            result: Ok(Vec::new()),
        },
    );

    let view = state.view();
    assert!(view.documents.rows.is_empty());
    assert_eq!(view.documents.placeholder, Some(NO_DOCUMENTS));
}

#[test]
fn select_all_selects_exactly_the_rendered_rows() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::SelectAllToggled(true));
    let view = state.view();
    assert_eq!(view.documents.selected_count, 3);
    assert!(view.documents.rows.iter().all(|r| r.selected));
    assert!(view.documents.batch_enabled);

    let (state, _) = update(state, Msg::SelectAllToggled(false));
    let view = state.view();
    assert_eq!(view.documents.selected_count, 0);
    assert!(!view.documents.batch_enabled);
}

#[test]
fn toggling_an_unrendered_id_is_ignored() {
    init_logging();
    let (state, effects) = update(loaded_state(), Msg::SelectionToggled(99));
    assert!(effects.is_empty());
    assert_eq!(state.view().documents.selected_count, 0);
}

#[test]
fn reloading_prunes_the_selection_to_rendered_rows() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::SelectAllToggled(true));

    // A narrower search comes back with only one of the selected rows.
    let (state, effects) = update(state, Msg::SearchChanged("b".into()));
    let seq = list_seq(&effects);
    let (state, _) = update(
        state,
        Msg::DocumentsLoaded {
            seq,
            result: Ok(vec![row(2, "b.pdf")]),
        },
    );

    let view = state.view();
    assert_eq!(view.documents.selected_count, 1);
    assert!(view.documents.rows[0].selected);
}

#[test]
fn stale_list_response_is_dropped() {
    init_logging();
    let state = loaded_state();

    // Two searches in a row; the first response arrives last.
    let (state, first) = update(state, Msg::SearchChanged("a".into()));
    let first_seq = list_seq(&first);
    let (state, second) = update(state, Msg::SearchChanged("ab".into()));
    let second_seq = list_seq(&second);
    assert!(second_seq > first_seq);

    let (state, _) = update(
        state,
        Msg::DocumentsLoaded {
            seq: second_seq,
            result: Ok(vec![row(7, "ab.pdf")]),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::DocumentsLoaded {
            seq: first_seq,
            result: Ok(vec![row(1, "a.pdf"), row(7, "ab.pdf")]),
        },
    );

    // The superseded response never overwrites the newer list.
    let view = state.view();
    assert_eq!(view.documents.rows.len(), 1);
    assert_eq!(view.documents.rows[0].filename, "ab.pdf");
    // And it does not re-dirty the view.
    assert!(state.consume_dirty());
    let (mut state, _) = update(
        state,
        Msg::DocumentsLoaded {
            seq: first_seq,
            result: Ok(Vec::new()),
        },
    );
    assert!(!state.consume_dirty());
}

#[test]
fn batch_export_with_empty_selection_is_never_sent() {
    init_logging();
    let (_, effects) = update(loaded_state(), Msg::BatchExportClicked);
    assert!(effects.is_empty());
}

#[test]
fn batch_export_sends_the_selection_once() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::SelectAllToggled(true));
    let (state, effects) = update(state, Msg::BatchExportClicked);
    assert_eq!(effects, vec![Effect::ExportBatch { ids: vec![1, 2, 3] }]);
    assert!(state.view().documents.busy);

    // Buttons are disabled while the request is in flight.
    let (state, effects) = update(state, Msg::BatchExportClicked);
    assert!(effects.is_empty());
    let (_, effects) = update(state, Msg::BatchSummaryClicked);
    assert!(effects.is_empty());
}

#[test]
fn batch_completion_clears_the_selection_and_refreshes() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::SelectAllToggled(true));
    let (state, _) = update(state, Msg::BatchExportClicked);
    let (state, effects) = update(
        state,
        Msg::BatchExportFinished(Ok("downloads/export_20260806.zip".into())),
    );

    assert!(effects.iter().any(|e| matches!(e, Effect::LoadDocuments { .. })));
    assert!(effects.contains(&Effect::LoadStatistics));
    let view = state.view();
    assert_eq!(view.documents.selected_count, 0);
    assert!(!view.documents.busy);
    assert!(view
        .documents
        .last_action
        .unwrap()
        .contains("export_20260806.zip"));
}

#[test]
fn batch_failure_keeps_the_selection_for_a_retry() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::SelectAllToggled(true));
    let (state, _) = update(state, Msg::BatchSummaryClicked);
    let (state, effects) = update(state, Msg::BatchSummaryFinished(Err("502".into())));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.documents.selected_count, 3);
    assert!(!view.documents.busy);
    assert_eq!(view.documents.error, Some("502".to_string()));
}

#[test]
fn deleting_a_document_refreshes_list_and_statistics() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::SelectAllToggled(true));
    let (state, effects) = update(state, Msg::DeleteDocumentClicked(2));
    assert_eq!(effects, vec![Effect::DeleteDocument { id: 2 }]);

    let (state, effects) = update(
        state,
        Msg::DocumentDeleted {
            id: 2,
            result: Ok(()),
        },
    );
    assert!(effects.iter().any(|e| matches!(e, Effect::LoadDocuments { .. })));
    assert!(effects.contains(&Effect::LoadStatistics));
    let view = state.view();
    assert_eq!(view.documents.rows.len(), 2);
    assert_eq!(view.documents.selected_count, 2);
}

#[test]
fn list_failure_surfaces_inline() {
    init_logging();
    let (state, effects) = update(loaded_state(), Msg::RefreshClicked);
    let seq = list_seq(&effects);
    let (state, _) = update(
        state,
        Msg::DocumentsLoaded {
            seq,
            result: Err("http status 500: internal error".into()),
        },
    );

    let view = state.view();
    assert_eq!(
        view.documents.error,
        Some("http status 500: internal error".to_string())
    );
    // The previous rows keep rendering.
    assert_eq!(view.documents.rows.len(), 3);
}

#[test]
fn ingest_requires_paths_and_reloads_on_completion() {
    init_logging();
    let (state, effects) = update(loaded_state(), Msg::IngestFiles(Vec::new()));
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::IngestFiles(vec!["scan1.pdf".into(), "scan2.pdf".into()]),
    );
    assert_eq!(
        effects,
        vec![Effect::IngestFiles {
            paths: vec!["scan1.pdf".to_string(), "scan2.pdf".to_string()]
        }]
    );

    let (state, effects) = update(
        state,
        Msg::IngestFinished(Ok(deskhand_core::BatchOutcome {
            succeeded: 2,
            failed: 0,
            errors: Vec::new(),
        })),
    );
    assert!(effects.iter().any(|e| matches!(e, Effect::LoadDocuments { .. })));
    assert!(effects.contains(&Effect::LoadStatistics));
    assert!(state.view().documents.last_action.unwrap().contains("2"));
}
