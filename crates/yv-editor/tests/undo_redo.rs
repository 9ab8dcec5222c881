//! Integration tests: editor session history (yv-editor).
//!
//! Drives `EditorSession` the way the browser bridge does and checks that
//! undo/redo restore both the notes and the emitted YAML.

use pretty_assertions::assert_eq;
use yv_core::factory::NoteBuilder;
use yv_core::id::NoteId;
use yv_core::layout::Container;
use yv_core::model::*;
use yv_core::persist::PersistedState;
use yv_editor::session::{EditAction, EditorSession, HISTORY_DEPTH};

fn sky_session() -> EditorSession {
    let state = PersistedState {
        notes: vec![
            NoteBuilder::new(NoteKind::Plain, NoteId(1))
                .position(50.0, 50.0)
                .size(250.0, 150.0)
                .content("sky")
                .build(),
        ],
        ..PersistedState::default()
    };
    EditorSession::from_persisted(state, Container::default())
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn add_character_then_undo() {
    let mut session = sky_session();
    let before = session.yaml().to_string();
    assert_eq!(before.matches("  - id: ").count(), 1);

    session
        .apply(EditAction::AddNote {
            kind: NoteKind::Character,
        })
        .unwrap();
    let after = session.yaml().to_string();
    assert_eq!(after.matches("  - id: ").count(), 2);
    assert!(after.contains(
        "  - id: 2\n    type: character\n    position: { x: 100, y: 100 }\n    size: { width: 250, height: 150 }\n    content: \"\"\n    characterDetails:\n      gender: \"\"\n      age: \"\"\n"
    ));

    assert!(session.undo());
    assert_eq!(session.yaml(), before);
}

#[test]
fn redo_after_undo_restores_yaml() {
    let mut session = sky_session();
    session
        .apply(EditAction::SetContent {
            id: NoteId(1),
            content: "night sky".into(),
        })
        .unwrap();
    let edited = session.yaml().to_string();
    session.undo();
    assert!(session.yaml().contains("content: \"sky\""));
    assert!(session.redo());
    assert_eq!(session.yaml(), edited);
    assert!(!session.redo());
}

#[test]
fn new_edit_after_undo_drops_redo() {
    let mut session = sky_session();
    session
        .apply(EditAction::AddNote {
            kind: NoteKind::Place,
        })
        .unwrap();
    session.undo();
    assert!(session.can_redo());
    session
        .apply(EditAction::AddNote {
            kind: NoteKind::Item,
        })
        .unwrap();
    assert!(!session.can_redo());
    assert_eq!(session.notes()[1].kind(), NoteKind::Item);
}

#[test]
fn retype_undo_restores_details() {
    let mut session = sky_session();
    session
        .apply(EditAction::SetKind {
            id: NoteId(1),
            kind: NoteKind::Emotion,
        })
        .unwrap();
    session
        .apply(EditAction::SetDetailField {
            id: NoteId(1),
            field: DetailField::Intensity,
            value: "weak".into(),
        })
        .unwrap();
    session
        .apply(EditAction::SetKind {
            id: NoteId(1),
            kind: NoteKind::Memo,
        })
        .unwrap();
    assert_eq!(session.notes()[0].detail, NoteDetail::Memo);
    assert_eq!(session.notes()[0].content, "sky");

    session.undo();
    assert_eq!(
        session.notes()[0].detail,
        NoteDetail::Emotion(EmotionDetails {
            intensity: "weak".into(),
            trigger: String::new(),
        })
    );
}

// ─── Depth limit ────────────────────────────────────────────────────────

#[test]
fn history_depth_is_bounded() {
    let mut session = sky_session();
    for i in 0..(HISTORY_DEPTH + 50) {
        session
            .apply(EditAction::SetContent {
                id: NoteId(1),
                content: format!("edit {i}"),
            })
            .unwrap();
    }
    let mut undos = 0;
    while session.undo() {
        undos += 1;
    }
    assert_eq!(undos, HISTORY_DEPTH - 1);
    assert_eq!(session.notes()[0].content, "edit 50");
}

// ─── Confirmed destructive edits ────────────────────────────────────────

#[test]
fn clear_all_is_undoable() {
    let mut session = sky_session();
    session
        .apply(EditAction::AddNote {
            kind: NoteKind::Event,
        })
        .unwrap();
    session.request(EditAction::ClearAll).unwrap();
    assert_eq!(session.notes().len(), 2);
    session.confirm().unwrap();
    assert!(session.notes().is_empty());
    assert!(session.yaml().ends_with("elements:\n"));

    session.undo();
    assert_eq!(session.notes().len(), 2);
}

#[test]
fn cancelled_delete_leaves_history_untouched() {
    let mut session = sky_session();
    session.request(EditAction::DeleteNote { id: NoteId(1) }).unwrap();
    session.cancel();
    assert!(!session.can_undo());
    assert_eq!(session.notes().len(), 1);
}
