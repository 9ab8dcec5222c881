//! Integration tests: saved state → session → gestures → saved state.

use pretty_assertions::assert_eq;
use yv_core::id::NoteId;
use yv_core::layout::{CanvasSize, Container};
use yv_core::model::*;
use yv_core::persist::PersistedState;
use yv_editor::session::EditorSession;
use yv_editor::shortcuts::{ShortcutAction, ShortcutMap};

const FIXTURE: &str = include_str!("fixtures/saved_state.json");

fn fixture_session() -> EditorSession {
    EditorSession::load_or_default(Some(FIXTURE), Container::default())
}

// ─── Loading ────────────────────────────────────────────────────────────

#[test]
fn restores_fixture() {
    let session = fixture_session();
    let ids: Vec<_> = session.notes().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![NoteId(1), NoteId(4), NoteId(2)]);
    assert_eq!(session.settings().prompt_elements.len(), 1);
    assert_eq!(session.canvas_size(), CanvasSize { width: 800.0, height: 450.0 });
    assert!(!session.can_undo());
}

#[test]
fn malformed_state_falls_back_to_default() {
    let session = EditorSession::load_or_default(Some("{ not json"), Container::default());
    assert_eq!(session.notes(), PersistedState::default().notes.as_slice());
}

#[test]
fn missing_state_uses_default() {
    let session = EditorSession::load_or_default(None, Container::default());
    assert_eq!(session.notes().len(), 1);
    assert_eq!(session.notes()[0].content, "e.g. a blue sky over a green meadow");
}

#[test]
fn small_viewport_clamps_restored_notes() {
    let session = EditorSession::load_or_default(
        Some(FIXTURE),
        Container {
            width: 440.0,
            height: 325.0,
        },
    );
    let canvas = session.canvas_size();
    for note in session.notes() {
        assert!(note.right() <= canvas.width, "note {} overhangs", note.id);
        assert!(note.bottom() <= canvas.height, "note {} overhangs", note.id);
    }
}

// ─── Gestures ───────────────────────────────────────────────────────────

#[test]
fn drag_then_save_and_restore() {
    let mut session = fixture_session();
    let start = session.note(NoteId(2)).map(|n| (n.x, n.y)).unwrap();

    session.begin_drag(NoteId(2), 400.0, 200.0).unwrap();
    session.drag_to(410.0, 210.0).unwrap();
    session.drag_to(450.0, 260.0).unwrap();
    assert!(session.end_drag());

    let moved = session.note(NoteId(2)).unwrap();
    assert_eq!((moved.x, moved.y), (start.0 + 50.0, start.1 + 60.0));

    let json = session.to_persisted().to_json().unwrap();
    let restored = EditorSession::load_or_default(Some(&json), Container::default());
    assert_eq!(restored.notes(), session.notes());

    session.undo();
    let back = session.note(NoteId(2)).unwrap();
    assert_eq!((back.x, back.y), start);
}

#[test]
fn focus_edits_are_one_step() {
    let mut session = fixture_session();
    session.begin_text_edit(NoteId(4)).unwrap();
    for value in ["m", "ma", "male"] {
        session
            .apply(yv_editor::EditAction::SetDetailField {
                id: NoteId(4),
                field: DetailField::Gender,
                value: value.into(),
            })
            .unwrap();
    }
    session.end_text_edit();
    assert!(session.yaml().contains("gender: \"male\""));
    session.undo();
    assert!(session.yaml().contains("gender: \"female\""));
    assert!(!session.can_undo());
}

// ─── Keyboard ───────────────────────────────────────────────────────────

#[test]
fn keyboard_flow() {
    let mut session = fixture_session();
    let press = |s: &mut EditorSession, key: &str, shift: bool| {
        let action = ShortcutMap::resolve(key, false, shift, false, true).unwrap();
        s.dispatch_shortcut(action).unwrap()
    };

    press(&mut session, "Enter", false);
    assert_eq!(session.notes().len(), 4);
    assert_eq!(session.selected(), Some(NoteId(5)));

    press(&mut session, "d", false);
    assert_eq!(session.notes().len(), 5);

    press(&mut session, "z", false);
    assert_eq!(session.notes().len(), 4);
    // Undo removed the selected duplicate, so nothing is selected.
    assert_eq!(session.selected(), None);
    press(&mut session, "z", true);
    assert_eq!(session.notes().len(), 5);
    assert_eq!(session.selected(), None);
    assert!(!session.dispatch_shortcut(ShortcutAction::Deselect).unwrap());

    assert!(session.select(NoteId(6)));

    assert_eq!(
        ShortcutMap::resolve("Escape", false, false, false, false),
        Some(ShortcutAction::Deselect)
    );
    assert!(session.dispatch_shortcut(ShortcutAction::Deselect).unwrap());
    assert_eq!(session.selected(), None);
}

#[test]
fn custom_canvas_survives_save() {
    let mut session = fixture_session();
    session.set_custom_size(600.0, 600.0);
    session.set_aspect_ratio(AspectRatio::Custom);
    let state = session.to_persisted();
    assert_eq!(state.aspect_ratio, AspectRatio::Custom);
    assert_eq!(state.custom_size, CanvasSize { width: 600.0, height: 600.0 });

    let mut restored = EditorSession::from_persisted(state, Container::default());
    assert_eq!(restored.canvas_size(), CanvasSize { width: 600.0, height: 600.0 });
    assert!(restored.yaml().contains("customWidth: 600"));
}
