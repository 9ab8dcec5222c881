//! Pointer gesture capture.
//!
//! A gesture starts on pointer-down over a note, receives every pointer move
//! while held, and ends on pointer-up. The session opens a history batch when
//! a gesture begins and closes it when the gesture ends, so a whole drag or
//! resize (or a focused text edit) is one undo step.

use yv_core::id::NoteId;

/// A drag in progress: the pointer and note positions at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub note_id: NoteId,
    start_pointer: (f32, f32),
    start_note: (f32, f32),
}

impl DragGesture {
    pub fn new(note_id: NoteId, pointer: (f32, f32), note_pos: (f32, f32)) -> Self {
        Self {
            note_id,
            start_pointer: pointer,
            start_note: note_pos,
        }
    }

    /// Unconstrained note position for the current pointer position.
    pub fn target(&self, px: f32, py: f32) -> (f32, f32) {
        (
            self.start_note.0 + (px - self.start_pointer.0),
            self.start_note.1 + (py - self.start_pointer.1),
        )
    }
}

/// The kinds of captured interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Drag(DragGesture),
    Resize { note_id: NoteId },
    /// A text field of the note has focus; edits coalesce until blur.
    TextEdit { note_id: NoteId },
}

impl Gesture {
    pub fn note_id(&self) -> NoteId {
        match self {
            Gesture::Drag(d) => d.note_id,
            Gesture::Resize { note_id } | Gesture::TextEdit { note_id } => *note_id,
        }
    }
}
