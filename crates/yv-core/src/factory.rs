//! Note construction with per-type empty detail records.

use crate::id::NoteId;
use crate::model::{Note, NoteDetail, NoteKind};

pub const DEFAULT_NOTE_X: f32 = 100.0;
pub const DEFAULT_NOTE_Y: f32 = 100.0;
pub const DEFAULT_NOTE_WIDTH: f32 = 250.0;
pub const DEFAULT_NOTE_HEIGHT: f32 = 150.0;

/// Create a note of `kind` at the default position and size, with empty
/// content and the empty detail record for its kind.
pub fn create_note(kind: NoteKind, id: NoteId) -> Note {
    NoteBuilder::new(kind, id).build()
}

/// Like [`create_note`], but from a free-form type tag. Unknown tags yield a
/// plain note.
pub fn create_note_from_tag(tag: &str, id: NoteId) -> Note {
    create_note(NoteKind::from_tag(tag), id)
}

/// Builder for notes with non-default geometry or content.
#[derive(Debug, Clone)]
pub struct NoteBuilder {
    note: Note,
}

impl NoteBuilder {
    pub fn new(kind: NoteKind, id: NoteId) -> Self {
        Self {
            note: Note {
                id,
                x: DEFAULT_NOTE_X,
                y: DEFAULT_NOTE_Y,
                width: DEFAULT_NOTE_WIDTH,
                height: DEFAULT_NOTE_HEIGHT,
                content: String::new(),
                detail: NoteDetail::empty_for(kind),
            },
        }
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.note.x = x;
        self.note.y = y;
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.note.width = width;
        self.note.height = height;
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.note.content = content.into();
        self
    }

    #[must_use]
    pub fn build(self) -> Note {
        self.note
    }
}

/// Switch a note to another kind. Content and geometry are kept; the detail
/// record is replaced by the empty record of the new kind. Returns `false`
/// if the note already had that kind.
pub fn retype_note(note: &mut Note, kind: NoteKind) -> bool {
    if note.kind() == kind {
        return false;
    }
    note.detail = NoteDetail::empty_for(kind);
    true
}
