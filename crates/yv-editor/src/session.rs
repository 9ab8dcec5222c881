//! Editor session: the single owner of live editor state.
//!
//! The session holds the note list, canvas settings, and history, and keeps
//! the YAML text in sync:
//!
//! - **Note edits** go through [`EditorSession::apply`], which mutates the
//!   note list, records one history entry (or feeds the open batch), and
//!   marks the YAML and saved state dirty.
//! - **Canvas changes** (aspect ratio, custom size, container resize)
//!   recompute the canvas size and clamp notes back inside it. They are not
//!   history entries.
//! - **Gestures** wrap many edits in one history batch.

use crate::gesture::{DragGesture, Gesture};
use crate::history::History;
use crate::shortcuts::ShortcutAction;
use thiserror::Error;
use yv_core::emitter::emit_yaml;
use yv_core::factory::{create_note, retype_note};
use yv_core::id::{NoteId, PromptElementId};
use yv_core::layout::{
    CanvasSize, Container, clamp_notes_to_canvas, compute_canvas_size, constrain_position,
    constrain_resize,
};
use yv_core::model::*;
use yv_core::persist::PersistedState;

/// Maximum undo depth.
pub const HISTORY_DEPTH: usize = 200;

/// Offset of a duplicate from its original.
pub const DUPLICATE_OFFSET: f32 = 20.0;

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("note {0} not found")]
    NoteNotFound(NoteId),

    #[error("{kind} notes have no {field} field")]
    FieldNotOnKind { kind: NoteKind, field: &'static str },

    #[error("{value:?} is not a valid {field}, expected one of {allowed:?}")]
    InvalidValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("prompt element {0} not found")]
    PromptElementNotFound(PromptElementId),

    #[error("nothing is waiting for confirmation")]
    NothingPending,

    #[error("no {0} gesture in progress")]
    NoGesture(&'static str),

    #[error("every note id is in use")]
    IdSpaceExhausted,
}

/// A user-visible mutation of the note list.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    AddNote { kind: NoteKind },
    DeleteNote { id: NoteId },
    DuplicateNote { id: NoteId },
    ClearAll,
    SetKind { id: NoteId, kind: NoteKind },
    SetContent { id: NoteId, content: String },
    SetDetailField { id: NoteId, field: DetailField, value: String },
    MoveNote { id: NoteId, x: f32, y: f32 },
    ResizeNote { id: NoteId, width: f32, height: f32 },
}

impl EditAction {
    /// Destructive actions need an explicit confirmation step when
    /// requested through [`EditorSession::request`].
    pub fn is_destructive(&self) -> bool {
        matches!(self, EditAction::DeleteNote { .. } | EditAction::ClearAll)
    }
}

/// The editor controller. See the module docs.
pub struct EditorSession {
    notes: Vec<Note>,
    settings: CanvasSettings,
    custom_size: CanvasSize,
    container: Container,
    history: History,
    selected: Option<NoteId>,
    pending: Option<EditAction>,
    gesture: Option<Gesture>,
    yaml: String,
    yaml_dirty: bool,
    save_dirty: bool,
}

impl EditorSession {
    /// A session with the default example note.
    pub fn new(container: Container) -> Self {
        Self::from_persisted(PersistedState::default(), container)
    }

    /// Restore a saved session. The canvas is re-fitted to `container` and
    /// notes are clamped into it; history starts fresh.
    pub fn from_persisted(state: PersistedState, container: Container) -> Self {
        let mut settings = state.canvas_settings;
        settings.aspect_ratio = state.aspect_ratio;
        let mut session = Self {
            history: History::new(&state.notes, HISTORY_DEPTH),
            notes: state.notes,
            settings,
            custom_size: state.custom_size,
            container,
            selected: None,
            pending: None,
            gesture: None,
            yaml: String::new(),
            yaml_dirty: true,
            save_dirty: false,
        };
        session.relayout();
        session.history.reset(&session.notes);
        session
    }

    /// Restore from saved JSON, or start from defaults when it is missing
    /// or malformed.
    pub fn load_or_default(json: Option<&str>, container: Container) -> Self {
        Self::from_persisted(PersistedState::load_or_default(json), container)
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            notes: self.notes.clone(),
            canvas_settings: self.settings.clone(),
            aspect_ratio: self.settings.aspect_ratio,
            custom_size: self.custom_size,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize {
            width: self.settings.width,
            height: self.settings.height,
        }
    }

    pub fn custom_size(&self) -> CanvasSize {
        self.custom_size
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn pending(&self) -> Option<&EditAction> {
        self.pending.as_ref()
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn selected(&self) -> Option<NoteId> {
        self.selected
    }

    /// Select a note. Returns `false` if no note has that id.
    pub fn select(&mut self, id: NoteId) -> bool {
        if self.note(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn deselect(&mut self) -> bool {
        self.selected.take().is_some()
    }

    // ─── YAML output ─────────────────────────────────────────────────────

    /// The YAML text for the current state, re-emitted only when stale.
    pub fn yaml(&mut self) -> &str {
        if self.yaml_dirty {
            self.yaml = emit_yaml(&self.notes, &self.settings);
            self.yaml_dirty = false;
        }
        &self.yaml
    }

    /// File name for a YAML download taken at `timestamp_ms`.
    pub fn download_file_name(timestamp_ms: u64) -> String {
        format!("prompt-{timestamp_ms}.yaml")
    }

    /// Whether state changed since the last call; the caller saves when this
    /// returns `true`.
    pub fn take_save_dirty(&mut self) -> bool {
        std::mem::take(&mut self.save_dirty)
    }

    fn mark_dirty(&mut self) {
        self.yaml_dirty = true;
        self.save_dirty = true;
    }

    // ─── Note edits ──────────────────────────────────────────────────────

    /// Apply an edit. Returns `Ok(true)` if the notes changed, in which case
    /// one history entry is recorded (or absorbed by an open gesture).
    pub fn apply(&mut self, action: EditAction) -> Result<bool, EditError> {
        let changed = self.apply_inner(action)?;
        if changed {
            self.history.record(&self.notes);
            self.mark_dirty();
        }
        Ok(changed)
    }

    fn index_of(&self, id: NoteId) -> Result<usize, EditError> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(EditError::NoteNotFound(id))
    }

    fn next_id(&self) -> Result<NoteId, EditError> {
        NoteId::next_after(self.notes.iter().map(|n| n.id)).ok_or(EditError::IdSpaceExhausted)
    }

    fn apply_inner(&mut self, action: EditAction) -> Result<bool, EditError> {
        let canvas = self.canvas_size();
        match action {
            EditAction::AddNote { kind } => {
                let mut note = create_note(kind, self.next_id()?);
                (note.x, note.y) = constrain_position(note.x, note.y, note.width, note.height, canvas);
                log::debug!("add {kind} note {}", note.id);
                self.selected = Some(note.id);
                self.notes.push(note);
                Ok(true)
            }
            EditAction::DeleteNote { id } => {
                let idx = self.index_of(id)?;
                self.notes.remove(idx);
                if self.selected == Some(id) {
                    self.selected = None;
                }
                Ok(true)
            }
            EditAction::DuplicateNote { id } => {
                let idx = self.index_of(id)?;
                let mut copy = self.notes[idx].clone();
                copy.id = self.next_id()?;
                (copy.x, copy.y) = constrain_position(
                    copy.x + DUPLICATE_OFFSET,
                    copy.y + DUPLICATE_OFFSET,
                    copy.width,
                    copy.height,
                    canvas,
                );
                log::debug!("duplicate note {id} as {}", copy.id);
                self.selected = Some(copy.id);
                self.notes.push(copy);
                Ok(true)
            }
            EditAction::ClearAll => {
                if self.notes.is_empty() {
                    return Ok(false);
                }
                self.notes.clear();
                self.selected = None;
                Ok(true)
            }
            EditAction::SetKind { id, kind } => {
                let idx = self.index_of(id)?;
                Ok(retype_note(&mut self.notes[idx], kind))
            }
            EditAction::SetContent { id, content } => {
                let idx = self.index_of(id)?;
                let note = &mut self.notes[idx];
                if note.content == content {
                    return Ok(false);
                }
                note.content = content;
                Ok(true)
            }
            EditAction::SetDetailField { id, field, value } => {
                let idx = self.index_of(id)?;
                let detail = &mut self.notes[idx].detail;
                if let Some(allowed) = detail.allowed_values(field) {
                    if !value.is_empty() && !allowed.contains(&value.as_str()) {
                        return Err(EditError::InvalidValue {
                            field: field.as_str(),
                            value,
                            allowed,
                        });
                    }
                }
                let kind = detail.kind();
                let slot = detail.field_mut(field).ok_or(EditError::FieldNotOnKind {
                    kind,
                    field: field.as_str(),
                })?;
                if *slot == value {
                    return Ok(false);
                }
                *slot = value;
                Ok(true)
            }
            EditAction::MoveNote { id, x, y } => {
                let idx = self.index_of(id)?;
                let note = &mut self.notes[idx];
                let (x, y) = constrain_position(x, y, note.width, note.height, canvas);
                if (note.x, note.y) == (x, y) {
                    return Ok(false);
                }
                note.x = x;
                note.y = y;
                Ok(true)
            }
            EditAction::ResizeNote { id, width, height } => {
                let idx = self.index_of(id)?;
                let note = &mut self.notes[idx];
                let out = constrain_resize(note, width, height, canvas);
                if (note.x, note.y, note.width, note.height) == (out.x, out.y, out.width, out.height)
                {
                    return Ok(false);
                }
                note.x = out.x;
                note.y = out.y;
                note.width = out.width;
                note.height = out.height;
                Ok(true)
            }
        }
    }

    // ─── Confirmation ────────────────────────────────────────────────────

    /// Request an edit. Destructive edits are held until [`confirm`]
    /// (returning `Ok(false)` for now); others apply immediately.
    ///
    /// [`confirm`]: EditorSession::confirm
    pub fn request(&mut self, action: EditAction) -> Result<bool, EditError> {
        if action.is_destructive() {
            if let EditAction::DeleteNote { id } = action {
                self.index_of(id)?;
            }
            log::debug!("awaiting confirmation for {action:?}");
            self.pending = Some(action);
            return Ok(false);
        }
        self.apply(action)
    }

    /// Apply the pending destructive edit.
    pub fn confirm(&mut self) -> Result<bool, EditError> {
        let action = self.pending.take().ok_or(EditError::NothingPending)?;
        self.apply(action)
    }

    /// Drop the pending destructive edit. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    /// Step back one history entry. Any open gesture is closed first.
    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Step forward one history entry. Any open gesture is closed first.
    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: &[Note]) {
        self.notes = snapshot.to_vec();
        // The canvas may have shrunk since the snapshot was taken.
        let canvas = self.canvas_size();
        clamp_notes_to_canvas(&mut self.notes, canvas);
        if let Some(id) = self.selected {
            if self.note(id).is_none() {
                self.selected = None;
            }
        }
        self.mark_dirty();
    }

    // ─── Canvas ──────────────────────────────────────────────────────────

    pub fn set_aspect_ratio(&mut self, aspect: AspectRatio) -> bool {
        if self.settings.aspect_ratio == aspect {
            return false;
        }
        self.settings.aspect_ratio = aspect;
        self.relayout();
        true
    }

    /// Set the custom canvas size. Non-positive or non-finite input is
    /// ignored.
    pub fn set_custom_size(&mut self, width: f32, height: f32) -> bool {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring custom size {width}x{height}");
            return false;
        }
        self.custom_size = CanvasSize { width, height };
        self.relayout();
        true
    }

    /// The viewport changed size.
    pub fn set_container_size(&mut self, width: f32, height: f32) {
        self.container = Container { width, height };
        self.relayout();
    }

    fn relayout(&mut self) {
        let size = compute_canvas_size(self.settings.aspect_ratio, self.custom_size, self.container);
        self.settings.width = size.width;
        self.settings.height = size.height;
        if self.settings.aspect_ratio.is_custom() {
            self.settings.custom_width = Some(self.custom_size.width);
            self.settings.custom_height = Some(self.custom_size.height);
        } else {
            self.settings.custom_width = None;
            self.settings.custom_height = None;
        }
        clamp_notes_to_canvas(&mut self.notes, size);
        self.mark_dirty();
    }

    // ─── Prompt elements ─────────────────────────────────────────────────

    /// Append a prompt element. Empty values are ignored.
    pub fn add_prompt_element(&mut self, category: &str, value: &str) -> Option<PromptElementId> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let id = PromptElementId::generate(self.settings.prompt_elements.iter().map(|e| &e.id));
        self.settings.prompt_elements.push(PromptElement {
            id: id.clone(),
            category: category.trim().to_string(),
            value: value.to_string(),
        });
        self.mark_dirty();
        Some(id)
    }

    pub fn update_prompt_element(
        &mut self,
        id: &PromptElementId,
        category: &str,
        value: &str,
    ) -> Result<bool, EditError> {
        let element = self
            .settings
            .prompt_elements
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| EditError::PromptElementNotFound(id.clone()))?;
        if element.category == category && element.value == value {
            return Ok(false);
        }
        element.category = category.to_string();
        element.value = value.to_string();
        self.mark_dirty();
        Ok(true)
    }

    pub fn remove_prompt_element(&mut self, id: &PromptElementId) -> Result<(), EditError> {
        let idx = self
            .settings
            .prompt_elements
            .iter()
            .position(|e| e.id == *id)
            .ok_or_else(|| EditError::PromptElementNotFound(id.clone()))?;
        self.settings.prompt_elements.remove(idx);
        self.mark_dirty();
        Ok(())
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    fn begin_gesture(&mut self, gesture: Gesture) -> Result<(), EditError> {
        self.end_gesture();
        self.index_of(gesture.note_id())?;
        self.history.begin_batch();
        self.selected = Some(gesture.note_id());
        self.gesture = Some(gesture);
        Ok(())
    }

    /// Close the open gesture, if any. Returns `true` if it produced a
    /// history entry.
    pub fn end_gesture(&mut self) -> bool {
        if self.gesture.take().is_none() {
            return false;
        }
        self.history.end_batch(&self.notes)
    }

    /// Pointer-down on a note's drag handle at `(px, py)`.
    pub fn begin_drag(&mut self, id: NoteId, px: f32, py: f32) -> Result<(), EditError> {
        let idx = self.index_of(id)?;
        let note = &self.notes[idx];
        let drag = DragGesture::new(id, (px, py), (note.x, note.y));
        self.begin_gesture(Gesture::Drag(drag))
    }

    /// Pointer moved during a drag; the note follows, constrained to the canvas.
    pub fn drag_to(&mut self, px: f32, py: f32) -> Result<bool, EditError> {
        let Some(Gesture::Drag(drag)) = self.gesture else {
            return Err(EditError::NoGesture("drag"));
        };
        let (x, y) = drag.target(px, py);
        self.apply(EditAction::MoveNote {
            id: drag.note_id,
            x,
            y,
        })
    }

    pub fn end_drag(&mut self) -> bool {
        self.end_gesture()
    }

    pub fn begin_resize(&mut self, id: NoteId) -> Result<(), EditError> {
        self.begin_gesture(Gesture::Resize { note_id: id })
    }

    pub fn resize_to(&mut self, width: f32, height: f32) -> Result<bool, EditError> {
        let Some(Gesture::Resize { note_id }) = self.gesture else {
            return Err(EditError::NoGesture("resize"));
        };
        self.apply(EditAction::ResizeNote {
            id: note_id,
            width,
            height,
        })
    }

    pub fn end_resize(&mut self) -> bool {
        self.end_gesture()
    }

    /// A text field of the note gained focus. Edits until
    /// [`end_text_edit`](EditorSession::end_text_edit) form one undo step.
    pub fn begin_text_edit(&mut self, id: NoteId) -> Result<(), EditError> {
        self.begin_gesture(Gesture::TextEdit { note_id: id })
    }

    pub fn end_text_edit(&mut self) -> bool {
        self.end_gesture()
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Run a shortcut action against the session. Returns `Ok(true)` if the
    /// notes or selection changed. `CopyYaml`/`DownloadYaml` are handled by
    /// the host and return `Ok(false)`.
    pub fn dispatch_shortcut(&mut self, action: ShortcutAction) -> Result<bool, EditError> {
        match action {
            ShortcutAction::Undo => Ok(self.undo()),
            ShortcutAction::Redo => Ok(self.redo()),
            ShortcutAction::AddNote => self.apply(EditAction::AddNote {
                kind: NoteKind::Plain,
            }),
            ShortcutAction::Duplicate => match self.selected {
                Some(id) => self.apply(EditAction::DuplicateNote { id }),
                None => Ok(false),
            },
            ShortcutAction::Delete => match self.selected {
                Some(id) => self.request(EditAction::DeleteNote { id }),
                None => Ok(false),
            },
            ShortcutAction::ClearAll => self.request(EditAction::ClearAll),
            ShortcutAction::Deselect => Ok(self.deselect()),
            ShortcutAction::CopyYaml | ShortcutAction::DownloadYaml => Ok(false),
        }
    }
}
