pub mod emitter;
pub mod factory;
pub mod id;
pub mod layout;
pub mod model;
pub mod persist;

pub use emitter::emit_yaml;
pub use factory::{NoteBuilder, create_note, create_note_from_tag};
pub use id::{NoteId, PromptElementId};
pub use layout::{CanvasSize, Container, clamp_notes_to_canvas, compute_canvas_size};
pub use model::*;
pub use persist::{PersistError, PersistedState};
