pub mod gesture;
pub mod history;
pub mod session;
pub mod shortcuts;

pub use history::History;
pub use session::{EditAction, EditError, EditorSession};
pub use shortcuts::{ShortcutAction, ShortcutMap};
