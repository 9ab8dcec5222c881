//! WASM bridge for the YAML Visualizer: exposes the editor session to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Structured results cross the
//! boundary as JSON strings; errors become `false` or `{"ok":false,...}`.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use yv_core::id::{NoteId, PromptElementId};
use yv_core::layout::Container;
use yv_core::model::{AspectRatio, DetailField, NoteKind};
use yv_core::persist::{PersistedState, STORAGE_KEY};
use yv_editor::session::{EditAction, EditError, EditorSession};
use yv_editor::shortcuts::{ShortcutAction, ShortcutMap};

/// The browser-facing editor controller.
///
/// Owns one `EditorSession`. Every UI interaction from the page goes
/// through this struct.
#[wasm_bindgen]
pub struct YamlCanvas {
    session: EditorSession,
}

#[wasm_bindgen]
impl YamlCanvas {
    /// Create a controller for a viewport of the given size, starting from
    /// the default example note.
    #[wasm_bindgen(constructor)]
    pub fn new(container_width: f32, container_height: f32) -> Self {
        console_error_panic_hook_setup();
        console_logger_setup();

        Self {
            session: EditorSession::new(Container {
                width: container_width,
                height: container_height,
            }),
        }
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// The current YAML text.
    pub fn get_yaml(&mut self) -> String {
        self.session.yaml().to_string()
    }

    /// The note list as a JSON array, in the persisted note shape.
    pub fn get_notes_json(&self) -> String {
        serde_json::to_string(self.session.notes()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Canvas settings plus UI state the page needs to render controls.
    pub fn get_canvas_json(&self) -> String {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CanvasView<'a> {
            settings: &'a yv_core::model::CanvasSettings,
            custom_size: yv_core::layout::CanvasSize,
            selected: Option<NoteId>,
            can_undo: bool,
            can_redo: bool,
            pending: Option<String>,
        }
        let view = CanvasView {
            settings: self.session.settings(),
            custom_size: self.session.custom_size(),
            selected: self.session.selected(),
            can_undo: self.session.can_undo(),
            can_redo: self.session.can_redo(),
            pending: self.session.pending().map(pending_name),
        };
        serde_json::to_string(&view).unwrap_or_else(|_| "{}".to_string())
    }

    /// File name for a YAML download taken now.
    pub fn download_file_name(&self) -> String {
        EditorSession::download_file_name(js_sys::Date::now() as u64)
    }

    // ─── Note actions ────────────────────────────────────────────────────

    /// Add a note of the given type tag. Unknown tags add a plain note.
    /// Returns the new note's id, or 0 if no note was added.
    pub fn add_note(&mut self, kind: &str) -> u32 {
        let kind = NoteKind::from_tag(kind);
        if !report(self.session.apply(EditAction::AddNote { kind })) {
            return 0;
        }
        self.session.selected().map(|id| id.0).unwrap_or(0)
    }

    pub fn duplicate_note(&mut self, id: u32) -> bool {
        report(self.session.apply(EditAction::DuplicateNote { id: NoteId(id) }))
    }

    /// Ask to delete a note; applied after `confirm()`.
    pub fn request_delete(&mut self, id: u32) -> bool {
        self.session
            .request(EditAction::DeleteNote { id: NoteId(id) })
            .is_ok()
    }

    /// Ask to remove every note; applied after `confirm()`.
    pub fn request_clear_all(&mut self) -> bool {
        self.session.request(EditAction::ClearAll).is_ok()
    }

    pub fn confirm(&mut self) -> bool {
        report(self.session.confirm())
    }

    pub fn cancel(&mut self) -> bool {
        self.session.cancel()
    }

    pub fn set_note_type(&mut self, id: u32, kind: &str) -> bool {
        report(self.session.apply(EditAction::SetKind {
            id: NoteId(id),
            kind: NoteKind::from_tag(kind),
        }))
    }

    pub fn set_note_content(&mut self, id: u32, content: &str) -> bool {
        report(self.session.apply(EditAction::SetContent {
            id: NoteId(id),
            content: content.to_string(),
        }))
    }

    /// Set one detail field by its YAML name (`gender`, `importance`, ...).
    /// Returns JSON `{"ok":true,"changed":bool}` or `{"ok":false,"error":"..."}`.
    pub fn set_detail_field(&mut self, id: u32, field: &str, value: &str) -> String {
        let Some(field) = DetailField::from_name(field) else {
            return error_json(&format!("unknown detail field {field:?}"));
        };
        match self.session.apply(EditAction::SetDetailField {
            id: NoteId(id),
            field,
            value: value.to_string(),
        }) {
            Ok(changed) => format!(r#"{{"ok":true,"changed":{changed}}}"#),
            Err(e) => error_json(&e.to_string()),
        }
    }

    pub fn select(&mut self, id: u32) -> bool {
        self.session.select(NoteId(id))
    }

    pub fn deselect(&mut self) -> bool {
        self.session.deselect()
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn begin_text_edit(&mut self, id: u32) -> bool {
        self.session.begin_text_edit(NoteId(id)).is_ok()
    }

    pub fn end_text_edit(&mut self) -> bool {
        self.session.end_text_edit()
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    pub fn begin_drag(&mut self, id: u32, px: f32, py: f32) -> bool {
        self.session.begin_drag(NoteId(id), px, py).is_ok()
    }

    pub fn drag_to(&mut self, px: f32, py: f32) -> bool {
        report(self.session.drag_to(px, py))
    }

    pub fn end_drag(&mut self) -> bool {
        self.session.end_drag()
    }

    pub fn begin_resize(&mut self, id: u32) -> bool {
        self.session.begin_resize(NoteId(id)).is_ok()
    }

    pub fn resize_to(&mut self, width: f32, height: f32) -> bool {
        report(self.session.resize_to(width, height))
    }

    pub fn end_resize(&mut self) -> bool {
        self.session.end_resize()
    }

    // ─── Canvas ──────────────────────────────────────────────────────────

    /// Select an aspect ratio by label (`"16:9"`, `"custom"`, ...).
    pub fn set_aspect_ratio(&mut self, label: &str) -> bool {
        match label.parse::<AspectRatio>() {
            Ok(aspect) => self.session.set_aspect_ratio(aspect),
            Err(e) => {
                log::warn!("rejecting aspect ratio {label:?}: {e}");
                false
            }
        }
    }

    pub fn set_custom_size(&mut self, width: f32, height: f32) -> bool {
        self.session.set_custom_size(width, height)
    }

    /// The viewport was resized.
    pub fn resize(&mut self, container_width: f32, container_height: f32) {
        self.session
            .set_container_size(container_width, container_height);
    }

    /// Returns the new element's id, or an empty string if `value` is blank.
    pub fn add_prompt_element(&mut self, category: &str, value: &str) -> String {
        self.session
            .add_prompt_element(category, value)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn update_prompt_element(&mut self, id: &str, category: &str, value: &str) -> bool {
        report(
            self.session
                .update_prompt_element(&PromptElementId::new(id), category, value),
        )
    }

    pub fn remove_prompt_element(&mut self, id: &str) -> bool {
        report(
            self.session
                .remove_prompt_element(&PromptElementId::new(id))
                .map(|()| true),
        )
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool,"action":"<action_name>"}`.
    ///
    /// `copyYaml` and `downloadYaml` are reported for the page to carry out.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };
        let changed = report(self.session.dispatch_shortcut(action));
        key_result_json(action, changed)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// The persisted state as JSON.
    pub fn save_state(&self) -> String {
        self.session
            .to_persisted()
            .to_json()
            .unwrap_or_else(|e| error_json(&e.to_string()))
    }

    /// Replace the session from persisted JSON. Malformed input resets to
    /// the default state and returns `false`.
    pub fn load_state(&mut self, json: &str) -> bool {
        let (state, ok) = match PersistedState::from_json(json) {
            Ok(state) => (state, true),
            Err(e) => {
                log::warn!("discarding saved state: {e}");
                (PersistedState::default(), false)
            }
        };
        self.session = EditorSession::from_persisted(state, self.session.container());
        ok
    }

    /// The persisted state as MessagePack bytes.
    pub fn export_snapshot(&self) -> Vec<u8> {
        self.session.to_persisted().to_msgpack().unwrap_or_else(|e| {
            log::warn!("snapshot export failed: {e}");
            Vec::new()
        })
    }

    /// Replace the session from MessagePack bytes. Returns `false` and keeps
    /// the current session if the bytes do not decode.
    pub fn import_snapshot(&mut self, bytes: &[u8]) -> bool {
        match PersistedState::from_msgpack(bytes) {
            Ok(state) => {
                self.session = EditorSession::from_persisted(state, self.session.container());
                true
            }
            Err(e) => {
                log::warn!("snapshot import failed: {e}");
                false
            }
        }
    }

    /// Save to `localStorage` if anything changed since the last save.
    /// Returns `true` if a write happened.
    pub fn persist(&mut self) -> bool {
        if !self.session.take_save_dirty() {
            return false;
        }
        let Ok(json) = self.session.to_persisted().to_json() else {
            return false;
        };
        match local_storage().map(|s| s.set_item(STORAGE_KEY, &json)) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                log::warn!("localStorage write failed: {e:?}");
                false
            }
            None => false,
        }
    }

    /// Load from `localStorage`, falling back to the default state.
    /// Returns `true` if saved state was found and restored.
    pub fn restore(&mut self) -> bool {
        let saved = local_storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
        let restored = match saved {
            Some(json) => self.load_state(&json),
            None => {
                self.session =
                    EditorSession::from_persisted(PersistedState::default(), self.session.container());
                false
            }
        };
        self.session.take_save_dirty();
        restored
    }
}

/// Log an edit error and collapse the result to "did anything change".
fn report(result: Result<bool, EditError>) -> bool {
    result.unwrap_or_else(|e| {
        log::debug!("edit rejected: {e}");
        false
    })
}

fn pending_name(action: &EditAction) -> String {
    match action {
        EditAction::DeleteNote { id } => format!("delete:{id}"),
        EditAction::ClearAll => "clearAll".to_string(),
        other => format!("{other:?}"),
    }
}

fn key_result_json(action: ShortcutAction, changed: bool) -> String {
    format!(
        r#"{{"changed":{changed},"action":"{}"}}"#,
        action.name()
    )
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

// ─── Console plumbing ────────────────────────────────────────────────────

/// Set up panic hook for better error messages in browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("YAML Visualizer panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Routes `log` records to the browser console.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg: JsValue = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_logger_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        static LOGGER: ConsoleLogger = ConsoleLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    }
}
