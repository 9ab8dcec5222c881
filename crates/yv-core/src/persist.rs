//! Saved editor state: the record written to local storage on every change
//! and read back once at startup.

use crate::factory::NoteBuilder;
use crate::id::NoteId;
use crate::layout::CanvasSize;
use crate::model::{AspectRatio, CanvasSettings, Note, NoteKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local-storage key the browser bridge saves under.
pub const STORAGE_KEY: &str = "yamlVisualizerState";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("invalid saved state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid binary snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("failed to encode binary snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

/// A full snapshot of the editor's persistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub notes: Vec<Note>,
    pub canvas_settings: CanvasSettings,
    pub aspect_ratio: AspectRatio,
    pub custom_size: CanvasSize,
}

impl Default for PersistedState {
    /// One plain example note on a 16:9 canvas.
    fn default() -> Self {
        Self {
            notes: vec![
                NoteBuilder::new(NoteKind::Plain, NoteId(1))
                    .position(50.0, 50.0)
                    .content("e.g. a blue sky over a green meadow")
                    .build(),
            ],
            canvas_settings: CanvasSettings::default(),
            aspect_ratio: AspectRatio::WIDE,
            custom_size: CanvasSize::default(),
        }
    }
}

impl PersistedState {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact MessagePack encoding, for binary snapshot export.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, PersistError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, PersistError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    /// Parse saved JSON, falling back to the default state when it is
    /// missing or malformed.
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json {
            None => Self::default(),
            Some(text) => Self::from_json(text).unwrap_or_else(|e| {
                log::warn!("discarding saved state: {e}");
                Self::default()
            }),
        }
    }
}
