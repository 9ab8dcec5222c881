use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a note on the canvas. Stable for the note's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u32);

impl NoteId {
    /// The id a new note should get: one greater than the largest in use.
    /// `None` once `u32::MAX` is taken.
    pub fn next_after<I: IntoIterator<Item = NoteId>>(ids: I) -> Option<Self> {
        let max = ids.into_iter().map(|id| id.0).max().unwrap_or(0);
        max.checked_add(1).map(NoteId)
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a canvas-wide prompt element (`pe_<n>`).
///
/// Generated once when the element is created, never at emit time, so the
/// YAML output for a given state is stable.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptElementId(String);

impl PromptElementId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate a fresh id that does not collide with any of `taken`.
    ///
    /// Ids restored from storage may already use counter values, so the
    /// counter is advanced past them.
    pub fn generate<'a, I>(taken: I) -> Self
    where
        I: IntoIterator<Item = &'a PromptElementId> + Clone,
    {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("pe_{n}");
            if !taken.clone().into_iter().any(|id| id.0 == candidate) {
                return Self(candidate);
            }
        }
    }
}

impl fmt::Debug for PromptElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PromptElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
