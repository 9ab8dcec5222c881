//! Linear undo/redo history over note-list snapshots.
//!
//! The history is a sequence of immutable snapshots plus a cursor. Recording
//! after an undo discards everything past the cursor; there is no branching.
//!
//! Gestures and text-field focus sessions use **batching**: between
//! `begin_batch()` and `end_batch()` individual `record` calls are absorbed,
//! and a single snapshot of the final state is recorded when the outermost
//! batch closes (only if the notes actually changed).

use std::sync::Arc;
use yv_core::model::Note;

/// An immutable copy of the full note list.
pub type Snapshot = Arc<[Note]>;

/// Snapshot history with a cursor and batch grouping.
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    /// Maximum number of snapshots kept (at least 1).
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Whether any `record` was absorbed by the current batch.
    batch_dirty: bool,
}

impl History {
    pub fn new(initial: &[Note], max_depth: usize) -> Self {
        Self {
            snapshots: vec![Arc::from(initial)],
            cursor: 0,
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    /// Record the notes as the new current snapshot, pruning any redo
    /// branch. Inside a batch this only marks the batch dirty.
    pub fn record(&mut self, notes: &[Note]) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return;
        }
        self.push(Arc::from(notes));
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
        log::debug!("history: recorded entry {}/{}", self.cursor + 1, self.snapshots.len());
    }

    /// Start a batch. Nested batches close together with the outermost one.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch. When the outermost batch closes and something was
    /// recorded inside it, `notes` is recorded as one entry. Returns `true`
    /// if an entry was recorded.
    pub fn end_batch(&mut self, notes: &[Note]) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return false;
        }
        let dirty = std::mem::take(&mut self.batch_dirty);
        if dirty && self.current().as_ref() != notes {
            self.push(Arc::from(notes));
            true
        } else {
            false
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Step back one entry. Returns the new current snapshot, or `None` if
    /// already at the oldest entry.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current().clone())
    }

    /// Step forward one entry. Returns the new current snapshot, or `None`
    /// if already at the newest entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current().clone())
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of entries; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Drop all entries and start over from `notes`.
    pub fn reset(&mut self, notes: &[Note]) {
        self.snapshots.clear();
        self.snapshots.push(Arc::from(notes));
        self.cursor = 0;
        self.batch_depth = 0;
        self.batch_dirty = false;
    }
}
