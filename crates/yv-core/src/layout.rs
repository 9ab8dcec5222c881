//! Canvas layout policy.
//!
//! Sizes the canvas from an aspect-ratio selection (or a custom size) and
//! keeps notes inside the canvas bounds after resizes, drags, and note
//! resizes.

use crate::model::{AspectRatio, Note};
use serde::{Deserialize, Serialize};

/// Space reserved around the canvas inside its container.
pub const CANVAS_MARGIN_X: f32 = 40.0;
pub const CANVAS_MARGIN_Y: f32 = 100.0;

/// Smallest size a note can be resized to.
pub const MIN_NOTE_SIZE: f32 = 150.0;

/// The area available to the canvas (the editor viewport).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub width: f32,
    pub height: f32,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            width: 840.0,
            height: 550.0,
        }
    }
}

/// Pixel size of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
        }
    }
}

/// Compute the canvas size for an aspect-ratio selection.
///
/// `Custom` yields `custom` verbatim. A `W:H` ratio yields the largest box of
/// that ratio fitting inside the container minus the fixed margins, floored
/// to whole pixels.
pub fn compute_canvas_size(
    aspect: AspectRatio,
    custom: CanvasSize,
    container: Container,
) -> CanvasSize {
    let (w, h) = match aspect {
        AspectRatio::Custom => return custom,
        AspectRatio::Ratio { w, h } => (w as f32, h as f32),
    };

    let max_width = (container.width - CANVAS_MARGIN_X).max(0.0);
    let max_height = (container.height - CANVAS_MARGIN_Y).max(0.0);

    // The axis with the smaller scale factor binds.
    let (width, height) = if max_width / w <= max_height / h {
        (max_width, max_width * h / w)
    } else {
        (max_height * w / h, max_height)
    };

    CanvasSize {
        width: width.floor(),
        height: height.floor(),
    }
}

/// Shift notes that overhang the canvas back inside it. Sizes are kept.
/// Returns `true` if any note moved.
pub fn clamp_notes_to_canvas(notes: &mut [Note], canvas: CanvasSize) -> bool {
    let mut moved = false;
    for note in notes.iter_mut() {
        let x = note.x.min(canvas.width - note.width).max(0.0);
        let y = note.y.min(canvas.height - note.height).max(0.0);
        if x != note.x || y != note.y {
            log::debug!(
                "clamp note {}: ({}, {}) -> ({x}, {y})",
                note.id,
                note.x,
                note.y
            );
            note.x = x;
            note.y = y;
            moved = true;
        }
    }
    moved
}

/// Constrain a dragged note's top-left corner so the note stays on the canvas.
pub fn constrain_position(
    x: f32,
    y: f32,
    note_width: f32,
    note_height: f32,
    canvas: CanvasSize,
) -> (f32, f32) {
    (
        x.min(canvas.width - note_width).max(0.0),
        y.min(canvas.height - note_height).max(0.0),
    )
}

/// Largest size the note may be resized to from its current position.
pub fn max_resize(note: &Note, canvas: CanvasSize) -> (f32, f32) {
    (canvas.width - note.x, canvas.height - note.y)
}

/// Result of constraining a resize request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Constrain a requested note size to `[MIN_NOTE_SIZE, max_resize]` and pull
/// the position back so the resized note stays inside the canvas.
pub fn constrain_resize(note: &Note, width: f32, height: f32, canvas: CanvasSize) -> ResizeOutcome {
    let (max_w, max_h) = max_resize(note, canvas);
    // The canvas edge wins over the minimum.
    let width = width.max(MIN_NOTE_SIZE).min(max_w);
    let height = height.max(MIN_NOTE_SIZE).min(max_h);
    ResizeOutcome {
        x: note.x.min(canvas.width - width).max(0.0),
        y: note.y.min(canvas.height - height).max(0.0),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::NoteBuilder;
    use crate::id::NoteId;
    use crate::model::NoteKind;

    fn note_at(x: f32, y: f32, w: f32, h: f32) -> Note {
        NoteBuilder::new(NoteKind::Plain, NoteId(1))
            .position(x, y)
            .size(w, h)
            .build()
    }

    const CANVAS: CanvasSize = CanvasSize {
        width: 800.0,
        height: 450.0,
    };

    #[test]
    fn wide_ratio_fits_default_container() {
        let size = compute_canvas_size(
            AspectRatio::WIDE,
            CanvasSize::default(),
            Container {
                width: 840.0,
                height: 550.0,
            },
        );
        assert_eq!(size, CanvasSize { width: 800.0, height: 450.0 });
    }

    #[test]
    fn height_binds_in_wide_container() {
        let size = compute_canvas_size(
            AspectRatio::STANDARD,
            CanvasSize::default(),
            Container {
                width: 1640.0,
                height: 700.0,
            },
        );
        assert_eq!(size.height, 600.0);
        assert_eq!(size.width, 800.0);
    }

    #[test]
    fn square_ratio_is_square() {
        let size = compute_canvas_size(
            AspectRatio::SQUARE,
            CanvasSize::default(),
            Container {
                width: 1000.0,
                height: 600.0,
            },
        );
        assert_eq!(size.width, size.height);
        assert_eq!(size.height, 500.0);
    }

    #[test]
    fn custom_size_is_verbatim() {
        let custom = CanvasSize {
            width: 1234.0,
            height: 321.0,
        };
        let size = compute_canvas_size(AspectRatio::Custom, custom, Container::default());
        assert_eq!(size, custom);
    }

    #[test]
    fn tiny_container_never_negative() {
        let size = compute_canvas_size(
            AspectRatio::WIDE,
            CanvasSize::default(),
            Container {
                width: 10.0,
                height: 10.0,
            },
        );
        assert_eq!(size, CanvasSize { width: 0.0, height: 0.0 });
    }

    #[test]
    fn clamp_pulls_overhanging_note_flush() {
        let mut notes = vec![note_at(700.0, 400.0, 250.0, 150.0)];
        assert!(clamp_notes_to_canvas(&mut notes, CANVAS));
        assert_eq!((notes[0].x, notes[0].y), (550.0, 300.0));
        assert_eq!((notes[0].width, notes[0].height), (250.0, 150.0));
    }

    #[test]
    fn clamp_leaves_inside_notes_alone() {
        let mut notes = vec![note_at(10.0, 20.0, 250.0, 150.0)];
        assert!(!clamp_notes_to_canvas(&mut notes, CANVAS));
        assert_eq!((notes[0].x, notes[0].y), (10.0, 20.0));
    }

    #[test]
    fn clamp_keeps_oversized_note_at_origin() {
        let mut notes = vec![note_at(50.0, 50.0, 900.0, 150.0)];
        clamp_notes_to_canvas(&mut notes, CANVAS);
        assert_eq!(notes[0].x, 0.0);
    }

    #[test]
    fn constrain_position_clamps_both_edges() {
        assert_eq!(constrain_position(-20.0, -5.0, 250.0, 150.0, CANVAS), (0.0, 0.0));
        assert_eq!(
            constrain_position(900.0, 900.0, 250.0, 150.0, CANVAS),
            (550.0, 300.0)
        );
        assert_eq!(
            constrain_position(100.0, 100.0, 250.0, 150.0, CANVAS),
            (100.0, 100.0)
        );
    }

    #[test]
    fn resize_limited_by_canvas_edge() {
        let note = note_at(600.0, 100.0, 150.0, 150.0);
        let out = constrain_resize(&note, 400.0, 200.0, CANVAS);
        assert_eq!(out.width, 200.0);
        assert_eq!(out.height, 200.0);
        assert!(out.x + out.width <= CANVAS.width);
    }

    #[test]
    fn resize_respects_minimum() {
        let note = note_at(0.0, 0.0, 250.0, 150.0);
        let out = constrain_resize(&note, 20.0, 20.0, CANVAS);
        assert_eq!((out.width, out.height), (MIN_NOTE_SIZE, MIN_NOTE_SIZE));
    }

    #[test]
    fn resize_never_exceeds_canvas_edge() {
        // Near the right edge the room left is below the minimum; the edge wins
        // and the note stays where it is.
        let note = note_at(700.0, 0.0, 100.0, 150.0);
        let out = constrain_resize(&note, 100.0, 150.0, CANVAS);
        assert_eq!(max_resize(&note, CANVAS).0, 100.0);
        assert_eq!(out.width, 100.0);
        assert_eq!(out.x, 700.0);
        assert!(out.x + out.width <= CANVAS.width);
    }
}
