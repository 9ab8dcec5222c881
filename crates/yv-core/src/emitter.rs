//! Emitter: notes + canvas settings → YAML text.
//!
//! Output is line-oriented with 2-space indents and a fixed key order, so the
//! same state always produces byte-identical text. String scalars are written
//! as escaped double-quoted YAML.

use crate::model::*;
use std::fmt::Write;

/// Emit the canvas block followed by one `elements:` entry per note.
#[must_use]
pub fn emit_yaml(notes: &[Note], settings: &CanvasSettings) -> String {
    let mut out = String::with_capacity(256 + notes.len() * 192);

    emit_canvas(&mut out, settings);

    out.push_str("\nelements:\n");
    for note in notes {
        emit_note(&mut out, note);
    }

    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn emit_canvas(out: &mut String, settings: &CanvasSettings) {
    out.push_str("canvas:\n");
    writeln!(out, "  aspectRatio: {}", quote(&settings.aspect_ratio.to_string())).unwrap();
    writeln!(out, "  width: {}", format_num(settings.width)).unwrap();
    writeln!(out, "  height: {}", format_num(settings.height)).unwrap();

    if settings.aspect_ratio.is_custom() {
        if let (Some(w), Some(h)) = (settings.custom_width, settings.custom_height) {
            writeln!(out, "  customWidth: {}", format_num(w)).unwrap();
            writeln!(out, "  customHeight: {}", format_num(h)).unwrap();
        }
    }

    if !settings.prompt_elements.is_empty() {
        out.push_str("  promptElements:\n");
        for element in &settings.prompt_elements {
            writeln!(out, "    - id: {}", scalar(element.id.as_str())).unwrap();
            writeln!(out, "      category: {}", quote(&element.category)).unwrap();
            writeln!(out, "      value: {}", quote(&element.value)).unwrap();
        }
    }
}

fn emit_note(out: &mut String, note: &Note) {
    writeln!(out, "  - id: {}", note.id).unwrap();
    writeln!(out, "    type: {}", note.kind()).unwrap();
    writeln!(
        out,
        "    position: {{ x: {}, y: {} }}",
        format_num(note.x),
        format_num(note.y)
    )
    .unwrap();
    writeln!(
        out,
        "    size: {{ width: {}, height: {} }}",
        format_num(note.width),
        format_num(note.height)
    )
    .unwrap();
    writeln!(out, "    content: {}", quote(&note.content)).unwrap();

    if let Some(block) = note.detail.block_name() {
        indent(out, 2);
        writeln!(out, "{block}:").unwrap();
        for (field, value) in note.detail.fields() {
            indent(out, 3);
            writeln!(out, "{}: {}", field.as_str(), quote(value)).unwrap();
        }
    }
}

/// YAML double-quoted scalar with escapes for `\`, `"`, and control characters.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                write!(out, "\\x{:02X}", c as u32).unwrap();
            }
            // NEL, LS, PS are line breaks to a YAML reader.
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c @ '\u{80}'..='\u{9f}' => {
                write!(out, "\\x{:02X}", c as u32).unwrap();
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Emit `s` plain when it cannot be misread as anything but a string,
/// quoted otherwise.
fn scalar(s: &str) -> String {
    let plain_safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !s.starts_with('-')
        && !s.chars().all(|c| c.is_ascii_digit())
        && !matches!(
            s.to_ascii_lowercase().as_str(),
            "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "y" | "n"
        );
    if plain_safe { s.to_string() } else { quote(s) }
}

/// Whole values print without `.0`; fractions print at full precision.
fn format_num(n: f32) -> String {
    if n.is_nan() {
        ".nan".to_string()
    } else if n == f32::INFINITY {
        ".inf".to_string()
    } else if n == f32::NEG_INFINITY {
        "-.inf".to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
