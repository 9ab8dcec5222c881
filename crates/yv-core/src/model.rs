//! Core data model for the note canvas.
//!
//! A document is an ordered list of `Note` values plus one `CanvasSettings`.
//! Each note carries a `NoteDetail`, a tagged union whose variant *is* the
//! note's type: typed notes always hold a record of the matching shape and
//! `plain`/`memo` notes hold none, so the two can never disagree.

use crate::id::{NoteId, PromptElementId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

// ─── Note kinds ──────────────────────────────────────────────────────────

/// The fixed set of note type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    #[default]
    Plain,
    Character,
    Place,
    Event,
    Item,
    Emotion,
    Memo,
}

impl NoteKind {
    /// All kinds, in selector order.
    pub const ALL: [NoteKind; 7] = [
        NoteKind::Plain,
        NoteKind::Character,
        NoteKind::Place,
        NoteKind::Event,
        NoteKind::Item,
        NoteKind::Emotion,
        NoteKind::Memo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoteKind::Plain => "plain",
            NoteKind::Character => "character",
            NoteKind::Place => "place",
            NoteKind::Event => "event",
            NoteKind::Item => "item",
            NoteKind::Emotion => "emotion",
            NoteKind::Memo => "memo",
        }
    }

    /// Permissive tag lookup: anything unrecognized is a plain note.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "plain" => NoteKind::Plain,
            "character" => NoteKind::Character,
            "place" => NoteKind::Place,
            "event" => NoteKind::Event,
            "item" => NoteKind::Item,
            "emotion" => NoteKind::Emotion,
            "memo" => NoteKind::Memo,
            other => {
                log::debug!("unknown note type {other:?}, treating as plain");
                NoteKind::Plain
            }
        }
    }

    /// Whether notes of this kind carry a detail record.
    pub fn has_detail(self) -> bool {
        !matches!(self, NoteKind::Plain | NoteKind::Memo)
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Detail records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterDetails {
    pub gender: String,
    pub age: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceDetails {
    pub location: String,
    pub atmosphere: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    pub time: String,
    /// One of [`EVENT_IMPORTANCE`] or empty.
    pub importance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDetails {
    pub category: String,
    /// One of [`ITEM_IMPORTANCE`] or empty.
    pub importance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionDetails {
    /// One of [`EMOTION_INTENSITY`] or empty.
    pub intensity: String,
    pub trigger: String,
}

pub const EVENT_IMPORTANCE: &[&str] = &["high", "medium", "low"];
pub const ITEM_IMPORTANCE: &[&str] = &["key", "normal", "background"];
pub const EMOTION_INTENSITY: &[&str] = &["strong", "medium", "weak"];

/// Type-specific payload of a note. The variant determines the note's kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NoteDetail {
    #[default]
    Plain,
    Character(CharacterDetails),
    Place(PlaceDetails),
    Event(EventDetails),
    Item(ItemDetails),
    Emotion(EmotionDetails),
    Memo,
}

impl NoteDetail {
    /// The empty record of the shape matching `kind`.
    pub fn empty_for(kind: NoteKind) -> Self {
        match kind {
            NoteKind::Plain => NoteDetail::Plain,
            NoteKind::Character => NoteDetail::Character(CharacterDetails::default()),
            NoteKind::Place => NoteDetail::Place(PlaceDetails::default()),
            NoteKind::Event => NoteDetail::Event(EventDetails::default()),
            NoteKind::Item => NoteDetail::Item(ItemDetails::default()),
            NoteKind::Emotion => NoteDetail::Emotion(EmotionDetails::default()),
            NoteKind::Memo => NoteDetail::Memo,
        }
    }

    pub fn kind(&self) -> NoteKind {
        match self {
            NoteDetail::Plain => NoteKind::Plain,
            NoteDetail::Character(_) => NoteKind::Character,
            NoteDetail::Place(_) => NoteKind::Place,
            NoteDetail::Event(_) => NoteKind::Event,
            NoteDetail::Item(_) => NoteKind::Item,
            NoteDetail::Emotion(_) => NoteKind::Emotion,
            NoteDetail::Memo => NoteKind::Memo,
        }
    }

    /// The YAML/JSON key the record is stored under (`characterDetails`, ...).
    pub fn block_name(&self) -> Option<&'static str> {
        match self {
            NoteDetail::Plain | NoteDetail::Memo => None,
            NoteDetail::Character(_) => Some("characterDetails"),
            NoteDetail::Place(_) => Some("placeDetails"),
            NoteDetail::Event(_) => Some("eventDetails"),
            NoteDetail::Item(_) => Some("itemDetails"),
            NoteDetail::Emotion(_) => Some("emotionDetails"),
        }
    }

    /// Field name/value pairs of the record, in output order.
    pub fn fields(&self) -> SmallVec<[(DetailField, &str); 2]> {
        let mut out = SmallVec::new();
        match self {
            NoteDetail::Plain | NoteDetail::Memo => {}
            NoteDetail::Character(d) => {
                out.push((DetailField::Gender, d.gender.as_str()));
                out.push((DetailField::Age, d.age.as_str()));
            }
            NoteDetail::Place(d) => {
                out.push((DetailField::Location, d.location.as_str()));
                out.push((DetailField::Atmosphere, d.atmosphere.as_str()));
            }
            NoteDetail::Event(d) => {
                out.push((DetailField::Time, d.time.as_str()));
                out.push((DetailField::Importance, d.importance.as_str()));
            }
            NoteDetail::Item(d) => {
                out.push((DetailField::Category, d.category.as_str()));
                out.push((DetailField::Importance, d.importance.as_str()));
            }
            NoteDetail::Emotion(d) => {
                out.push((DetailField::Intensity, d.intensity.as_str()));
                out.push((DetailField::Trigger, d.trigger.as_str()));
            }
        }
        out
    }

    /// Mutable access to one field, if this record has it.
    pub fn field_mut(&mut self, field: DetailField) -> Option<&mut String> {
        match (self, field) {
            (NoteDetail::Character(d), DetailField::Gender) => Some(&mut d.gender),
            (NoteDetail::Character(d), DetailField::Age) => Some(&mut d.age),
            (NoteDetail::Place(d), DetailField::Location) => Some(&mut d.location),
            (NoteDetail::Place(d), DetailField::Atmosphere) => Some(&mut d.atmosphere),
            (NoteDetail::Event(d), DetailField::Time) => Some(&mut d.time),
            (NoteDetail::Event(d), DetailField::Importance) => Some(&mut d.importance),
            (NoteDetail::Item(d), DetailField::Category) => Some(&mut d.category),
            (NoteDetail::Item(d), DetailField::Importance) => Some(&mut d.importance),
            (NoteDetail::Emotion(d), DetailField::Intensity) => Some(&mut d.intensity),
            (NoteDetail::Emotion(d), DetailField::Trigger) => Some(&mut d.trigger),
            _ => None,
        }
    }

    /// The fixed value set for an enumerated field of this record, if any.
    pub fn allowed_values(&self, field: DetailField) -> Option<&'static [&'static str]> {
        match (self, field) {
            (NoteDetail::Event(_), DetailField::Importance) => Some(EVENT_IMPORTANCE),
            (NoteDetail::Item(_), DetailField::Importance) => Some(ITEM_IMPORTANCE),
            (NoteDetail::Emotion(_), DetailField::Intensity) => Some(EMOTION_INTENSITY),
            _ => None,
        }
    }
}

/// Names of the editable detail fields across all record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    Gender,
    Age,
    Location,
    Atmosphere,
    Time,
    Importance,
    Category,
    Intensity,
    Trigger,
}

impl DetailField {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailField::Gender => "gender",
            DetailField::Age => "age",
            DetailField::Location => "location",
            DetailField::Atmosphere => "atmosphere",
            DetailField::Time => "time",
            DetailField::Importance => "importance",
            DetailField::Category => "category",
            DetailField::Intensity => "intensity",
            DetailField::Trigger => "trigger",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "gender" => DetailField::Gender,
            "age" => DetailField::Age,
            "location" => DetailField::Location,
            "atmosphere" => DetailField::Atmosphere,
            "time" => DetailField::Time,
            "importance" => DetailField::Importance,
            "category" => DetailField::Category,
            "intensity" => DetailField::Intensity,
            "trigger" => DetailField::Trigger,
            _ => return None,
        })
    }
}

// ─── Notes ───────────────────────────────────────────────────────────────

/// A single sticky note on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NoteRecord", into = "NoteRecord")]
pub struct Note {
    pub id: NoteId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub content: String,
    pub detail: NoteDetail,
}

impl Note {
    pub fn kind(&self) -> NoteKind {
        self.detail.kind()
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Flat storage shape of a note: a `type` tag plus one optional record per
/// typed kind. Only the record matching `type` is read back.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteRecord {
    id: NoteId,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    character_details: Option<CharacterDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    place_details: Option<PlaceDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_details: Option<EventDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_details: Option<ItemDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    emotion_details: Option<EmotionDetails>,
}

impl From<NoteRecord> for Note {
    fn from(r: NoteRecord) -> Self {
        let detail = match NoteKind::from_tag(&r.kind) {
            NoteKind::Plain => NoteDetail::Plain,
            NoteKind::Memo => NoteDetail::Memo,
            NoteKind::Character => NoteDetail::Character(r.character_details.unwrap_or_default()),
            NoteKind::Place => NoteDetail::Place(r.place_details.unwrap_or_default()),
            NoteKind::Event => NoteDetail::Event(r.event_details.unwrap_or_default()),
            NoteKind::Item => NoteDetail::Item(r.item_details.unwrap_or_default()),
            NoteKind::Emotion => NoteDetail::Emotion(r.emotion_details.unwrap_or_default()),
        };
        Note {
            id: r.id,
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            content: r.content,
            detail,
        }
    }
}

impl From<Note> for NoteRecord {
    fn from(n: Note) -> Self {
        let mut r = NoteRecord {
            id: n.id,
            x: n.x,
            y: n.y,
            width: n.width,
            height: n.height,
            kind: n.kind().as_str().to_string(),
            content: n.content,
            character_details: None,
            place_details: None,
            event_details: None,
            item_details: None,
            emotion_details: None,
        };
        match n.detail {
            NoteDetail::Plain | NoteDetail::Memo => {}
            NoteDetail::Character(d) => r.character_details = Some(d),
            NoteDetail::Place(d) => r.place_details = Some(d),
            NoteDetail::Event(d) => r.event_details = Some(d),
            NoteDetail::Item(d) => r.item_details = Some(d),
            NoteDetail::Emotion(d) => r.emotion_details = Some(d),
        }
        r
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

/// Canvas aspect-ratio selection. Text form: `"W:H"` or `"custom"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectRatio {
    Ratio { w: u32, h: u32 },
    Custom,
}

impl AspectRatio {
    pub const WIDE: AspectRatio = AspectRatio::Ratio { w: 16, h: 9 };
    pub const STANDARD: AspectRatio = AspectRatio::Ratio { w: 4, h: 3 };
    pub const SQUARE: AspectRatio = AspectRatio::Ratio { w: 1, h: 1 };

    /// The selector options, in order.
    pub const PRESETS: [AspectRatio; 4] = [
        AspectRatio::WIDE,
        AspectRatio::STANDARD,
        AspectRatio::SQUARE,
        AspectRatio::Custom,
    ];

    pub fn is_custom(self) -> bool {
        matches!(self, AspectRatio::Custom)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::WIDE
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Ratio { w, h } => write!(f, "{w}:{h}"),
            AspectRatio::Custom => f.write_str("custom"),
        }
    }
}

fn parse_ratio_term(input: &mut &str) -> ModalResult<u32> {
    let digits: &str = take_while(1..=6, |c: char| c.is_ascii_digit()).parse_next(input)?;
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(winnow::error::ErrMode::Backtrack(ContextError::new())),
    }
}

fn parse_aspect_ratio(input: &mut &str) -> ModalResult<AspectRatio> {
    alt((
        "custom".value(AspectRatio::Custom),
        (parse_ratio_term, ':', parse_ratio_term).map(|(w, _, h)| AspectRatio::Ratio { w, h }),
    ))
    .parse_next(input)
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_aspect_ratio
            .parse(s.trim())
            .map_err(|_| format!("invalid aspect ratio {s:?}, expected \"W:H\" or \"custom\""))
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(a: AspectRatio) -> Self {
        a.to_string()
    }
}

/// A canvas-global category/value pair, not attached to any note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptElement {
    pub id: PromptElementId,
    pub category: String,
    pub value: String,
}

/// Canvas dimensions and canvas-wide metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettings {
    pub aspect_ratio: AspectRatio,
    pub width: f32,
    pub height: f32,
    /// Only set when `aspect_ratio` is `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_width: Option<f32>,
    /// Only set when `aspect_ratio` is `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_height: Option<f32>,
    #[serde(default)]
    pub prompt_elements: SmallVec<[PromptElement; 4]>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::WIDE,
            width: 800.0,
            height: 450.0,
            custom_width: None,
            custom_height: None,
            prompt_elements: SmallVec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_roundtrip() {
        for kind in NoteKind::ALL {
            assert_eq!(NoteKind::from_tag(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_tag_is_plain() {
        assert_eq!(NoteKind::from_tag("sticker"), NoteKind::Plain);
        assert_eq!(NoteKind::from_tag(""), NoteKind::Plain);
    }

    #[test]
    fn detail_matches_kind() {
        for kind in NoteKind::ALL {
            let detail = NoteDetail::empty_for(kind);
            assert_eq!(detail.kind(), kind);
            assert_eq!(detail.block_name().is_some(), kind.has_detail());
        }
    }

    #[test]
    fn field_mut_rejects_foreign_fields() {
        let mut detail = NoteDetail::empty_for(NoteKind::Character);
        assert!(detail.field_mut(DetailField::Gender).is_some());
        assert!(detail.field_mut(DetailField::Location).is_none());
        assert!(NoteDetail::Plain.fields().is_empty());
    }

    #[test]
    fn allowed_values_only_on_enumerated_fields() {
        let event = NoteDetail::empty_for(NoteKind::Event);
        assert_eq!(event.allowed_values(DetailField::Importance), Some(EVENT_IMPORTANCE));
        assert_eq!(event.allowed_values(DetailField::Time), None);
        let emotion = NoteDetail::empty_for(NoteKind::Emotion);
        assert_eq!(
            emotion.allowed_values(DetailField::Intensity),
            Some(EMOTION_INTENSITY)
        );
    }

    #[test]
    fn parse_aspect_ratios() {
        assert_eq!("16:9".parse::<AspectRatio>(), Ok(AspectRatio::WIDE));
        assert_eq!(" 4:3 ".parse::<AspectRatio>(), Ok(AspectRatio::STANDARD));
        assert_eq!("custom".parse::<AspectRatio>(), Ok(AspectRatio::Custom));
        assert_eq!(
            "21:9".parse::<AspectRatio>(),
            Ok(AspectRatio::Ratio { w: 21, h: 9 })
        );
    }

    #[test]
    fn reject_bad_aspect_ratios() {
        assert!("0:9".parse::<AspectRatio>().is_err());
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("16:".parse::<AspectRatio>().is_err());
        assert!("".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn aspect_ratio_display() {
        assert_eq!(AspectRatio::WIDE.to_string(), "16:9");
        assert_eq!(AspectRatio::Custom.to_string(), "custom");
    }

    #[test]
    fn note_json_uses_type_tag_and_detail_key() {
        let note = Note {
            id: NoteId(3),
            x: 10.0,
            y: 20.0,
            width: 250.0,
            height: 150.0,
            content: "hero".into(),
            detail: NoteDetail::Character(CharacterDetails {
                gender: "f".into(),
                age: "30".into(),
            }),
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["type"], "character");
        assert_eq!(value["characterDetails"]["age"], "30");
        assert!(value.get("placeDetails").is_none());

        let back: Note = serde_json::from_value(value).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn note_json_with_unknown_type_loads_as_plain() {
        let json = r#"{"id":1,"x":0,"y":0,"width":100,"height":100,"type":"sticker","content":"a"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.kind(), NoteKind::Plain);
    }

    #[test]
    fn note_json_missing_detail_gets_empty_record() {
        let json = r#"{"id":1,"x":0,"y":0,"width":100,"height":100,"type":"place"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.detail, NoteDetail::Place(PlaceDetails::default()));
    }
}
