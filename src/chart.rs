//! Chart provider consumed by the storyboard.
//!
//! The storyboard never simulates notes itself. It only needs to know, for every note of the
//! chart being played, its id, its type and the three moments of its life:
//!
//! - `intro_time`: the note starts appearing on screen,
//! - `start_time`: the note should be hit,
//! - `end_time`: the note ends (equal to `start_time` unless it is a hold note).
//!
//! [`Chart`] keeps the notes in chart order and indexes them by id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of a chart note.
///
/// The storyboard works on the raw integer ids (selectors list them as numbers), this enum names
/// them and provides the set used when a selector omits `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum NoteType {
    /// Tap note.
    Click = 0,
    /// Hold note.
    Hold = 1,
    /// Hold note spanning several pages.
    LongHold = 2,
    /// First note of a drag chain.
    DragHead = 3,
    /// Following note of a drag chain.
    DragChild = 4,
    /// Flick note.
    Flick = 5,
    /// First note of a click-drag chain.
    CDragHead = 6,
    /// Following note of a click-drag chain.
    CDragChild = 7,
}

impl NoteType {
    /// All known note types, in id order.
    pub const ALL: [Self; 8] = [
        Self::Click,
        Self::Hold,
        Self::LongHold,
        Self::DragHead,
        Self::DragChild,
        Self::Flick,
        Self::CDragHead,
        Self::CDragChild,
    ];

    /// The integer id used in chart and storyboard files.
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for NoteType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == value)
            .ok_or(value)
    }
}

/// A note of the chart, as seen by the storyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartNote {
    /// Unique id of the note inside its chart.
    pub id: i32,
    /// Raw note type id, see [`NoteType`].
    #[serde(rename = "type", default)]
    pub kind: i32,
    /// Seconds when the note starts to appear.
    pub intro_time: f32,
    /// Seconds when the note should be hit.
    pub start_time: f32,
    /// Seconds when the note ends.
    pub end_time: f32,
}

impl ChartNote {
    /// Creates a note whose `end_time` equals its `start_time`.
    #[must_use]
    pub const fn tap(id: i32, kind: NoteType, intro_time: f32, start_time: f32) -> Self {
        Self {
            id,
            kind: kind.id(),
            intro_time,
            start_time,
            end_time: start_time,
        }
    }

    /// The note type, if the raw id is a known one.
    #[must_use]
    pub fn note_type(&self) -> Option<NoteType> {
        NoteType::try_from(self.kind).ok()
    }
}

/// An error occurred when loading a chart from JSON.
#[derive(Debug, Error)]
pub enum ChartLoadError {
    /// The chart text is not a JSON document of the expected shape.
    #[error("chart at `{path}`: {source}")]
    Json {
        /// Path to the element that failed to deserialize.
        path: String,
        /// The underlying error.
        source: serde_json::Error,
    },
    /// Two notes share the same id.
    #[error("duplicated note id {0}")]
    DuplicatedNote(i32),
}

#[derive(Deserialize)]
struct ChartFile {
    note_list: Vec<ChartNote>,
}

/// Ordered note list of a chart with an id index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    notes: Vec<ChartNote>,
    by_id: HashMap<i32, usize>,
}

impl Chart {
    /// Creates a chart from notes in chart order.
    ///
    /// # Errors
    ///
    /// Returns [`ChartLoadError::DuplicatedNote`] if two notes share an id.
    pub fn new(notes: Vec<ChartNote>) -> Result<Self, ChartLoadError> {
        let mut by_id = HashMap::with_capacity(notes.len());
        for (index, note) in notes.iter().enumerate() {
            if by_id.insert(note.id, index).is_some() {
                return Err(ChartLoadError::DuplicatedNote(note.id));
            }
        }
        Ok(Self { notes, by_id })
    }

    /// Loads a chart from a JSON document having a `note_list` array.
    ///
    /// # Errors
    ///
    /// Returns [`ChartLoadError`] when the document is malformed or has duplicated note ids.
    pub fn from_json_str(source: &str) -> Result<Self, ChartLoadError> {
        let de = &mut serde_json::Deserializer::from_str(source);
        let file: ChartFile =
            serde_path_to_error::deserialize(de).map_err(|err| ChartLoadError::Json {
                path: err.path().to_string(),
                source: err.into_inner(),
            })?;
        Self::new(file.note_list)
    }

    /// Notes in chart order.
    #[must_use]
    pub fn notes(&self) -> &[ChartNote] {
        &self.notes
    }

    /// Looks up a note by its id.
    #[must_use]
    pub fn note(&self, id: i32) -> Option<&ChartNote> {
        self.by_id.get(&id).and_then(|&index| self.notes.get(index))
    }

    /// Number of notes in the chart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the chart has no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
