//! Resolution of time expressions.
//!
//! A time token is one of:
//!
//! - a number, used verbatim as seconds,
//! - `null`, meaning "not given here",
//! - a string `"<phase>:<note>[:<offset>]"` anchored on a chart note.
//!
//! `phase` is one of `intro`, `start`, `end` and `at`. `note` is a note id or the placeholder
//! `$note`. The optional offset is added to the phase time, except for `at` where it is the
//! fraction of the way from the note start to its end.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::chart::Chart;

/// Time of a state which is never reached.
pub const UNSET_TIME: f32 = f32::INFINITY;

const NOTE_PLACEHOLDER: &str = "note";

/// An error occurred when resolving a time expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum TimeError {
    /// The phase keyword is not one of `intro`, `start`, `end` and `at`.
    #[error("unknown time phase `{0}`")]
    UnknownPhase(String),
    /// The expression references a note the chart does not have.
    #[error("note {0} is not in the chart")]
    UnknownNote(i32),
    /// `$note` was used with no enclosing or previously bound note.
    #[error("`${0}` is used but no note is bound to it")]
    UnboundPlaceholder(String),
    /// A `$` placeholder other than `$note`.
    #[error("unknown placeholder `${0}`")]
    UnknownPlaceholder(String),
    /// The token has a shape that is not a time expression.
    #[error("malformed time expression `{0}`")]
    Malformed(String),
}

/// Point of a note's life a time expression is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotePhase {
    /// The note starts to appear.
    Intro,
    /// The note should be hit.
    Start,
    /// The note ends.
    End,
    /// A fraction of the way between start and end.
    At,
}

impl FromStr for NotePhase {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "intro" => Self::Intro,
            "start" => Self::Start,
            "end" => Self::End,
            "at" => Self::At,
            _ => return Err(TimeError::UnknownPhase(s.to_string())),
        })
    }
}

/// Note reference of a time expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoteRef {
    /// A literal note id.
    Id(i32),
    /// A `$name` placeholder.
    Placeholder(String),
}

/// A parsed time token.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeExpr {
    /// Absolute seconds.
    Seconds(f32),
    /// A time anchored on a chart note.
    Note {
        /// Which moment of the note.
        phase: NotePhase,
        /// Which note.
        note: NoteRef,
        /// Additive seconds, or the fraction for [`NotePhase::At`].
        offset: f32,
    },
}

impl TimeExpr {
    /// Parses a time token. `null` parses as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] if the token is not a number, `null` or a well formed note expression.
    pub fn parse(token: &Value) -> Result<Option<Self>, TimeError> {
        match token {
            Value::Null => Ok(None),
            Value::Number(number) => number
                .as_f64()
                .map(|seconds| Some(Self::Seconds(seconds as f32)))
                .ok_or_else(|| TimeError::Malformed(number.to_string())),
            Value::String(text) => text.parse().map(Some),
            other => Err(TimeError::Malformed(other.to_string())),
        }
    }
}

impl FromStr for TimeExpr {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeError::Malformed(s.to_string());
        let mut segments = s.split(':');
        let phase = segments.next().ok_or_else(malformed)?;
        let note = segments.next().ok_or_else(malformed)?.trim();
        let offset = segments
            .next()
            .map(|offset| offset.trim().parse::<f32>().map_err(|_| malformed()))
            .transpose()?
            .unwrap_or(0.0);
        if segments.next().is_some() {
            return Err(malformed());
        }
        let phase = phase.trim().parse()?;
        let note = match note.strip_prefix('$') {
            Some(name) => NoteRef::Placeholder(name.to_string()),
            None => NoteRef::Id(note.parse().map_err(|_| malformed())?),
        };
        Ok(Self::Note {
            phase,
            note,
            offset,
        })
    }
}

/// Resolves time tokens against a chart.
///
/// The resolver remembers the last note bound to `$note`, so that nested states without a note
/// of their own keep referring to the note of their enclosing declaration.
#[derive(Debug)]
pub struct TimeResolver<'a> {
    chart: &'a Chart,
    replacements: HashMap<String, i32>,
}

impl<'a> TimeResolver<'a> {
    /// Creates a resolver with an empty replacement table.
    #[must_use]
    pub fn new(chart: &'a Chart) -> Self {
        Self {
            chart,
            replacements: HashMap::new(),
        }
    }

    /// Binds `$note` to `note` for the following resolutions.
    pub fn bind_note(&mut self, note: i32) {
        self.replacements.insert(NOTE_PLACEHOLDER.to_string(), note);
    }

    /// The note currently bound to `$note`.
    #[must_use]
    pub fn bound_note(&self) -> Option<i32> {
        self.replacements.get(NOTE_PLACEHOLDER).copied()
    }

    /// Resolves `token` in the context of the declaration `scope`.
    ///
    /// A missing or `null` token resolves to `None`, letting the caller pick its fallback.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] for malformed expressions, unknown phases or notes, and unbound placeholders.
    pub fn resolve(
        &mut self,
        scope: &Map<String, Value>,
        token: Option<&Value>,
    ) -> Result<Option<f32>, TimeError> {
        let Some(expr) = token.map(TimeExpr::parse).transpose()?.flatten() else {
            return Ok(None);
        };
        self.evaluate(scope, &expr).map(Some)
    }

    /// Evaluates a parsed expression in the context of the declaration `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] for unknown notes and unbound placeholders.
    pub fn evaluate(&mut self, scope: &Map<String, Value>, expr: &TimeExpr) -> Result<f32, TimeError> {
        let (phase, note, offset) = match expr {
            TimeExpr::Seconds(seconds) => return Ok(*seconds),
            TimeExpr::Note {
                phase,
                note,
                offset,
            } => (*phase, note, *offset),
        };
        let id = match note {
            NoteRef::Id(id) => *id,
            NoteRef::Placeholder(name) => self.placeholder(scope, name)?,
        };
        let note = self.chart.note(id).ok_or(TimeError::UnknownNote(id))?;
        Ok(match phase {
            NotePhase::Intro => note.intro_time + offset,
            NotePhase::Start => note.start_time + offset,
            NotePhase::End => note.end_time + offset,
            NotePhase::At => note.start_time + (note.end_time - note.start_time) * offset,
        })
    }

    fn placeholder(&mut self, scope: &Map<String, Value>, name: &str) -> Result<i32, TimeError> {
        if name != NOTE_PLACEHOLDER {
            return Err(TimeError::UnknownPlaceholder(name.to_string()));
        }
        if let Some(id) = scalar_note(scope) {
            self.bind_note(id);
            return Ok(id);
        }
        self.bound_note()
            .ok_or_else(|| TimeError::UnboundPlaceholder(name.to_string()))
    }
}

/// The `note` field of a declaration, if it is a single note id.
pub(crate) fn scalar_note(scope: &Map<String, Value>) -> Option<i32> {
    scope
        .get("note")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}
