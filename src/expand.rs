//! Expansion of one declaration into many.
//!
//! A declaration may stand for several objects or states:
//!
//! - an array in `relative_time`, `add_time` or `time` yields one copy per element,
//! - a note selector object in `note` yields one copy per matching chart note.
//!
//! Each field is expanded on its own, there is no cross product between time fields. The note
//! selector then multiplies every time-expanded copy.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde_json::{Map, Value};

use crate::{
    chart::{Chart, ChartNote, NoteType},
    storyboard::StoryboardWarning,
};

/// Fields holding times which may be given as arrays, in expansion order.
pub const TIME_FIELDS: [&str; 3] = ["relative_time", "add_time", "time"];

/// A filter over chart notes by id range and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSelector {
    /// Smallest matching note id.
    pub start: i32,
    /// Largest matching note id, inclusive.
    pub end: i32,
    /// Matching raw note types.
    pub types: BTreeSet<i32>,
}

impl Default for NoteSelector {
    /// Matches every note of every known type.
    fn default() -> Self {
        Self {
            start: i32::MIN,
            end: i32::MAX,
            types: NoteType::ALL.into_iter().map(NoteType::id).collect(),
        }
    }
}

impl NoteSelector {
    /// Reads a selector object `{ "start": .., "end": .., "type": .. }`.
    ///
    /// `type` is a single type id or an array of them. Missing bounds match every id and a
    /// missing `type` matches every known type.
    pub fn from_json(
        selector: &Map<String, Value>,
        warnings: &mut Vec<StoryboardWarning>,
    ) -> Self {
        let mut bound = |key: &str, default: i32| match selector.get(key) {
            None | Some(Value::Null) => default,
            Some(value) => as_i32(value).unwrap_or_else(|| {
                warnings.push(StoryboardWarning::InvalidFieldValue {
                    field: format!("note.{key}"),
                    value: value.to_string(),
                });
                default
            }),
        };
        let start = bound("start", i32::MIN);
        let end = bound("end", i32::MAX);

        let types = match selector.get("type") {
            None | Some(Value::Null) => Self::default().types,
            Some(Value::Array(types)) if types.iter().all(|kind| as_i32(kind).is_some()) => {
                types.iter().filter_map(as_i32).collect()
            }
            Some(kind) => match as_i32(kind) {
                Some(kind) => BTreeSet::from([kind]),
                None => {
                    warnings.push(StoryboardWarning::InvalidNoteSelectorType(kind.to_string()));
                    BTreeSet::new()
                }
            },
        };
        Self { start, end, types }
    }

    /// Whether `note` passes the filter.
    #[must_use]
    pub fn matches(&self, note: &ChartNote) -> bool {
        (self.start..=self.end).contains(&note.id) && self.types.contains(&note.kind)
    }

    /// Matching notes of `chart`, in chart order.
    ///
    /// ```rust
    /// use storyboard_rs::{
    ///     chart::{Chart, ChartNote, NoteType},
    ///     expand::NoteSelector,
    /// };
    ///
    /// let chart = Chart::new(vec![
    ///     ChartNote::tap(1, NoteType::Click, 0.0, 1.0),
    ///     ChartNote::tap(2, NoteType::Flick, 0.5, 1.5),
    /// ])
    /// .unwrap();
    /// let selector = NoteSelector {
    ///     start: 1,
    ///     end: 2,
    ///     types: [NoteType::Flick.id()].into(),
    /// };
    /// let ids: Vec<i32> = selector.select(&chart).map(|note| note.id).collect();
    /// assert_eq!(ids, [2]);
    /// ```
    pub fn select<'c>(&self, chart: &'c Chart) -> impl Iterator<Item = &'c ChartNote> {
        chart.notes().iter().filter(move |note| self.matches(note))
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

/// Expands `declaration` into the declarations it stands for.
///
/// Every returned declaration has a scalar `note`. Time fields are scalar too, unless the
/// declaration had more than one array-valued time field.
///
/// ```rust
/// use serde_json::json;
/// use storyboard_rs::{chart::Chart, expand::expand_declaration};
///
/// let declaration = json!({"id": "a", "time": [1, 2, 3]});
/// let mut warnings = Vec::new();
/// let expanded = expand_declaration(
///     declaration.as_object().unwrap(),
///     &Chart::default(),
///     &mut warnings,
/// );
/// assert_eq!(expanded.len(), 3);
/// assert_eq!(expanded[2]["time"], json!(3));
/// ```
#[must_use]
pub fn expand_declaration(
    declaration: &Map<String, Value>,
    chart: &Chart,
    warnings: &mut Vec<StoryboardWarning>,
) -> Vec<Map<String, Value>> {
    let mut has_time_array = false;
    let mut expanded = Vec::new();
    for field in TIME_FIELDS {
        let Some(Value::Array(times)) = declaration.get(field) else {
            continue;
        };
        has_time_array = true;
        expanded.extend(times.iter().map(|time| {
            let mut copy = declaration.clone();
            copy.insert(field.to_string(), time.clone());
            copy
        }));
    }
    if !has_time_array {
        expanded.push(declaration.clone());
    }

    let Some(Value::Object(selector)) = declaration.get("note") else {
        return expanded;
    };
    let selector = NoteSelector::from_json(selector, warnings);
    let notes: Vec<i32> = selector.select(chart).map(|note| note.id).collect();
    if notes.is_empty() {
        warnings.push(StoryboardWarning::EmptyNoteSelector {
            id: declaration
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
        return Vec::new();
    }
    expanded
        .iter()
        .cartesian_product(&notes)
        .map(|(copy, &note)| {
            let mut copy = copy.clone();
            copy.insert("note".to_string(), Value::from(note));
            copy
        })
        .collect()
}
