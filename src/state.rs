//! Compiled object states.
//!
//! Every timeline object is a list of states of one kind. A state only stores the fields its
//! declaration (or an earlier state of the same object) set; unset fields stay `None` so that a
//! renderer can tell "not animated" from "animated to zero".
//!
//! States are built by overlaying JSON declarations onto a copy of the previous state, field by
//! field: a field absent or `null` in the declaration keeps the copied value.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    config::StoryboardConfig,
    easing::Easing,
    storyboard::{StoryboardError, StoryboardWarning},
    time::{TimeError, TimeResolver, UNSET_TIME},
    unit::{NumberToken, NumberTokenError, ReferenceUnit, Viewport},
};

/// Copies every listed field read from the declaration into the state, leaving absent ones untouched.
macro_rules! overlay_fields {
    ($state:expr, $fields:expr, $cx:expr, { $($field:ident: $read:ident),* $(,)? }) => {
        $(
            if let Some(value) = $cx.$read($fields, stringify!($field)) {
                $state.$field = Some(value);
            }
        )*
    };
}

/// Implements [`StateKind`] for a state struct with a `base` field and an `overlay_own` method.
macro_rules! impl_state_kind {
    ($state:ty, $kind:expr) => {
        impl $crate::state::StateKind for $state {
            const KIND: $crate::state::ObjectKind = $kind;

            fn base(&self) -> &$crate::state::BaseState {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::state::BaseState {
                &mut self.base
            }

            fn overlay(
                &mut self,
                fields: &serde_json::Map<String, serde_json::Value>,
                previous: Option<&Self>,
                cx: &mut $crate::state::FieldContext<'_, '_>,
            ) -> Result<(), $crate::time::TimeError> {
                self.base.overlay(fields, cx)?;
                self.overlay_own(fields, previous, cx);
                Ok(())
            }
        }
    };
}

pub mod canvas;
pub mod color;
pub mod controller;
pub mod line;
pub mod note_controller;
pub mod sprite;
pub mod text;

pub use self::{
    canvas::CanvasState,
    color::Color,
    controller::ControllerState,
    line::{LinePosition, LineState},
    note_controller::NoteControllerState,
    sprite::SpriteState,
    text::TextState,
};

/// The kinds of timeline objects a storyboard declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ObjectKind {
    /// Text on the stage canvas.
    Text,
    /// Image on the stage canvas.
    Sprite,
    /// Camera, UI and post-processing controller.
    Controller,
    /// Per-note overlay.
    NoteController,
    /// Poly-line in note space.
    Line,
}

impl ObjectKind {
    /// All kinds, in the order their sections are compiled.
    pub const ALL: [Self; 5] = [
        Self::Text,
        Self::Sprite,
        Self::Controller,
        Self::NoteController,
        Self::Line,
    ];

    /// Name of the document section declaring objects of this kind.
    #[must_use]
    pub const fn section(self) -> &'static str {
        match self {
            Self::Text => "texts",
            Self::Sprite => "sprites",
            Self::Controller => "controllers",
            Self::NoteController => "note_controllers",
            Self::Line => "lines",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

impl FromStr for ObjectKind {
    type Err = StoryboardError;

    /// Parses a section name such as `texts` or `note_controllers`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.section() == s)
            .ok_or_else(|| StoryboardError::UnknownObjectKind(s.to_string()))
    }
}

/// Fields shared by the states of every kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseState {
    /// Absolute seconds of the state, [`UNSET_TIME`] if the state is never reached.
    pub time: f32,
    /// Curve used to move from the previous state into this one.
    pub easing: Easing,
    /// Whether the object is destroyed when this state is reached.
    pub destroy: bool,
    /// `relative_time` the time was computed from, if any.
    pub relative_time: Option<f32>,
    /// `add_time` the time was computed from, if any.
    pub add_time: Option<f32>,
}

impl Default for BaseState {
    fn default() -> Self {
        Self {
            time: UNSET_TIME,
            easing: Easing::Linear,
            destroy: false,
            relative_time: None,
            add_time: None,
        }
    }
}

impl BaseState {
    /// Whether the state has a reachable time.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.time.is_finite()
    }

    /// Clears the fields which describe a single state and are never carried to the next one.
    pub(crate) fn forget_transition(&mut self) {
        self.easing = Easing::Linear;
        self.relative_time = None;
        self.add_time = None;
    }

    fn overlay(
        &mut self,
        fields: &Map<String, Value>,
        cx: &mut FieldContext<'_, '_>,
    ) -> Result<(), TimeError> {
        if let Some(time) = cx.time(fields, "time")? {
            self.time = time;
        }
        if let Some(easing) = cx.easing(fields) {
            self.easing = easing;
        }
        if let Some(destroy) = cx.boolean(fields, "destroy") {
            self.destroy = destroy;
        }
        Ok(())
    }
}

/// A state of one object kind.
pub trait StateKind: Clone + Default + fmt::Debug + Serialize {
    /// The kind of objects having these states.
    const KIND: ObjectKind;

    /// Fields shared by every kind.
    fn base(&self) -> &BaseState;

    /// Mutable access to the fields shared by every kind.
    fn base_mut(&mut self) -> &mut BaseState;

    /// Overwrites the fields set in `fields`.
    ///
    /// `previous` is the state this one continues from, used by delta fields such as `dx`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the `time` field cannot be resolved.
    fn overlay(
        &mut self,
        fields: &Map<String, Value>,
        previous: Option<&Self>,
        cx: &mut FieldContext<'_, '_>,
    ) -> Result<(), TimeError>;

    /// Absolute seconds of the state.
    fn time(&self) -> f32 {
        self.base().time
    }
}

/// Everything a state needs while reading its declaration.
pub struct FieldContext<'c, 'a> {
    pub(crate) resolver: &'c mut TimeResolver<'a>,
    pub(crate) viewport: &'c Viewport,
    pub(crate) config: &'c StoryboardConfig,
    pub(crate) warnings: &'c mut Vec<StoryboardWarning>,
}

impl FieldContext<'_, '_> {
    fn invalid(&mut self, field: &str, value: &Value) {
        self.warnings.push(StoryboardWarning::InvalidFieldValue {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    pub(crate) fn time(
        &mut self,
        fields: &Map<String, Value>,
        key: &str,
    ) -> Result<Option<f32>, TimeError> {
        self.resolver.resolve(fields, fields.get(key))
    }

    pub(crate) fn easing(&mut self, fields: &Map<String, Value>) -> Option<Easing> {
        let value = non_null(fields, "easing")?;
        let Some(name) = value.as_str() else {
            self.invalid("easing", value);
            return None;
        };
        match name.parse() {
            Ok(easing) => Some(easing),
            Err(name) => {
                self.warnings.push(StoryboardWarning::UnknownEasing(name));
                None
            }
        }
    }

    pub(crate) fn float(&mut self, fields: &Map<String, Value>, key: &str) -> Option<f32> {
        let value = non_null(fields, key)?;
        let parsed = match value {
            Value::Number(number) => number.as_f64().map(|n| n as f32),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.invalid(key, value);
        }
        parsed
    }

    /// Reads an integer, warning on fractional or out of range values.
    pub(crate) fn int(&mut self, fields: &Map<String, Value>, key: &str) -> Option<i32> {
        let value = non_null(fields, key)?;
        let parsed = match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|n| n.fract() == 0.0)
                        .map(|n| n as i64)
                })
                .and_then(|n| i32::try_from(n).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.invalid(key, value);
        }
        parsed
    }

    pub(crate) fn boolean(&mut self, fields: &Map<String, Value>, key: &str) -> Option<bool> {
        let value = non_null(fields, key)?;
        let parsed = value.as_bool();
        if parsed.is_none() {
            self.invalid(key, value);
        }
        parsed
    }

    pub(crate) fn string(&mut self, fields: &Map<String, Value>, key: &str) -> Option<String> {
        match non_null(fields, key)? {
            Value::String(text) => Some(text.clone()),
            value @ (Value::Number(_) | Value::Bool(_)) => Some(value.to_string()),
            value => {
                self.invalid(key, value);
                None
            }
        }
    }

    pub(crate) fn color(&mut self, fields: &Map<String, Value>, key: &str) -> Option<Color> {
        let value = non_null(fields, key)?;
        self.parse_color(key, value)
    }

    pub(crate) fn parse_color(&mut self, key: &str, value: &Value) -> Option<Color> {
        let parsed = value.as_str().and_then(|text| text.parse().ok());
        if parsed.is_none() {
            self.warnings.push(StoryboardWarning::InvalidColor {
                field: key.to_string(),
                value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
            });
        }
        parsed
    }

    /// Reads a positional number and converts it from its unit.
    pub(crate) fn number(
        &mut self,
        fields: &Map<String, Value>,
        key: &str,
        default_unit: ReferenceUnit,
        scale_to_canvas: bool,
    ) -> Option<f32> {
        let value = non_null(fields, key)?;
        match NumberToken::parse(value) {
            Ok(token) => token.map(|NumberToken { value, unit }| {
                self.viewport.convert(
                    value,
                    unit.unwrap_or(default_unit),
                    scale_to_canvas,
                    self.config,
                )
            }),
            Err(NumberTokenError::UnknownUnit(unit)) => {
                self.warnings.push(StoryboardWarning::UnknownReferenceUnit {
                    field: key.to_string(),
                    unit,
                });
                None
            }
            Err(NumberTokenError::NotANumber) => {
                self.invalid(key, value);
                None
            }
        }
    }
}

/// The value of `key`, treating `null` as absent.
pub(crate) fn non_null<'v>(fields: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    fields.get(key).filter(|value| !value.is_null())
}
