//! Conversion of storyboard numbers into render units.
//!
//! Positions and sizes in a storyboard are written in one of several logical spaces:
//!
//! - the stage, an `800 x 600` reference canvas ([`ReferenceUnit::StageX`], [`ReferenceUnit::StageY`]),
//! - the note playfield, where `0..=1` spans the area notes can be placed in
//!   ([`ReferenceUnit::NoteX`], [`ReferenceUnit::NoteY`]),
//! - the camera, where `-1..=1` spans the orthographic view ([`ReferenceUnit::CameraX`], [`ReferenceUnit::CameraY`]),
//! - plain world units ([`ReferenceUnit::World`]).
//!
//! Each field has a default space, and a string token `"<unit>:<value>"` can override it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::StoryboardConfig;

/// A logical coordinate space of storyboard numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceUnit {
    /// World units, used verbatim.
    World,
    /// Horizontal stage pixels of the reference canvas.
    StageX,
    /// Vertical stage pixels of the reference canvas.
    StageY,
    /// Horizontal note playfield position.
    NoteX,
    /// Vertical note playfield position.
    NoteY,
    /// Horizontal camera-relative position.
    CameraX,
    /// Vertical camera-relative position.
    CameraY,
}

impl ReferenceUnit {
    const fn is_horizontal(self) -> bool {
        matches!(self, Self::StageX | Self::NoteX | Self::CameraX)
    }

    const fn is_vertical(self) -> bool {
        matches!(self, Self::StageY | Self::NoteY | Self::CameraY)
    }
}

impl FromStr for ReferenceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "world" => Self::World,
            "stagex" => Self::StageX,
            "stagey" => Self::StageY,
            "notex" => Self::NoteX,
            "notey" => Self::NoteY,
            "camerax" => Self::CameraX,
            "cameray" => Self::CameraY,
            _ => return Err(s.to_string()),
        })
    }
}

/// Snapshot of the screen, camera and canvas the storyboard is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen width in pixels.
    pub screen_width: f32,
    /// Screen height in pixels.
    pub screen_height: f32,
    /// Half of the camera's vertical extent, in world units.
    pub orthographic_size: f32,
    /// Width of the render canvas in canvas pixels.
    pub canvas_width: f32,
    /// Height of the render canvas in canvas pixels.
    pub canvas_height: f32,
    /// Fraction of the camera width left empty on each side of the note playfield.
    pub horizontal_margin: f32,
    /// Fraction of the camera height left empty above and below the note playfield.
    pub vertical_margin: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            screen_width: 1920.0,
            screen_height: 1080.0,
            orthographic_size: 5.0,
            canvas_width: 1920.0,
            canvas_height: 1080.0,
            horizontal_margin: 0.1,
            vertical_margin: 0.1,
        }
    }
}

impl Viewport {
    /// Half of the camera's horizontal extent, in world units.
    #[must_use]
    pub fn orthographic_width(&self) -> f32 {
        self.orthographic_size / self.screen_height * self.screen_width
    }

    /// Converts `value` written in `unit` into world units, or into canvas pixels if
    /// `scale_to_canvas` is set.
    #[must_use]
    pub fn convert(
        &self,
        value: f32,
        unit: ReferenceUnit,
        scale_to_canvas: bool,
        config: &StoryboardConfig,
    ) -> f32 {
        let half_width = self.orthographic_width();
        let world = match unit {
            ReferenceUnit::World => value,
            ReferenceUnit::StageX => value / config.reference_width * half_width,
            ReferenceUnit::StageY => value / config.reference_height * self.orthographic_size,
            ReferenceUnit::NoteX => (value * 2.0 - 1.0) * half_width * (1.0 - self.horizontal_margin),
            ReferenceUnit::NoteY => {
                (value * 2.0 - 1.0) * self.orthographic_size * (1.0 - self.vertical_margin)
            }
            ReferenceUnit::CameraX => value * half_width,
            ReferenceUnit::CameraY => value * self.orthographic_size,
        };
        if !scale_to_canvas {
            return world;
        }
        if unit.is_horizontal() {
            world / half_width * self.canvas_width
        } else if unit.is_vertical() {
            world / self.orthographic_size * self.canvas_height
        } else {
            world
        }
    }
}

/// A number token of a storyboard field, before conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberToken {
    /// The written value.
    pub value: f32,
    /// The unit written with it, if any.
    pub unit: Option<ReferenceUnit>,
}

/// Reason a number token could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberTokenError {
    /// The unit prefix is not a known [`ReferenceUnit`].
    UnknownUnit(String),
    /// The token is neither a number nor a numeric string.
    NotANumber,
}

impl NumberToken {
    /// Reads a number token. `null` reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`NumberTokenError`] when the token has a bad shape.
    pub fn parse(token: &Value) -> Result<Option<Self>, NumberTokenError> {
        match token {
            Value::Null => Ok(None),
            Value::Number(number) => number
                .as_f64()
                .map(|value| {
                    Some(Self {
                        value: value as f32,
                        unit: None,
                    })
                })
                .ok_or(NumberTokenError::NotANumber),
            Value::String(text) => {
                let (unit, value) = match text.split_once(':') {
                    Some((unit, value)) => (
                        Some(unit.trim().parse().map_err(NumberTokenError::UnknownUnit)?),
                        value,
                    ),
                    None => (None, text.as_str()),
                };
                let value = value
                    .trim()
                    .parse()
                    .map_err(|_| NumberTokenError::NotANumber)?;
                Ok(Some(Self { value, unit }))
            }
            _ => Err(NumberTokenError::NotANumber),
        }
    }
}
