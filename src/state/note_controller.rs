//! States of note controllers, which override how a single chart note is drawn.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{BaseState, Color, FieldContext, ObjectKind};
use crate::unit::ReferenceUnit;

/// A state of a note controller.
///
/// Positions are in world units, converted from note playfield space.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteControllerState {
    /// Shared fields.
    #[serde(flatten)]
    pub base: BaseState,
    /// Id of the controlled note.
    pub note: Option<i32>,
    /// Whether `x` replaces the note's own position.
    pub override_x: Option<bool>,
    /// Horizontal position.
    pub x: Option<f32>,
    /// Whether `y` replaces the note's own position.
    pub override_y: Option<bool>,
    /// Vertical position.
    pub y: Option<f32>,
    /// Rotation in degrees.
    pub rot: Option<f32>,
    /// Whether `ring_color` replaces the note's ring colour.
    pub override_ring_color: Option<bool>,
    /// Ring colour.
    pub ring_color: Option<Color>,
    /// Whether `fill_color` replaces the note's fill colour.
    pub override_fill_color: Option<bool>,
    /// Fill colour.
    pub fill_color: Option<Color>,
    /// Multiplier of the note opacity.
    pub opacity_multiplier: Option<f32>,
    /// Multiplier of the note size.
    pub size_multiplier: Option<f32>,
    /// Direction of hold notes, `1` or `-1`.
    pub hold_direction: Option<i32>,
    /// Note skin style.
    pub style: Option<i32>,
}

impl NoteControllerState {
    fn overlay_own(
        &mut self,
        fields: &Map<String, Value>,
        _previous: Option<&Self>,
        cx: &mut FieldContext<'_, '_>,
    ) {
        overlay_fields!(self, fields, cx, {
            note: int,
            override_x: boolean,
        });
        if let Some(x) = cx.number(fields, "x", ReferenceUnit::NoteX, false) {
            self.x = Some(x);
        }
        overlay_fields!(self, fields, cx, { override_y: boolean });
        if let Some(y) = cx.number(fields, "y", ReferenceUnit::NoteY, false) {
            self.y = Some(y);
        }
        overlay_fields!(self, fields, cx, { rot: float });

        // `override_color` and `color` drive both the ring and the fill.
        if let Some(override_color) = cx.boolean(fields, "override_color") {
            self.override_ring_color = Some(override_color);
            self.override_fill_color = Some(override_color);
        }
        if let Some(color) = cx.color(fields, "color") {
            self.ring_color = Some(color);
            self.fill_color = Some(color);
        }

        overlay_fields!(self, fields, cx, {
            opacity_multiplier: float,
            size_multiplier: float,
            hold_direction: int,
            style: int,
        });
    }
}

impl_state_kind!(NoteControllerState, ObjectKind::NoteController);
