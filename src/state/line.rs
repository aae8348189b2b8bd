//! States of poly-lines drawn in note space.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{BaseState, Color, FieldContext, ObjectKind, non_null};
use crate::unit::ReferenceUnit;

/// A vertex of a line, in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LinePosition {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

/// A state of a line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineState {
    /// Shared fields.
    #[serde(flatten)]
    pub base: BaseState,
    /// Vertices, in drawing order.
    pub pos: Option<Vec<LinePosition>>,
    /// Stroke width in world units.
    pub width: Option<f32>,
    /// Stroke colour.
    pub color: Option<Color>,
    /// Opacity in `0..=1`.
    pub opacity: Option<f32>,
    /// Render layer.
    pub layer: Option<i32>,
    /// Order inside the layer.
    pub order: Option<i32>,
}

impl LineState {
    fn overlay_own(
        &mut self,
        fields: &Map<String, Value>,
        _previous: Option<&Self>,
        cx: &mut FieldContext<'_, '_>,
    ) {
        if let Some(pos) = non_null(fields, "pos").and_then(|pos| Self::read_positions(pos, cx)) {
            self.pos = Some(pos);
        }
        if let Some(width) = cx.number(fields, "width", ReferenceUnit::World, false) {
            self.width = Some(width);
        }
        overlay_fields!(self, fields, cx, {
            color: color,
            opacity: float,
            layer: int,
            order: int,
        });
    }

    /// Reads the vertex list, a missing coordinate being `0` in world units.
    fn read_positions(pos: &Value, cx: &mut FieldContext<'_, '_>) -> Option<Vec<LinePosition>> {
        let Some(vertices) = pos.as_array() else {
            cx.invalid("pos", pos);
            return None;
        };
        let mut positions = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            let Some(vertex) = vertex.as_object() else {
                cx.invalid("pos", vertex);
                continue;
            };
            let x = cx.number(vertex, "x", ReferenceUnit::NoteX, false).unwrap_or(0.0);
            let y = cx.number(vertex, "y", ReferenceUnit::NoteY, false).unwrap_or(0.0);
            positions.push(LinePosition { x, y });
        }
        Some(positions)
    }
}

impl_state_kind!(LineState, ObjectKind::Line);
