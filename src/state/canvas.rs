//! Fields of objects placed on the stage canvas.

use serde::Serialize;
use serde_json::{Map, Value};

use super::FieldContext;
use crate::unit::ReferenceUnit;

/// Transform and layout shared by texts and sprites.
///
/// Positions and sizes are stored in canvas pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanvasState {
    /// Horizontal position.
    pub x: Option<f32>,
    /// Vertical position.
    pub y: Option<f32>,
    /// Rotation around the x axis, in degrees.
    pub rot_x: Option<f32>,
    /// Rotation around the y axis, in degrees.
    pub rot_y: Option<f32>,
    /// Rotation around the z axis, in degrees.
    pub rot_z: Option<f32>,
    /// Horizontal scale.
    pub scale_x: Option<f32>,
    /// Vertical scale.
    pub scale_y: Option<f32>,
    /// Opacity in `0..=1`.
    pub opacity: Option<f32>,
    /// Width.
    pub width: Option<f32>,
    /// Height.
    pub height: Option<f32>,
    /// Whether the object stretches to the canvas width.
    pub fill_width: Option<bool>,
    /// Render layer.
    pub layer: Option<i32>,
    /// Order inside the layer.
    pub order: Option<i32>,
}

impl CanvasState {
    pub(crate) fn overlay(
        &mut self,
        fields: &Map<String, Value>,
        previous: Option<&Self>,
        cx: &mut FieldContext<'_, '_>,
    ) {
        if let Some(x) = cx.number(fields, "x", ReferenceUnit::StageX, true) {
            self.x = Some(x);
        }
        if let Some(y) = cx.number(fields, "y", ReferenceUnit::StageY, true) {
            self.y = Some(y);
        }

        // Deltas only apply on top of an earlier state.
        if let Some(previous) = previous {
            if let Some(dx) = cx.number(fields, "dx", ReferenceUnit::StageX, true) {
                self.x = Some(previous.x.unwrap_or(0.0) + dx);
            }
            if let Some(dy) = cx.number(fields, "dy", ReferenceUnit::StageY, true) {
                self.y = Some(previous.y.unwrap_or(0.0) + dy);
            }
        }

        overlay_fields!(self, fields, cx, {
            rot_x: float,
            rot_y: float,
            rot_z: float,
            scale_x: float,
            scale_y: float,
        });
        if let Some(scale) = cx.float(fields, "scale") {
            self.scale_x = Some(scale);
            self.scale_y = Some(scale);
        }
        overlay_fields!(self, fields, cx, { opacity: float });

        if let Some(width) = cx.number(fields, "width", ReferenceUnit::StageX, true) {
            self.width = Some(width);
        }
        if let Some(height) = cx.number(fields, "height", ReferenceUnit::StageY, true) {
            self.height = Some(height);
        }
        overlay_fields!(self, fields, cx, {
            fill_width: boolean,
            layer: int,
            order: int,
        });
    }
}
