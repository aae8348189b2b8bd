//! States of sprite objects.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{BaseState, CanvasState, Color, FieldContext, ObjectKind};

/// A state of a sprite object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpriteState {
    /// Shared fields.
    #[serde(flatten)]
    pub base: BaseState,
    /// Placement on the canvas.
    #[serde(flatten)]
    pub canvas: CanvasState,
    /// Image path, relative to the storyboard.
    pub path: Option<String>,
    /// Whether the image keeps its aspect ratio when resized.
    pub preserve_aspect: Option<bool>,
    /// Tint colour.
    pub color: Option<Color>,
}

impl SpriteState {
    fn overlay_own(
        &mut self,
        fields: &Map<String, Value>,
        previous: Option<&Self>,
        cx: &mut FieldContext<'_, '_>,
    ) {
        self.canvas
            .overlay(fields, previous.map(|state| &state.canvas), cx);
        overlay_fields!(self, fields, cx, {
            path: string,
            preserve_aspect: boolean,
            color: color,
        });
    }
}

impl_state_kind!(SpriteState, ObjectKind::Sprite);
