//! States of text objects.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{BaseState, CanvasState, Color, FieldContext, ObjectKind};

/// A state of a text object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextState {
    /// Shared fields.
    #[serde(flatten)]
    pub base: BaseState,
    /// Placement on the canvas.
    #[serde(flatten)]
    pub canvas: CanvasState,
    /// Font name.
    pub font: Option<String>,
    /// Text colour.
    pub color: Option<Color>,
    /// Displayed text.
    pub text: Option<String>,
    /// Font size.
    pub size: Option<i32>,
    /// Alignment keyword, such as `middleCenter`.
    pub align: Option<String>,
}

impl TextState {
    fn overlay_own(
        &mut self,
        fields: &Map<String, Value>,
        previous: Option<&Self>,
        cx: &mut FieldContext<'_, '_>,
    ) {
        self.canvas
            .overlay(fields, previous.map(|state| &state.canvas), cx);
        overlay_fields!(self, fields, cx, {
            font: string,
            color: color,
            text: string,
            size: int,
            align: string,
        });
    }
}

impl_state_kind!(TextState, ObjectKind::Text);
