//! States of scene controllers.
//!
//! A controller drives the camera, the opacity of the game UI and the scanline, the look of
//! every note, and a set of post-processing effects. Each effect has a switch (`bloom`,
//! `vignette`, ...) and parameters named after it (`bloom_intensity`, ...).

use serde::Serialize;
use serde_json::{Map, Value};

use super::{BaseState, Color, FieldContext, ObjectKind, non_null};
use crate::unit::ReferenceUnit;

/// Number of note types a controller can recolour.
pub const NOTE_FILL_COLOR_SLOTS: usize = 10;

/// A state of a controller.
///
/// Camera coordinates and the scanline position are in world units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControllerState {
    /// Shared fields.
    #[serde(flatten)]
    pub base: BaseState,

    /// Opacity of every storyboard object in `0..=1`.
    pub storyboard_opacity: Option<f32>,
    /// Opacity of the game UI.
    pub ui_opacity: Option<f32>,
    /// Opacity of the scanline.
    pub scanline_opacity: Option<f32>,
    /// Dimming of the background image in `0..=1`.
    pub background_dim: Option<f32>,

    /// Orthographic size of the camera.
    pub size: Option<f32>,
    /// Field of view of the perspective camera.
    pub fov: Option<f32>,
    /// Whether the camera uses a perspective projection.
    pub perspective: Option<bool>,
    /// Horizontal camera position.
    pub x: Option<f32>,
    /// Vertical camera position.
    pub y: Option<f32>,
    /// Camera rotation around the x axis, in degrees.
    pub rot_x: Option<f32>,
    /// Camera rotation around the y axis, in degrees.
    pub rot_y: Option<f32>,
    /// Camera rotation around the z axis, in degrees.
    pub rot_z: Option<f32>,

    /// Colour of the scanline.
    pub scanline_color: Option<Color>,
    /// Whether the scanline moves smoothly between pages.
    pub scanline_smoothing: Option<bool>,
    /// Whether `scanline_pos` replaces the chart-driven scanline position.
    pub override_scanline_pos: Option<bool>,
    /// Scanline position used when overridden.
    pub scanline_pos: Option<f32>,
    /// Multiplier applied to the opacity of every note.
    pub note_opacity_multiplier: Option<f32>,
    /// Ring colour of every note.
    pub note_ring_color: Option<Color>,
    /// Fill colours indexed by note type, [`NOTE_FILL_COLOR_SLOTS`] long when set.
    pub note_fill_colors: Option<Vec<Option<Color>>>,

    /// Bloom switch.
    pub bloom: Option<bool>,
    /// Bloom strength.
    pub bloom_intensity: Option<f32>,

    /// Vignette switch.
    pub vignette: Option<bool>,
    /// Vignette strength.
    pub vignette_intensity: Option<f32>,
    /// Vignette colour.
    pub vignette_color: Option<Color>,
    /// Radius where the vignette starts.
    pub vignette_start: Option<f32>,
    /// Radius where the vignette reaches full strength.
    pub vignette_end: Option<f32>,

    /// Chromatic aberration switch.
    pub chromatic: Option<bool>,
    /// Chromatic aberration strength.
    pub chromatic_intensity: Option<f32>,
    /// Radius where the aberration starts.
    pub chromatic_start: Option<f32>,
    /// Radius where the aberration reaches full strength.
    pub chromatic_end: Option<f32>,

    /// Radial blur switch.
    pub radial_blur: Option<bool>,
    /// Radial blur strength.
    pub radial_blur_intensity: Option<f32>,

    /// Colour adjustment switch.
    pub color_adjustment: Option<bool>,
    /// Brightness of the colour adjustment.
    pub brightness: Option<f32>,
    /// Saturation of the colour adjustment.
    pub saturation: Option<f32>,
    /// Contrast of the colour adjustment.
    pub contrast: Option<f32>,

    /// Colour filter switch.
    pub color_filter: Option<bool>,
    /// Colour multiplied over the frame.
    pub color_filter_color: Option<Color>,

    /// Grey scale switch.
    pub gray_scale: Option<bool>,
    /// Grey scale strength.
    pub gray_scale_intensity: Option<f32>,

    /// Film noise switch.
    pub noise: Option<bool>,
    /// Film noise strength.
    pub noise_intensity: Option<f32>,

    /// Sepia switch.
    pub sepia: Option<bool>,
    /// Sepia strength.
    pub sepia_intensity: Option<f32>,

    /// Dream blur switch.
    pub dream: Option<bool>,
    /// Dream blur strength.
    pub dream_intensity: Option<f32>,

    /// Fisheye switch.
    pub fisheye: Option<bool>,
    /// Fisheye strength.
    pub fisheye_intensity: Option<f32>,

    /// Shockwave switch.
    pub shockwave: Option<bool>,
    /// Speed of the shockwave ring.
    pub shockwave_speed: Option<f32>,

    /// Focus switch.
    pub focus: Option<bool>,
    /// Focus strength.
    pub focus_intensity: Option<f32>,
    /// Size of the focused area.
    pub focus_size: Option<f32>,
    /// Pulse speed of the focus.
    pub focus_speed: Option<f32>,
    /// Colour outside the focused area.
    pub focus_color: Option<Color>,

    /// Glitch switch.
    pub glitch: Option<bool>,
    /// Glitch strength.
    pub glitch_intensity: Option<f32>,

    /// Compression artifact switch.
    pub artifact: Option<bool>,
    /// Artifact strength.
    pub artifact_intensity: Option<f32>,
    /// Colour bleeding of the artifacts.
    pub artifact_colorisation: Option<f32>,
    /// Parasite blocks of the artifacts.
    pub artifact_parasite: Option<f32>,
    /// Noise of the artifacts.
    pub artifact_noise: Option<f32>,

    /// Arcade monitor switch.
    pub arcade: Option<bool>,
    /// Arcade monitor strength.
    pub arcade_intensity: Option<f32>,
    /// Size of the interference bands.
    pub arcade_interference_size: Option<f32>,
    /// Speed of the interference bands.
    pub arcade_interference_speed: Option<f32>,
    /// Contrast of the arcade monitor.
    pub arcade_contrast: Option<f32>,

    /// Chromatical switch.
    pub chromatical: Option<bool>,
    /// Fade of the chromatical split.
    pub chromatical_fade: Option<f32>,
    /// Chromatical strength.
    pub chromatical_intensity: Option<f32>,
    /// Speed of the chromatical split.
    pub chromatical_speed: Option<f32>,

    /// VHS tape switch.
    pub tape: Option<bool>,
}

impl ControllerState {
    fn overlay_own(
        &mut self,
        fields: &Map<String, Value>,
        _previous: Option<&Self>,
        cx: &mut FieldContext<'_, '_>,
    ) {
        overlay_fields!(self, fields, cx, {
            storyboard_opacity: float,
            ui_opacity: float,
            scanline_opacity: float,
            background_dim: float,
            size: float,
            fov: float,
            perspective: boolean,
        });
        if let Some(x) = cx.number(fields, "x", ReferenceUnit::CameraX, false) {
            self.x = Some(x);
        }
        if let Some(y) = cx.number(fields, "y", ReferenceUnit::CameraY, false) {
            self.y = Some(y);
        }
        overlay_fields!(self, fields, cx, {
            rot_x: float,
            rot_y: float,
            rot_z: float,
            scanline_color: color,
            scanline_smoothing: boolean,
            override_scanline_pos: boolean,
        });
        if let Some(pos) = cx.number(fields, "scanline_pos", ReferenceUnit::NoteY, false) {
            self.scanline_pos = Some(pos);
        }
        overlay_fields!(self, fields, cx, {
            note_opacity_multiplier: float,
            note_ring_color: color,
        });
        if let Some(colors) = Self::read_fill_colors(fields, cx) {
            self.note_fill_colors = Some(colors);
        }

        overlay_fields!(self, fields, cx, {
            bloom: boolean,
            bloom_intensity: float,
            vignette: boolean,
            vignette_intensity: float,
            vignette_color: color,
            vignette_start: float,
            vignette_end: float,
            chromatic: boolean,
            chromatic_intensity: float,
            chromatic_start: float,
            chromatic_end: float,
            radial_blur: boolean,
            radial_blur_intensity: float,
            color_adjustment: boolean,
            brightness: float,
            saturation: float,
            contrast: float,
            color_filter: boolean,
            color_filter_color: color,
            gray_scale: boolean,
            gray_scale_intensity: float,
            noise: boolean,
            noise_intensity: float,
            sepia: boolean,
            sepia_intensity: float,
            dream: boolean,
            dream_intensity: float,
            fisheye: boolean,
            fisheye_intensity: float,
            shockwave: boolean,
            shockwave_speed: float,
            focus: boolean,
            focus_intensity: float,
            focus_size: float,
            focus_speed: float,
            focus_color: color,
            glitch: boolean,
            glitch_intensity: float,
            artifact: boolean,
            artifact_intensity: float,
            artifact_colorisation: float,
            artifact_parasite: float,
            artifact_noise: float,
            arcade: boolean,
            arcade_intensity: float,
            arcade_interference_size: float,
            arcade_interference_speed: float,
            arcade_contrast: float,
            chromatical: boolean,
            chromatical_fade: float,
            chromatical_intensity: float,
            chromatical_speed: float,
            tape: boolean,
        });
    }

    /// An empty list leaves the inherited colours untouched.
    fn read_fill_colors(
        fields: &Map<String, Value>,
        cx: &mut FieldContext<'_, '_>,
    ) -> Option<Vec<Option<Color>>> {
        let value = non_null(fields, "note_fill_colors")?;
        let Some(slots) = value.as_array() else {
            cx.invalid("note_fill_colors", value);
            return None;
        };
        if slots.is_empty() {
            return None;
        }
        let colors = (0..NOTE_FILL_COLOR_SLOTS)
            .map(|index| {
                slots
                    .get(index)
                    .filter(|slot| !slot.is_null())
                    .and_then(|slot| cx.parse_color("note_fill_colors", slot))
            })
            .collect();
        Some(colors)
    }
}

impl_state_kind!(ControllerState, ObjectKind::Controller);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        chart::Chart,
        config::StoryboardConfig,
        state::StateKind,
        time::TimeResolver,
        unit::Viewport,
    };

    #[test]
    fn fill_colors_pad_to_every_note_type() {
        let chart = Chart::default();
        let mut resolver = TimeResolver::new(&chart);
        let viewport = Viewport::default();
        let config = StoryboardConfig::default();
        let mut warnings = Vec::new();
        let mut cx = FieldContext {
            resolver: &mut resolver,
            viewport: &viewport,
            config: &config,
            warnings: &mut warnings,
        };

        let fields = json!({"note_fill_colors": ["#ff0000", "bogus", null, "navy"], "bloom": true});
        let mut state = ControllerState::default();
        state
            .overlay(fields.as_object().unwrap(), None, &mut cx)
            .unwrap();

        let colors = state.note_fill_colors.unwrap();
        assert_eq!(colors.len(), NOTE_FILL_COLOR_SLOTS);
        assert_eq!(colors[0], Some(Color::from_rgb8(255, 0, 0)));
        assert_eq!(colors[1], None);
        assert_eq!(colors[2], None);
        assert_eq!(colors[3], Some(Color::from_rgb8(0, 0, 128)));
        assert!(colors[4..].iter().all(Option::is_none));
        assert_eq!(state.bloom, Some(true));
        assert_eq!(warnings.len(), 1);
    }
}
