//! Loading options of a storyboard.

use serde::{Deserialize, Serialize};

/// Options applied while compiling a storyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryboardConfig {
    /// Width of the stage reference canvas, in stage pixels.
    pub reference_width: f32,
    /// Height of the stage reference canvas, in stage pixels.
    pub reference_height: f32,
    /// Whether the renderer should apply the post-processing effects of controllers.
    ///
    /// Compilation keeps the effect fields either way. A [`Renderer`](crate::render::Renderer)
    /// reads this through [`Storyboard::config`](crate::storyboard::Storyboard::config) while
    /// drawing and skips the effect switches of [`ControllerState`](crate::state::ControllerState)
    /// when it is `false`.
    pub use_effects: bool,
    /// Time given to a controller declaration that has no `time`.
    pub default_controller_time: f32,
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self {
            reference_width: 800.0,
            reference_height: 600.0,
            use_effects: true,
            default_controller_time: 0.0,
        }
    }
}

/// The configuration used by [`crate::storyboard::parse_storyboard`].
#[must_use]
pub fn default_config() -> StoryboardConfig {
    StoryboardConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_options_take_defaults() {
        let config: StoryboardConfig = serde_json::from_str(r#"{"use_effects": false}"#).unwrap();
        assert!(!config.use_effects);
        assert_eq!(config.reference_width, 800.0);
        assert_eq!(config.reference_height, 600.0);
    }
}
