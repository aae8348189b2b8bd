//! Renderer collaborator.
//!
//! The storyboard does not draw anything. A [`Renderer`] prepares the resources of the compiled
//! objects, reacts to fired triggers, and draws each frame by asking every
//! [`TimelineObject`](crate::timeline::TimelineObject) for the states around the elapsed time.

use std::future::Future;

use crate::{
    storyboard::{Storyboard, StoryboardError},
    trigger::Trigger,
};

/// Renderer of a compiled storyboard.
pub trait Renderer {
    /// Prepares the resources of every compiled object.
    ///
    /// The storyboard accepts frame updates only once the returned future has completed
    /// successfully.
    fn initialize(
        &mut self,
        storyboard: &Storyboard,
    ) -> impl Future<Output = Result<(), StoryboardError>>;

    /// Called on every trigger fire. `trigger.spawn` and `trigger.destroy` name the objects to
    /// show or remove, see [`Storyboard::find_object`].
    fn on_trigger(&mut self, storyboard: &Storyboard, trigger: &Trigger);

    /// Draws the frame at `elapsed` seconds since the chart started.
    ///
    /// Controller post-processing is drawn only if
    /// [`StoryboardConfig::use_effects`](crate::config::StoryboardConfig::use_effects) is set.
    fn on_game_update(&mut self, storyboard: &Storyboard, elapsed: f32);
}
