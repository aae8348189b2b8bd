//! The storyboard compiler of rhythm game charts.
//!
//! A storyboard is a JSON document declaring texts, sprites, controllers, note controllers and
//! lines, each animated by a list of timed states. This crate compiles such a document against
//! the chart being played into [`timeline::TimelineObject`]s which a renderer samples every frame,
//! and runs the triggers which spawn and destroy objects as the play goes on.
//!
//! Compiling consists of these steps:
//!
//! - `expand` duplicates declarations over array fields and note selectors.
//! - `template` merges named templates into declarations.
//! - `time` resolves time expressions such as `start:12` against the chart.
//! - `unit` converts positions from their reference unit into world units.
//! - `state` builds each state on top of the previous one.
//!
//! [`storyboard`] puts them together, see [`storyboard::parse_storyboard`].
//!
//! In detail, our policies are:
//!
//! - Problems in a single field or selector are warnings, the field is left out.
//! - Problems in the document structure or in time expressions abort the load.
//! - Do not draw anything, rendering belongs to a [`render::Renderer`].
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod chart;
mod compile;
pub mod config;
pub mod diagnostics;
pub mod easing;
pub mod event;
pub mod expand;
pub mod ids;
pub mod prelude;
pub mod render;
pub mod state;
pub mod storyboard;
pub mod template;
pub mod time;
pub mod timeline;
pub mod trigger;
pub mod unit;

pub use crate::storyboard::{
    Storyboard, StoryboardError, StoryboardOutput, StoryboardWarning, parse_storyboard,
};
