//! Prelude module for the storyboard crate.
//!
//! You can use `use storyboard_rs::prelude::*;` to import the commonly used types at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{
    ToAriadne, collect_storyboard_reports, emit_storyboard_warnings, storyboard_error_report,
};
pub use crate::diagnostics::SimpleSource;

#[cfg(feature = "rand")]
pub use crate::ids::RandIds;
pub use crate::{
    chart::{Chart, ChartLoadError, ChartNote, NoteType},
    config::{StoryboardConfig, default_config},
    easing::Easing,
    event::{GameEvent, GameEventBus, GameState, Subscription, SubscriptionId},
    expand::{NoteSelector, expand_declaration},
    ids::{IdSource, SequentialIds},
    render::Renderer,
    state::{
        BaseState, CanvasState, Color, ControllerState, LinePosition, LineState,
        NoteControllerState, ObjectKind, SpriteState, StateKind, TextState,
    },
    storyboard::{
        ObjectRef, Storyboard, StoryboardError, StoryboardOutput, StoryboardWarning,
        parse_storyboard,
    },
    template::Templates,
    time::{TimeError, TimeExpr, TimeResolver, UNSET_TIME},
    timeline::{Bracket, TimelineObject},
    trigger::{Trigger, TriggerEngine, TriggerType},
    unit::{ReferenceUnit, Viewport},
};
