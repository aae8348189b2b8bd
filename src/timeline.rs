//! Compiled timeline objects.

use serde::Serialize;

use crate::state::StateKind;

/// An object of the storyboard with its states sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineObject<S> {
    /// Id used by triggers to spawn and destroy the object.
    pub id: String,
    /// States in ascending time. States never reached come last.
    pub states: Vec<S>,
}

/// The two states around a moment and the eased progress between them.
#[derive(Debug, PartialEq)]
pub struct Bracket<'a, S> {
    /// The latest state reached.
    pub from: &'a S,
    /// The next state, or `from` again once the last state is reached.
    pub to: &'a S,
    /// Progress from `from` to `to` in `0..=1` before easing, mapped through the easing of `to`.
    pub progress: f32,
}

impl<S> Bracket<'_, S> {
    /// Interpolates one field between the two states.
    ///
    /// A field only set on one side keeps that value.
    pub fn lerp(&self, field: impl Fn(&S) -> Option<f32>) -> Option<f32> {
        match (field(self.from), field(self.to)) {
            (Some(from), Some(to)) => Some(from + (to - from) * self.progress),
            (from, to) => from.or(to),
        }
    }
}

impl<S: StateKind> TimelineObject<S> {
    /// Creates an object, sorting the states by time.
    ///
    /// The sort is stable, so states at the same time keep their declaration order.
    #[must_use]
    pub fn new(id: impl Into<String>, mut states: Vec<S>) -> Self {
        states.sort_by(|a, b| a.time().total_cmp(&b.time()));
        Self {
            id: id.into(),
            states,
        }
    }

    /// Time of the first state, when the object starts to exist.
    #[must_use]
    pub fn start_time(&self) -> Option<f32> {
        self.states
            .first()
            .map(StateKind::time)
            .filter(|time| time.is_finite())
    }

    /// The states around `time`.
    ///
    /// Returns `None` before the first state. After the last reachable state, both ends of the
    /// bracket are that state and the progress is `1`.
    #[must_use]
    pub fn bracket(&self, time: f32) -> Option<Bracket<'_, S>> {
        let reached = self.states.partition_point(|state| state.time() <= time);
        let from = self.states.get(reached.checked_sub(1)?)?;
        let Some(to) = self
            .states
            .get(reached)
            .filter(|state| state.base().is_timed())
        else {
            return Some(Bracket {
                from,
                to: from,
                progress: 1.0,
            });
        };
        let span = to.time() - from.time();
        let linear = if span > 0.0 {
            (time - from.time()) / span
        } else {
            1.0
        };
        Some(Bracket {
            from,
            to,
            progress: to.base().easing.apply(linear),
        })
    }

    /// Whether the object is destroyed at `time`.
    #[must_use]
    pub fn is_destroyed_at(&self, time: f32) -> bool {
        self.bracket(time)
            .is_some_and(|bracket| bracket.from.base().destroy)
    }
}
