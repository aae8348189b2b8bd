//! Easing curves used between two compiled states.

use std::f32::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Interpolation curve applied when moving into a state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    /// Starts slowly on a quadratic curve.
    EaseInQuad,
    /// Ends slowly on a quadratic curve.
    EaseOutQuad,
    /// Starts and ends slowly on a quadratic curve.
    EaseInOutQuad,
    /// Starts slowly on a cubic curve.
    EaseInCubic,
    /// Ends slowly on a cubic curve.
    EaseOutCubic,
    /// Starts and ends slowly on a cubic curve.
    EaseInOutCubic,
    /// Starts slowly on a quartic curve.
    EaseInQuart,
    /// Ends slowly on a quartic curve.
    EaseOutQuart,
    /// Starts and ends slowly on a quartic curve.
    EaseInOutQuart,
    /// Starts slowly on a quintic curve.
    EaseInQuint,
    /// Ends slowly on a quintic curve.
    EaseOutQuint,
    /// Starts and ends slowly on a quintic curve.
    EaseInOutQuint,
    /// Starts slowly on a sine curve.
    EaseInSine,
    /// Ends slowly on a sine curve.
    EaseOutSine,
    /// Starts and ends slowly on a sine curve.
    EaseInOutSine,
    /// Starts slowly on an exponential curve.
    EaseInExpo,
    /// Ends slowly on an exponential curve.
    EaseOutExpo,
    /// Starts and ends slowly on an exponential curve.
    EaseInOutExpo,
    /// Starts slowly on a circular curve.
    EaseInCirc,
    /// Ends slowly on a circular curve.
    EaseOutCirc,
    /// Starts and ends slowly on a circular curve.
    EaseInOutCirc,
    /// Constant speed.
    #[default]
    Linear,
    /// Overshoots and settles like a damped spring.
    Spring,
    /// Bounces before leaving the start.
    EaseInBounce,
    /// Bounces on arrival.
    EaseOutBounce,
    /// Bounces at both ends.
    EaseInOutBounce,
    /// Pulls back before leaving the start.
    EaseInBack,
    /// Overshoots the target and comes back.
    EaseOutBack,
    /// Pulls back and overshoots.
    EaseInOutBack,
    /// Oscillates before leaving the start.
    EaseInElastic,
    /// Oscillates around the target on arrival.
    EaseOutElastic,
    /// Oscillates at both ends.
    EaseInOutElastic,
}

impl Easing {
    /// All curves.
    pub const ALL: [Self; 32] = [
        Self::EaseInQuad,
        Self::EaseOutQuad,
        Self::EaseInOutQuad,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
        Self::EaseInQuart,
        Self::EaseOutQuart,
        Self::EaseInOutQuart,
        Self::EaseInQuint,
        Self::EaseOutQuint,
        Self::EaseInOutQuint,
        Self::EaseInSine,
        Self::EaseOutSine,
        Self::EaseInOutSine,
        Self::EaseInExpo,
        Self::EaseOutExpo,
        Self::EaseInOutExpo,
        Self::EaseInCirc,
        Self::EaseOutCirc,
        Self::EaseInOutCirc,
        Self::Linear,
        Self::Spring,
        Self::EaseInBounce,
        Self::EaseOutBounce,
        Self::EaseInOutBounce,
        Self::EaseInBack,
        Self::EaseOutBack,
        Self::EaseInOutBack,
        Self::EaseInElastic,
        Self::EaseOutElastic,
        Self::EaseInOutElastic,
    ];

    /// Maps the linear progress `t` (clamped to `0..=1`) through the curve.
    ///
    /// Every curve maps `0` to `0` and `1` to `1`; back, elastic and spring curves overshoot in between.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t).powi(2),
            Self::EaseInOutQuad => in_out(t, |t| t * t),
            Self::EaseInCubic => t.powi(3),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => in_out(t, |t| t.powi(3)),
            Self::EaseInQuart => t.powi(4),
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Self::EaseInOutQuart => in_out(t, |t| t.powi(4)),
            Self::EaseInQuint => t.powi(5),
            Self::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Self::EaseInOutQuint => in_out(t, |t| t.powi(5)),
            Self::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Self::EaseOutSine => (t * PI / 2.0).sin(),
            Self::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::EaseInExpo => expo_in(t),
            Self::EaseOutExpo => 1.0 - expo_in(1.0 - t),
            Self::EaseInOutExpo => in_out(t, expo_in),
            Self::EaseInCirc => 1.0 - (1.0 - t * t).sqrt(),
            Self::EaseOutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::EaseInOutCirc => in_out(t, |t| 1.0 - (1.0 - t * t).sqrt()),
            Self::Spring => spring(t),
            Self::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Self::EaseOutBounce => bounce_out(t),
            Self::EaseInOutBounce => in_out(t, |t| 1.0 - bounce_out(1.0 - t)),
            Self::EaseInBack => back_in(t),
            Self::EaseOutBack => 1.0 - back_in(1.0 - t),
            Self::EaseInOutBack => in_out(t, back_in),
            Self::EaseInElastic => elastic_in(t),
            Self::EaseOutElastic => 1.0 - elastic_in(1.0 - t),
            Self::EaseInOutElastic => in_out(t, elastic_in),
        }
    }

    /// Interpolates between `from` and `to` at linear progress `t`.
    #[must_use]
    pub fn interpolate(self, from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * self.apply(t)
    }
}

/// Builds an in-out curve from its ease-in half.
fn in_out(t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        ease_in(t * 2.0) / 2.0
    } else {
        1.0 - ease_in((1.0 - t) * 2.0) / 2.0
    }
}

fn expo_in(t: f32) -> f32 {
    if t <= 0.0 {
        0.0
    } else {
        2f32.powf(10.0 * (t - 1.0))
    }
}

fn back_in(t: f32) -> f32 {
    const OVERSHOOT: f32 = 1.70158;
    t * t * ((OVERSHOOT + 1.0) * t - OVERSHOOT)
}

fn elastic_in(t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let period = 0.3;
    -(2f32.powf(10.0 * (t - 1.0))) * ((t - 1.0 - period / 4.0) * (2.0 * PI) / period).sin()
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

fn spring(t: f32) -> f32 {
    if t >= 1.0 {
        return 1.0;
    }
    let value = ((t * PI * (0.2 + 2.5 * t.powi(3))).sin() * (1.0 - t).powf(2.2) + t)
        * (1.0 + 1.2 * (1.0 - t));
    value.max(0.0)
}

impl FromStr for Easing {
    type Err = String;

    /// Parses a curve name case-insensitively, ignoring underscores (`easeOutQuad`, `ease_out_quad`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|easing| format!("{easing:?}").to_ascii_lowercase() == wanted)
            .ok_or_else(|| s.to_string())
    }
}
