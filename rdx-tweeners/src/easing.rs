//! Easing curves to use as slot transforms.
//!
//! Every function maps a progress in `[0, 1]` to a ratio, with `f(0) == 0` and
//! `f(1) == 1`. The plain functions are the "ease in" flavor; combine them
//! with [`ease_out`] or [`ease_in_out`] for the other ones, or name a curve
//! with [`Curve`], e.g. `"quad-in-out"`.

use crate::config::Float;
use serde::Deserialize;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Mirrors `function` so that the curve decelerates instead of accelerating.
pub fn ease_out<F: Float>(t: F, function: impl Fn(F) -> F) -> F {
    let one = F::one().to_f64();
    F::from_f64(one - function(F::from_f64(one - t.to_f64())).to_f64())
}

/// Applies `function` on the first half of the progress and its mirror on
/// the second half.
pub fn ease_in_out<F: Float>(t: F, function: impl Fn(F) -> F) -> F {
    let t = t.to_f64();
    if t < 0.5 {
        F::from_f64(function(F::from_f64(2.0 * t)).to_f64() / 2.0)
    } else {
        F::from_f64(1.0 - function(F::from_f64(2.0 * (1.0 - t))).to_f64() / 2.0)
    }
}

/// Stays at zero until the very end.
pub fn none<F: Float>(t: F) -> F {
    if t.to_f64() < 1.0 {
        F::zero()
    } else {
        F::one()
    }
}

pub fn linear<F: Float>(t: F) -> F {
    t
}

pub fn sine<F: Float>(t: F) -> F {
    map(t, |t| 1.0 - (t * PI / 2.0).cos())
}

pub fn quad<F: Float>(t: F) -> F {
    map(t, |t| t * t)
}

pub fn cubic<F: Float>(t: F) -> F {
    map(t, |t| t * t * t)
}

pub fn quart<F: Float>(t: F) -> F {
    map(t, |t| t.powi(4))
}

pub fn quint<F: Float>(t: F) -> F {
    map(t, |t| t.powi(5))
}

pub fn circ<F: Float>(t: F) -> F {
    map(t, |t| 1.0 - (1.0 - t * t).max(0.0).sqrt())
}

pub fn expo<F: Float>(t: F) -> F {
    map(t, |t| {
        if t <= 0.0 {
            0.0
        } else {
            2f64.powf(10.0 * (t - 1.0))
        }
    })
}

/// Oscillates with a growing amplitude before snapping to the end.
pub fn elastic<F: Float>(t: F) -> F {
    map(t, |t| {
        if t <= 0.0 || t >= 1.0 {
            return t.clamp(0.0, 1.0);
        }

        let period = 0.3;
        let shift = period / 4.0;
        -(2f64.powf(10.0 * (t - 1.0))) * ((t - 1.0 - shift) * 2.0 * PI / period).sin()
    })
}

pub fn bounce<F: Float>(t: F) -> F {
    map(t, |t| 1.0 - bounce_out(1.0 - t))
}

/// Moves slightly backwards before heading to the end.
pub fn back<F: Float>(t: F) -> F {
    const OVERSHOOT: f64 = 1.70158;
    map(t, |t| t * t * ((OVERSHOOT + 1.0) * t - OVERSHOOT))
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;

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

fn map<F: Float>(t: F, f: impl Fn(f64) -> f64) -> F {
    F::from_f64(f(t.to_f64()))
}

// --- Named curves ---

/// The shape of an easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Easing {
    None,
    Linear,
    Sine,
    Quad,
    Cubic,
    Quart,
    Quint,
    Circ,
    Expo,
    Elastic,
    Bounce,
    Back,
}

impl Easing {
    pub const ALL: [Easing; 12] = [
        Easing::None,
        Easing::Linear,
        Easing::Sine,
        Easing::Quad,
        Easing::Cubic,
        Easing::Quart,
        Easing::Quint,
        Easing::Circ,
        Easing::Expo,
        Easing::Elastic,
        Easing::Bounce,
        Easing::Back,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Easing::None => "none",
            Easing::Linear => "linear",
            Easing::Sine => "sine",
            Easing::Quad => "quad",
            Easing::Cubic => "cubic",
            Easing::Quart => "quart",
            Easing::Quint => "quint",
            Easing::Circ => "circ",
            Easing::Expo => "expo",
            Easing::Elastic => "elastic",
            Easing::Bounce => "bounce",
            Easing::Back => "back",
        }
    }

    /// Evaluates the "ease in" flavor of the curve.
    pub fn apply<F: Float>(self, t: F) -> F {
        match self {
            Easing::None => none(t),
            Easing::Linear => linear(t),
            Easing::Sine => sine(t),
            Easing::Quad => quad(t),
            Easing::Cubic => cubic(t),
            Easing::Quart => quart(t),
            Easing::Quint => quint(t),
            Easing::Circ => circ(t),
            Easing::Expo => expo(t),
            Easing::Elastic => elastic(t),
            Easing::Bounce => bounce(t),
            Easing::Back => back(t),
        }
    }
}

/// Which part of the curve is eased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EaseMode {
    #[default]
    In,
    Out,
    InOut,
}

/// A named easing curve, such as `"cubic"`, `"cubic-out"` or
/// `"cubic-in-out"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Curve {
    pub easing: Easing,
    pub mode: EaseMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown easing curve '{0}'")]
pub struct UnknownCurve(pub String);

impl Curve {
    pub const LINEAR: Curve = Curve {
        easing: Easing::Linear,
        mode: EaseMode::In,
    };

    pub fn new(easing: Easing, mode: EaseMode) -> Self {
        Self { easing, mode }
    }

    pub fn apply<F: Float>(self, t: F) -> F {
        match self.mode {
            EaseMode::In => self.easing.apply(t),
            EaseMode::Out => ease_out(t, |t| self.easing.apply(t)),
            EaseMode::InOut => ease_in_out(t, |t| self.easing.apply(t)),
        }
    }

    /// A transform suitable for [`TweenerSystem::configure`](crate::system::TweenerSystem::configure).
    pub fn transform<F: Float>(self) -> impl FnMut(F) -> F + Send + 'static {
        move |t: F| self.apply(t)
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::LINEAR
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            EaseMode::In => write!(f, "{}", self.easing.name()),
            EaseMode::Out => write!(f, "{}-out", self.easing.name()),
            EaseMode::InOut => write!(f, "{}-in-out", self.easing.name()),
        }
    }
}

impl FromStr for Curve {
    type Err = UnknownCurve;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let (base, mode) = if let Some(base) = name.strip_suffix("-in-out") {
            (base, EaseMode::InOut)
        } else if let Some(base) = name.strip_suffix("-out") {
            (base, EaseMode::Out)
        } else if let Some(base) = name.strip_suffix("-in") {
            (base, EaseMode::In)
        } else {
            (name.as_str(), EaseMode::In)
        };

        Easing::ALL
            .into_iter()
            .find(|easing| easing.name() == base)
            .map(|easing| Curve::new(easing, mode))
            .ok_or_else(|| UnknownCurve(s.to_string()))
    }
}

impl TryFrom<String> for Curve {
    type Error = UnknownCurve;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
