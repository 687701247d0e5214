//! Defines the customizable types and the runtime configuration of the engine.
//!
//! The [`Config`] trait selects, at compile time, the types a
//! [`TweenerSystem`](crate::system::TweenerSystem) works with: how durations
//! are measured, how slots are identified and which float type carries the
//! interpolation ratios.
//!
//! The [`TweenersConfig`] struct holds the settings that are chosen at
//! runtime. It is designed to be deserialized from a configuration file
//! (e.g., a TOML file) layered with environment variables, using `serde` and
//! the `config` crate.

use crate::common::SlotId;
use serde::Deserialize;
use std::fmt::Debug;
use std::ops::{Add, Sub};
use std::path::Path;
use std::time::Duration;

/// Customizable types in the tweeners system.
pub trait Config: Sized + 'static {
    /// The type used to store the durations and elapsed times of the slots.
    type Duration: TimeSpan;

    /// The type used to identify a slot.
    type Id: SlotId;

    /// The float-like type passed to the transforms and update callbacks.
    type Float: Float;
}

/// The configuration used when none is specified: `f32` durations, `i32`
/// identifiers and `f32` ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfig;

impl Config for DefaultConfig {
    type Duration = f32;
    type Id = i32;
    type Float = f32;
}

/// A measure of time that the engine can accumulate and compare.
pub trait TimeSpan:
    Copy + PartialOrd + Add<Output = Self> + Sub<Output = Self> + Debug + Send + Sync + 'static
{
    /// The empty span.
    fn zero() -> Self;

    /// Computes `self / total` as a ratio.
    fn ratio<F: Float>(self, total: Self) -> F;
}

/// A float-like type used for the interpolation ratios.
pub trait Float: Copy + PartialOrd + Debug + Send + Sync + 'static {
    fn zero() -> Self;
    fn one() -> Self;
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl Float for f32 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Float for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

macro_rules! impl_numeric_time_span {
    ($($t:ty),*) => {
        $(
            impl TimeSpan for $t {
                fn zero() -> Self {
                    0 as $t
                }

                fn ratio<F: Float>(self, total: Self) -> F {
                    F::from_f64(self as f64 / total as f64)
                }
            }
        )*
    };
}

impl_numeric_time_span!(f32, f64, u32, u64, i32, i64);

impl TimeSpan for Duration {
    fn zero() -> Self {
        Duration::ZERO
    }

    fn ratio<F: Float>(self, total: Self) -> F {
        F::from_f64(self.as_secs_f64() / total.as_secs_f64())
    }
}

impl TimeSpan for chrono::Duration {
    fn zero() -> Self {
        chrono::Duration::zero()
    }

    fn ratio<F: Float>(self, total: Self) -> F {
        F::from_f64(chrono_nanos(self) / chrono_nanos(total))
    }
}

fn chrono_nanos(span: chrono::Duration) -> f64 {
    // Spans beyond ~292 years overflow the nanosecond count.
    span.num_nanoseconds()
        .map(|n| n as f64)
        .unwrap_or_else(|| span.num_milliseconds() as f64 * 1e6)
}

// --- Runtime configuration ---

/// The top-level runtime configuration.
///
/// This struct is typically loaded at application startup with
/// [`TweenersConfig::load`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TweenersConfig {
    /// The tick speed of the [`SystemClock`](crate::clock::SystemClock).
    pub resolution: ClockResolution,

    /// Capacity hints forwarded to [`TweenerSystem::reserve`](crate::system::TweenerSystem::reserve).
    pub capacity: CapacityConfig,
}

/// Defines the operational speed of the `SystemClock`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// ~60 ticks per second. Suitable for real-time animation.
    High,
    /// ~30 ticks per second.
    #[default]
    Medium,
    /// ~1 tick per second. Mostly useful to observe the engine step by step.
    Low,
    /// A user-defined speed in ticks per second.
    Custom { ticks_per_second: u64 },
}

impl ClockResolution {
    /// The time between two ticks.
    pub fn period(&self) -> Duration {
        let ticks_per_second = match self {
            ClockResolution::High => 60,
            ClockResolution::Medium => 30,
            ClockResolution::Low => 1,
            ClockResolution::Custom { ticks_per_second } => (*ticks_per_second).max(1),
        };
        Duration::from_secs_f64(1.0 / ticks_per_second as f64)
    }
}

/// Capacity hints for the engine storage. They have no behavioral effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Expected number of slots.
    pub slot_count: usize,
    /// Expected number of slots having a start callback, a done callback or
    /// successors.
    pub value_count_per_component: usize,
    /// Expected number of slots running at the same time.
    pub simultaneous_count: usize,
}

impl TweenersConfig {
    /// Loads the configuration from an optional TOML file, then from the
    /// `TWEENERS__*` environment variables (e.g.
    /// `TWEENERS__CAPACITY__SLOT_COUNT=1000`).
    ///
    /// Missing entries keep their default value.
    pub fn load(path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix("TWEENERS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
