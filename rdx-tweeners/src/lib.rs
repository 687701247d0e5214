//! # Tweeners
//!
//! A frame-driven scheduler for tweeners: values interpolated over time,
//! played together or in sequence.
//!
//! ## Core Concepts
//!
//! - **Slot**: one scheduled interpolation, identified by a small integer that
//!   is recycled once the slot is removed.
//! - **TweenerSystem**: owns the slots and advances them each time the client
//!   calls `update` with the elapsed time.
//! - **Sequencing**: a slot can follow another one. It starts as soon as its
//!   predecessor completes, within the same update.
//! - **Safe removal**: any slot can be removed at any time, including from its
//!   own callbacks. It falls silent immediately and is recycled on the next
//!   update.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tweeners::prelude::*;
//!
//! let mut system = TweenerSystem::<DefaultConfig>::new();
//! let x = Arc::new(Mutex::new(0.0f32));
//!
//! // Move right, then come back.
//! let forth = Builder::<DefaultConfig>::new()
//!     .range_assign(0.0, 100.0, 1.0, x.clone(), easing::linear)
//!     .build(&mut system);
//! let _back = Builder::<DefaultConfig>::new()
//!     .range_assign(100.0, 0.0, 1.0, x.clone(), easing::linear)
//!     .after(forth)
//!     .build(&mut system);
//!
//! system.update(0.5);
//! assert_eq!(*x.lock().unwrap(), 50.0);
//!
//! // The first slot completes and the second one runs for the remaining time.
//! system.update(0.75);
//! assert_eq!(*x.lock().unwrap(), 75.0);
//! ```

pub const LIBRARY_NAME: &str = "Tweeners";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builder;
pub mod clock;
pub mod common;
pub mod config;
pub mod contract;
pub mod easing;
pub mod interpolate;
pub mod slot_component;
pub mod system;

/// A prelude module for easy importing of the most common Tweeners types.
pub mod prelude {
    pub use crate::builder::Builder;
    pub use crate::clock::{drive, SystemClock, TickEvent};
    pub use crate::common::SlotId;
    pub use crate::config::{ClockResolution, Config, DefaultConfig, TweenersConfig};
    pub use crate::contract::ContractViolation;
    pub use crate::easing::{self, Curve, EaseMode, Easing};
    pub use crate::interpolate::Interpolate;
    pub use crate::system::{SlotState, TweenerSystem};
}
