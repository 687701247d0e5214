//! A fluent interface to create a slot in a single expression.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tweeners::prelude::*;
//!
//! let mut system = TweenerSystem::<DefaultConfig>::new();
//! let opacity = Arc::new(Mutex::new(0.0f32));
//!
//! let fade = Builder::<DefaultConfig>::new()
//!     .range_assign(0.0, 1.0, 0.5, opacity.clone(), easing::quad)
//!     .on_done(|_, id| println!("slot {id} faded in"))
//!     .build(&mut system);
//!
//! system.update(0.25);
//! assert_eq!(*opacity.lock().unwrap(), 0.25);
//! # let _ = fade;
//! ```

use crate::common::SlotId;
use crate::config::{Config, DefaultConfig, Float, TimeSpan};
use crate::contract::{confirm, ContractViolation};
use crate::interpolate::Interpolate;
use crate::system::{SlotFn, TransformFn, TweenerSystem, UpdateFn};
use std::sync::{Arc, Mutex};

/// Collects the properties of a slot, then configures it with
/// [`build`](Builder::build).
///
/// The slot is started on build, unless [`after`](Builder::after) chained it
/// to another slot.
pub struct Builder<C: Config = DefaultConfig> {
    duration: C::Duration,
    update: Option<UpdateFn<C>>,
    transform: Option<TransformFn<C>>,
    on_start: Option<SlotFn<C>>,
    on_done: Option<SlotFn<C>>,
    previous: C::Id,
}

impl<C: Config> Default for Builder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Config> Builder<C> {
    pub fn new() -> Self {
        Self {
            duration: C::Duration::zero(),
            update: None,
            transform: None,
            on_start: None,
            on_done: None,
            previous: C::Id::NONE,
        }
    }

    /// Passes the values from `from` to `to` to `callback` during `duration`.
    pub fn range_transform<T, U, X>(
        self,
        from: T,
        to: T,
        duration: C::Duration,
        mut callback: U,
        transform: X,
    ) -> Self
    where
        T: Interpolate,
        U: FnMut(T) + Send + 'static,
        X: FnMut(C::Float) -> C::Float + Send + 'static,
    {
        self.range_transform_with(
            from,
            to,
            duration,
            move |_: &mut TweenerSystem<C>, _: C::Id, value: T| callback(value),
            transform,
        )
    }

    /// Like [`range_transform`](Self::range_transform), with a callback that
    /// also receives the system and the slot.
    pub fn range_transform_with<T, U, X>(
        mut self,
        from: T,
        to: T,
        duration: C::Duration,
        mut callback: U,
        transform: X,
    ) -> Self
    where
        T: Interpolate,
        U: FnMut(&mut TweenerSystem<C>, C::Id, T) + Send + 'static,
        X: FnMut(C::Float) -> C::Float + Send + 'static,
    {
        self.duration = duration;
        self.update = Some(Box::new(
            move |system: &mut TweenerSystem<C>, id: C::Id, ratio: C::Float| {
                callback(system, id, T::interpolate(&from, &to, ratio.to_f64()))
            },
        ));
        self.transform = Some(Box::new(transform));
        self
    }

    /// Stores the values from `from` to `to` in `target` during `duration`.
    pub fn range_assign<T, X>(
        self,
        from: T,
        to: T,
        duration: C::Duration,
        target: Arc<Mutex<T>>,
        transform: X,
    ) -> Self
    where
        T: Interpolate,
        X: FnMut(C::Float) -> C::Float + Send + 'static,
    {
        self.range_transform(
            from,
            to,
            duration,
            move |value: T| {
                if let Ok(mut guard) = target.lock() {
                    *guard = value;
                }
            },
            transform,
        )
    }

    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TweenerSystem<C>, C::Id) + Send + 'static,
    {
        self.on_start = Some(Box::new(callback));
        self
    }

    pub fn on_done<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TweenerSystem<C>, C::Id) + Send + 'static,
    {
        self.on_done = Some(Box::new(callback));
        self
    }

    /// Chains the slot after `id`. [`TweenerSystem::NOT_AN_ID`] cancels the
    /// chaining.
    pub fn after(mut self, id: C::Id) -> Self {
        self.previous = id;
        self
    }

    /// Creates the slot in `system` and returns its identifier.
    #[track_caller]
    pub fn build(self, system: &mut TweenerSystem<C>) -> C::Id {
        confirm(self.try_build(system))
    }

    /// Fallible form of [`build`](Self::build). Nothing is created on error.
    pub fn try_build(
        self,
        system: &mut TweenerSystem<C>,
    ) -> Result<C::Id, ContractViolation<C::Id>> {
        if self.transform.is_none() {
            return Err(ContractViolation::MissingTransform);
        }
        if self.update.is_none() {
            return Err(ContractViolation::MissingUpdate);
        }
        if self.previous != C::Id::NONE && !system.is_valid_slot(self.previous) {
            return Err(ContractViolation::InvalidSlot { id: self.previous });
        }

        let id = system.try_configure(self.duration, self.update, self.transform)?;

        if let Some(callback) = self.on_start {
            system.try_on_start(id, callback)?;
        }
        if let Some(callback) = self.on_done {
            system.try_on_done(id, callback)?;
        }

        if self.previous == C::Id::NONE {
            system.try_start(id)?;
        } else {
            system.try_play_in_sequence(self.previous, id)?;
        }

        Ok(id)
    }
}
