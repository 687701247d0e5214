//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use tweeners::prelude::*;

pub type System = TweenerSystem<DefaultConfig>;
pub type Hook = Box<dyn FnMut(&mut System) + Send>;

pub const NOT_AN_ID: i32 = System::NOT_AN_ID;

/// What a tracked slot went through.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Counts {
    pub slot: i32,
    pub value: i32,
    pub start_count: u32,
    pub update_count: u32,
    pub done_count: u32,
}

#[derive(Default)]
struct Hooks {
    on_start: Option<Hook>,
    on_update: Option<Hook>,
    on_done: Option<Hook>,
}

/// Counts the callbacks of a slot and runs optional hooks after each of them.
#[derive(Clone, Default)]
pub struct Tracker {
    counts: Arc<Mutex<Counts>>,
    hooks: Arc<Mutex<Hooks>>,
}

impl Tracker {
    pub fn new() -> Self {
        let tracker = Self::default();
        tracker.counts().value = -1;
        tracker
    }

    pub fn counts(&self) -> MutexGuard<'_, Counts> {
        self.counts.lock().unwrap()
    }

    pub fn slot(&self) -> i32 {
        self.counts().slot
    }

    pub fn value(&self) -> i32 {
        self.counts().value
    }

    pub fn start_count(&self) -> u32 {
        self.counts().start_count
    }

    pub fn update_count(&self) -> u32 {
        self.counts().update_count
    }

    pub fn done_count(&self) -> u32 {
        self.counts().done_count
    }

    pub fn set_on_start(&self, hook: impl FnMut(&mut System) + Send + 'static) {
        self.hooks.lock().unwrap().on_start = Some(Box::new(hook));
    }

    pub fn set_on_update(&self, hook: impl FnMut(&mut System) + Send + 'static) {
        self.hooks.lock().unwrap().on_update = Some(Box::new(hook));
    }

    pub fn set_on_done(&self, hook: impl FnMut(&mut System) + Send + 'static) {
        self.hooks.lock().unwrap().on_done = Some(Box::new(hook));
    }

    pub fn start(&self, system: &mut System) {
        self.counts().start_count += 1;
        self.run_hook(system, |hooks| &mut hooks.on_start);
    }

    pub fn update(&self, system: &mut System, value: i32) {
        {
            let mut counts = self.counts();
            counts.update_count += 1;
            counts.value = value;
        }
        self.run_hook(system, |hooks| &mut hooks.on_update);
    }

    pub fn done(&self, system: &mut System) {
        self.counts().done_count += 1;
        self.run_hook(system, |hooks| &mut hooks.on_done);
    }

    /// Creates a linear slot from 0 to 100 over 10 reporting to this
    /// tracker, chained after `previous` or started right away.
    pub fn build(&self, system: &mut System, previous: i32) -> i32 {
        self.build_range(system, 0, 100, 10.0, previous)
    }

    pub fn build_range(
        &self,
        system: &mut System,
        from: i32,
        to: i32,
        duration: f32,
        previous: i32,
    ) -> i32 {
        let (on_update, on_start, on_done) = (self.clone(), self.clone(), self.clone());

        let slot = Builder::<DefaultConfig>::new()
            .range_transform_with(
                from,
                to,
                duration,
                move |system: &mut System, _: i32, value: i32| on_update.update(system, value),
                easing::linear,
            )
            .on_start(move |system: &mut System, _: i32| on_start.start(system))
            .on_done(move |system: &mut System, _: i32| on_done.done(system))
            .after(previous)
            .build(system);

        self.counts().slot = slot;
        slot
    }

    // The hook is moved out while it runs so it can reach the tracker too.
    fn run_hook(&self, system: &mut System, select: fn(&mut Hooks) -> &mut Option<Hook>) {
        let hook = select(&mut self.hooks.lock().unwrap()).take();

        if let Some(mut hook) = hook {
            hook(system);

            let mut hooks = self.hooks.lock().unwrap();
            let entry = select(&mut hooks);
            if entry.is_none() {
                *entry = Some(hook);
            }
        }
    }
}

/// A system and the trackers of its slots.
pub struct TestHelper {
    pub system: System,
}

impl TestHelper {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Creates a tracked slot; see [`Tracker::build`].
    pub fn insert(&mut self, previous: i32) -> Tracker {
        let tracker = Tracker::new();
        tracker.build(&mut self.system, previous);
        tracker
    }

    pub fn update(&mut self, step: f32) {
        self.system.update(step);
    }
}

/// Checks the start, update and done counts of a tracker, in this order.
#[track_caller]
pub fn assert_counts(tracker: &Tracker, start: u32, update: u32, done: u32) {
    let counts = tracker.counts().clone();
    assert_eq!(
        (counts.start_count, counts.update_count, counts.done_count),
        (start, update, done),
        "start, update and done counts of slot {}",
        counts.slot
    );
}
