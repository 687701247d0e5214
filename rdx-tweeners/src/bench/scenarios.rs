//! Workloads measuring the update of a large system.

use super::options::BenchOptions;
use super::registry::BenchReport;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use tweeners::prelude::*;

/// The initial count of slots, each with start and done callbacks, followed
/// by generations of half as many slots chained after the previous one.
/// Updates until no slot runs.
pub fn self_default(options: &BenchOptions) -> BenchReport {
    let mut slot_count = options.initial_count;

    let running = Arc::new(AtomicI64::new(0));
    let total = Arc::new(AtomicI64::new(0));
    let update_count = Arc::new(AtomicU64::new(0));

    let mut system = TweenerSystem::<DefaultConfig>::new();
    system.reserve(slot_count * 2, slot_count * 2, slot_count);

    let insert = |system: &mut TweenerSystem, i: usize, previous: i32| -> i32 {
        let running_start = running.clone();
        let running_done = running.clone();
        let total_start = total.clone();
        let update_count = update_count.clone();

        Builder::<DefaultConfig>::new()
            .range_transform(
                0,
                100,
                duration_at(options, i),
                move |_: i32| {
                    update_count.fetch_add(1, Ordering::Relaxed);
                },
                easing::linear,
            )
            .on_start(move |_, _| {
                running_start.fetch_add(1, Ordering::Relaxed);
                total_start.fetch_add(1, Ordering::Relaxed);
            })
            .on_done(move |_, _| {
                running_done.fetch_sub(1, Ordering::Relaxed);
            })
            .after(previous)
            .build(system)
    };

    let mut slots: Vec<i32> = (0..slot_count)
        .map(|i| insert(&mut system, i, TweenerSystem::<DefaultConfig>::NOT_AN_ID))
        .collect();

    slot_count /= 2;
    while slot_count != 0 {
        let previous_slots = std::mem::take(&mut slots);
        slots = (0..slot_count)
            .map(|i| insert(&mut system, i, previous_slots[(i / 2) * 4]))
            .collect();
        slot_count /= 2;
    }

    debug!("Created {} slots.", system.slot_count());

    let start = Instant::now();
    loop {
        system.update(options.update);
        if running.load(Ordering::Relaxed) == 0 {
            break;
        }
    }
    let elapsed = start.elapsed();

    debug!("{} slots started.", total.load(Ordering::Relaxed));

    BenchReport {
        update_count: update_count.load(Ordering::Relaxed),
        elapsed,
    }
}

/// As many slots as in [`self_default`], all started at once, without
/// callbacks nor sequences.
pub fn self_flat(options: &BenchOptions) -> BenchReport {
    let mut slot_count = 0;
    let mut generation = options.initial_count;
    while generation != 0 {
        slot_count += generation;
        generation /= 2;
    }

    let remaining = Arc::new(AtomicI64::new(slot_count as i64));
    let update_count = Arc::new(AtomicU64::new(0));

    let mut system = TweenerSystem::<DefaultConfig>::new();
    system.reserve(slot_count, 0, slot_count);

    for i in 0..slot_count {
        let remaining = remaining.clone();
        let update_count = update_count.clone();

        // Only the completing update sees the end of the linear curve.
        let id = system.configure(
            duration_at(options, i),
            move |_: &mut TweenerSystem, _, ratio: f32| {
                update_count.fetch_add(1, Ordering::Relaxed);
                if ratio >= 1.0 {
                    remaining.fetch_sub(1, Ordering::Relaxed);
                }
            },
            easing::linear,
        );
        system.start(id);
    }

    let start = Instant::now();
    loop {
        system.update(options.update);
        if remaining.load(Ordering::Relaxed) <= 0 {
            break;
        }
    }

    BenchReport {
        update_count: update_count.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    }
}

fn duration_at(options: &BenchOptions, i: usize) -> f32 {
    options.durations[i % options.durations.len()]
}
