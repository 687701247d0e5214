use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tweeners::prelude::*;

const STEPS: [f32; 6] = [1.0, 1.0, 1.0, 2.0, 3.0, 3.0];

/// Alternates between the end and the start of the range, counting its calls.
fn toggling_transform(calls: Arc<AtomicU32>) -> impl FnMut(f32) -> f32 + Send + 'static {
    let mut result = 0.0;
    move |_: f32| {
        calls.fetch_add(1, Ordering::Relaxed);
        result = 1.0 - result;
        result
    }
}

#[test]
fn assign_target() {
    let value = Arc::new(Mutex::new(-1));
    let mut system = TweenerSystem::<DefaultConfig>::new();

    Builder::<DefaultConfig>::new()
        .range_assign(0, 100, 10.0, value.clone(), easing::linear)
        .build(&mut system);

    for (step, expected) in STEPS.into_iter().zip([10, 20, 30, 50, 80, 100]) {
        system.update(step);
        assert_eq!(*value.lock().unwrap(), expected);
    }
}

#[test]
fn update_callback() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut system = TweenerSystem::<DefaultConfig>::new();

    let sink = seen.clone();
    Builder::<DefaultConfig>::new()
        .range_transform(
            0,
            100,
            10.0,
            move |v: i32| sink.lock().unwrap().push(v),
            easing::linear,
        )
        .build(&mut system);

    for step in STEPS {
        system.update(step);
    }

    assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30, 50, 80, 100]);
}

#[test]
fn stateful_transform_assign_target() {
    let value = Arc::new(Mutex::new(-1));
    let calls = Arc::new(AtomicU32::new(0));
    let mut system = TweenerSystem::<DefaultConfig>::new();

    Builder::<DefaultConfig>::new()
        .range_assign(0, 100, 10.0, value.clone(), toggling_transform(calls.clone()))
        .build(&mut system);

    for (i, step) in STEPS.into_iter().enumerate() {
        system.update(step);
        assert_eq!(calls.load(Ordering::Relaxed), i as u32 + 1);
        assert_eq!(*value.lock().unwrap(), if i % 2 == 0 { 100 } else { 0 });
    }
}

#[test]
fn stateful_transform_update_callback() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicU32::new(0));
    let mut system = TweenerSystem::<DefaultConfig>::new();

    let sink = seen.clone();
    Builder::<DefaultConfig>::new()
        .range_transform(
            0,
            100,
            10.0,
            move |v: i32| sink.lock().unwrap().push(v),
            toggling_transform(calls.clone()),
        )
        .build(&mut system);

    for step in STEPS {
        system.update(step);
    }

    assert_eq!(calls.load(Ordering::Relaxed), 6);
    assert_eq!(*seen.lock().unwrap(), vec![100, 0, 100, 0, 100, 0]);
}

#[test]
fn on_start_on_done() {
    #[derive(Default)]
    struct Log {
        value: i32,
        starts: u32,
        updates: u32,
        dones: u32,
    }

    let log = Arc::new(Mutex::new(Log::default()));
    let mut system = TweenerSystem::<DefaultConfig>::new();

    let (on_update, on_start, on_done) = (log.clone(), log.clone(), log.clone());
    Builder::<DefaultConfig>::new()
        .range_transform(
            0,
            100,
            10.0,
            move |v: i32| {
                let mut log = on_update.lock().unwrap();
                assert_eq!(log.starts, 1);
                assert_eq!(log.dones, 0);
                log.updates += 1;
                log.value = v;
            },
            easing::linear,
        )
        .on_start(move |_, _| {
            let mut log = on_start.lock().unwrap();
            assert_eq!(log.updates, 0);
            log.starts += 1;
        })
        .on_done(move |_, _| {
            let mut log = on_done.lock().unwrap();
            assert_eq!(log.starts, 1);
            assert_eq!(log.updates, 6);
            assert_eq!(log.dones, 0);
            log.dones += 1;
        })
        .build(&mut system);

    assert_eq!(log.lock().unwrap().starts, 0);

    for (i, (step, expected)) in STEPS.into_iter().zip([10, 20, 30, 50, 80, 100]).enumerate() {
        system.update(step);

        let log = log.lock().unwrap();
        assert_eq!(log.starts, 1);
        assert_eq!(log.updates, i as u32 + 1);
        assert_eq!(log.dones, if i == 5 { 1 } else { 0 });
        assert_eq!(log.value, expected);
    }
}

#[test]
fn callbacks_receive_their_slot() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut system = TweenerSystem::<DefaultConfig>::new();

    let (on_update, on_start, on_done) = (seen.clone(), seen.clone(), seen.clone());
    let id = Builder::<DefaultConfig>::new()
        .range_transform_with(
            0.0f32,
            1.0,
            1.0,
            move |_: &mut TweenerSystem, id: i32, _: f32| on_update.lock().unwrap().push(id),
            easing::linear,
        )
        .on_start(move |_, id| on_start.lock().unwrap().push(id))
        .on_done(move |_, id| on_done.lock().unwrap().push(id))
        .build(&mut system);

    system.update(2.0);

    assert_eq!(*seen.lock().unwrap(), vec![id, id, id]);
}
