use std::sync::{Arc, Mutex};
use tweeners::prelude::*;

type System = TweenerSystem<DefaultConfig>;

fn idle(system: &mut System, duration: f32) -> i32 {
    system.configure(duration, |_: &mut System, _, _| {}, easing::linear)
}

#[test]
fn starting_a_running_slot_is_refused() {
    let mut system = System::new();
    let id = idle(&mut system, 10.0);
    system.start(id);
    system.update(1.0);

    assert_eq!(
        system.try_start(id),
        Err(ContractViolation::NotReady {
            id,
            state: SlotState::Running
        })
    );
    assert_eq!(system.elapsed(id), Some(1.0));
}

#[test]
fn starting_a_chained_slot_is_refused() {
    let mut system = System::new();
    let first = idle(&mut system, 1.0);
    let second = idle(&mut system, 1.0);
    system.play_in_sequence(first, second);

    assert_eq!(
        system.try_start(second),
        Err(ContractViolation::AlreadyChained {
            id: second,
            predecessor: first
        })
    );
}

#[test]
fn a_self_loop_is_started_before_it_is_chained() {
    let mut system = System::new();
    let looping = idle(&mut system, 2.0);
    system.start(looping);
    assert_eq!(system.try_play_in_sequence(looping, looping), Ok(()));

    for _ in 0..5 {
        system.update(1.5);
    }
    assert_eq!(system.slot_state(looping), Some(SlotState::Running));
    assert_eq!(system.elapsed(looping), Some(1.5));

    let chained_first = idle(&mut system, 2.0);
    system.play_in_sequence(chained_first, chained_first);
    assert_eq!(
        system.try_start(chained_first),
        Err(ContractViolation::AlreadyChained {
            id: chained_first,
            predecessor: chained_first
        })
    );
}

#[test]
fn a_slot_has_a_single_predecessor() {
    let mut system = System::new();
    let first = idle(&mut system, 1.0);
    let second = idle(&mut system, 1.0);
    let third = idle(&mut system, 1.0);
    system.play_in_sequence(first, third);

    assert_eq!(
        system.try_play_in_sequence(second, third),
        Err(ContractViolation::AlreadyChained {
            id: third,
            predecessor: first
        })
    );
    assert!(system.successors(second).is_empty());
    assert_eq!(system.predecessor(third), Some(first));
}

#[test]
fn dead_slots_stay_valid_until_recycled() {
    let mut system = System::new();
    let id = idle(&mut system, 1.0);
    system.remove(id);

    assert!(system.is_valid_slot(id));
    assert_eq!(
        system.try_start(id),
        Err(ContractViolation::NotReady {
            id,
            state: SlotState::Dead
        })
    );

    system.update(1.0);

    assert!(!system.is_valid_slot(id));
    assert_eq!(
        system.try_remove(id),
        Err(ContractViolation::InvalidSlot { id })
    );
    assert_eq!(
        system.try_on_done(id, Box::new(|_: &mut System, _: i32| {})),
        Err(ContractViolation::InvalidSlot { id })
    );
}

#[test]
fn chaining_after_an_unknown_slot_creates_nothing() {
    let mut system = System::new();
    let value = Arc::new(Mutex::new(0));

    let result = Builder::<DefaultConfig>::new()
        .range_assign(0, 10, 1.0, value, easing::linear)
        .after(7)
        .try_build(&mut system);

    assert_eq!(result, Err(ContractViolation::InvalidSlot { id: 7 }));
    assert_eq!(system.slot_count(), 0);
}

#[test]
fn update_from_a_callback_is_refused() {
    let mut system = System::new();
    let seen = Arc::new(Mutex::new(None));

    let sink = seen.clone();
    Builder::<DefaultConfig>::new()
        .range_transform(0, 10, 10.0, |_: i32| {}, easing::linear)
        .on_start(move |system: &mut System, _| {
            *sink.lock().unwrap() = Some(system.try_update(1.0));
        })
        .build(&mut system);

    system.update(1.0);

    assert_eq!(
        *seen.lock().unwrap(),
        Some(Err(ContractViolation::ReentrantUpdate))
    );

    // The refused update did not advance anything.
    let id = 0;
    assert_eq!(system.elapsed(id), Some(1.0));
}

#[test]
#[should_panic(expected = "tweeners contract violation: slot 12 is not a valid slot")]
fn plain_operations_panic() {
    let mut system = System::new();
    system.start(12);
}

#[test]
#[should_panic(expected = "is already queued for start")]
fn starting_twice_before_an_update_panics() {
    let mut system = System::new();
    let id = idle(&mut system, 1.0);
    system.start(id);
    system.start(id);
}
