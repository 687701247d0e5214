//! Reports the misuses of the scheduling API.
//!
//! Each fallible operation of [`TweenerSystem`](crate::system::TweenerSystem)
//! exists in two forms: a `try_*` form returning a [`ContractViolation`], and
//! a plain form that panics with the violation message at the caller's
//! location. In both cases the check happens before any mutation.

use crate::system::SlotState;
use std::fmt::Debug;
use thiserror::Error;

/// A precondition of the scheduling API that the caller did not respect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation<Id: Debug> {
    #[error("slot {id:?} is not a valid slot")]
    InvalidSlot { id: Id },

    #[error("slot {id:?} cannot be started while {state:?}")]
    NotReady { id: Id, state: SlotState },

    #[error("slot {id:?} is already queued for start")]
    AlreadyQueued { id: Id },

    #[error("slot {id:?} is chained after slot {predecessor:?}")]
    AlreadyChained { id: Id, predecessor: Id },

    #[error("a transform is required")]
    MissingTransform,

    #[error("an update callback is required")]
    MissingUpdate,

    #[error("no identifier left to address slot number {count}")]
    SlotsExhausted { count: usize },

    #[error("update() called from within a callback")]
    ReentrantUpdate,
}

/// Unwraps the result of a `try_*` operation, panicking on violation.
#[track_caller]
pub(crate) fn confirm<T, Id: Debug>(result: Result<T, ContractViolation<Id>>) -> T {
    match result {
        Ok(value) => value,
        Err(violation) => panic!("tweeners contract violation: {violation}"),
    }
}
