//! Contains common, primitive types shared by the tweeners engine.
//!
//! This module defines the identifier abstraction used to address slots in a
//! [`TweenerSystem`](crate::system::TweenerSystem). Identifiers are small
//! integers used as direct indices into the engine's dense storage, and they
//! are recycled once the slot they designate has been removed.

use std::fmt::Debug;
use std::hash::Hash;

/// An integral type usable as a slot identifier.
///
/// Every implementation reserves one value as the "no slot" sentinel
/// ([`SlotId::NONE`]); it never designates a valid slot. Signed types use
/// `-1`, unsigned types use their maximum value.
pub trait SlotId: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The sentinel value distinct from all valid identifiers.
    const NONE: Self;

    /// The position of the slot in the engine's storage.
    ///
    /// Negative identifiers map to out-of-range positions.
    fn index(self) -> usize;

    /// Builds the identifier of the slot stored at `index`.
    ///
    /// Returns `None` if the type cannot represent `index` or if `index`
    /// collides with the sentinel.
    fn from_index(index: usize) -> Option<Self>;
}

macro_rules! impl_unsigned_slot_id {
    ($($t:ty),*) => {
        $(
            impl SlotId for $t {
                const NONE: Self = <$t>::MAX;

                #[inline]
                fn index(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_index(index: usize) -> Option<Self> {
                    <$t>::try_from(index).ok().filter(|id| *id != Self::NONE)
                }
            }
        )*
    };
}

macro_rules! impl_signed_slot_id {
    ($($t:ty),*) => {
        $(
            impl SlotId for $t {
                const NONE: Self = -1;

                #[inline]
                fn index(self) -> usize {
                    usize::try_from(self).unwrap_or(usize::MAX)
                }

                #[inline]
                fn from_index(index: usize) -> Option<Self> {
                    <$t>::try_from(index).ok()
                }
            }
        )*
    };
}

impl_unsigned_slot_id!(u8, u16, u32, u64, usize);
impl_signed_slot_id!(i8, i16, i32, i64, isize);
