//! Dense storage attaching an optional value to each slot.
//!
//! Most slots have neither a start callback, a done callback nor successors.
//! A [`SlotComponent`] keeps the assigned values packed in a vector and maps
//! every slot to its position in that vector. Slots without a value map to
//! position zero, where the shared default lives, so a lookup never fails and
//! never allocates.

use crate::common::SlotId;

/// Maps slot identifiers to optional values of type `T`.
#[derive(Debug, Clone)]
pub struct SlotComponent<T, Id: SlotId> {
    /// Position 0 holds the default value.
    values: Vec<T>,
    /// For each slot, the position of its value; 0 if it has none.
    value_index_from_slot: Vec<usize>,
    /// For each position in `values`, the slot owning it. Position 0 is
    /// owned by no slot.
    slot_from_value_index: Vec<Id>,
}

impl<T, Id: SlotId> SlotComponent<T, Id> {
    /// Creates an empty store whose unassigned slots resolve to `default`.
    pub fn new(default: T) -> Self {
        Self {
            values: vec![default],
            value_index_from_slot: Vec::new(),
            slot_from_value_index: vec![Id::NONE],
        }
    }

    /// Reserves room for `slot_count` slots and `value_count` values.
    pub fn reserve(&mut self, slot_count: usize, value_count: usize) {
        self.value_index_from_slot.reserve(slot_count);
        self.values.reserve(value_count);
        self.slot_from_value_index.reserve(value_count);
    }

    /// Registers the next slot. Identifiers are contiguous from zero, so the
    /// new slot is the one at position [`len`](Self::len) before the call.
    pub fn add_slot(&mut self) {
        self.value_index_from_slot.push(0);
    }

    /// Assigns `value` to the slot, replacing any previous value.
    pub fn set(&mut self, id: Id, value: T) {
        let slot = id.index();
        debug_assert!(slot < self.value_index_from_slot.len(), "unknown slot {id:?}");

        match self.value_index_from_slot[slot] {
            0 => {
                self.value_index_from_slot[slot] = self.values.len();
                self.values.push(value);
                self.slot_from_value_index.push(id);
            }
            index => self.values[index] = value,
        }
    }

    /// Whether a value was assigned to the slot.
    pub fn has_value(&self, id: Id) -> bool {
        self.position(id) != 0
    }

    /// The value assigned to the slot.
    ///
    /// The slot must have a value; see [`has_value`](Self::has_value).
    pub fn get_existing(&mut self, id: Id) -> &mut T {
        let index = self.position(id);
        debug_assert!(index != 0, "slot {id:?} has no value");
        &mut self.values[index]
    }

    /// The value assigned to the slot, if any.
    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        match self.position(id) {
            0 => None,
            index => Some(&mut self.values[index]),
        }
    }

    /// The value assigned to the slot, or the default.
    pub fn lookup(&self, id: Id) -> &T {
        &self.values[self.position(id)]
    }

    /// Removes the values assigned to the given slots.
    ///
    /// Slots without a value are skipped, and so are repeated identifiers.
    /// The last value is moved into each freed position.
    pub fn erase(&mut self, ids: &[Id]) {
        for &id in ids {
            let index = self.position(id);
            if index == 0 {
                continue;
            }

            let last = self.values.len() - 1;
            if index != last {
                self.values.swap(index, last);
                let moved = self.slot_from_value_index[last];
                self.slot_from_value_index[index] = moved;
                self.value_index_from_slot[moved.index()] = index;
            }

            self.values.pop();
            self.slot_from_value_index.pop();
            self.value_index_from_slot[id.index()] = 0;
        }
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.value_index_from_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value_index_from_slot.is_empty()
    }

    /// Number of slots having a value.
    pub fn value_count(&self) -> usize {
        self.values.len() - 1
    }

    /// Panics if the slot-to-value and value-to-slot maps disagree.
    pub fn check_invariants(&self) {
        assert_eq!(self.values.len(), self.slot_from_value_index.len());

        for (index, &id) in self.slot_from_value_index.iter().enumerate().skip(1) {
            assert_eq!(
                self.value_index_from_slot[id.index()],
                index,
                "value {index} is owned by slot {id:?} which does not point to it"
            );
        }

        let assigned = self
            .value_index_from_slot
            .iter()
            .filter(|&&index| index != 0)
            .count();
        assert_eq!(assigned, self.value_count());
    }

    fn position(&self, id: Id) -> usize {
        self.value_index_from_slot
            .get(id.index())
            .copied()
            .unwrap_or(0)
    }
}
