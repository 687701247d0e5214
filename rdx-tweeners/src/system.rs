//! The scheduler engine that drives every tweener.
//!
//! A [`TweenerSystem`] owns a set of slots. Each slot interpolates over a
//! duration, reports its progress to an update callback, and may notify start
//! and done callbacks. Slots can be chained so that a slot starts as soon as
//! its predecessor completes, within the same [`update`](TweenerSystem::update)
//! call and with the leftover time.
//!
//! All callbacks receive a mutable reference to the system and the identifier
//! of their slot, so they can create, start, chain or remove slots while the
//! system is updating. Slots created or started that way wait for the next
//! update. Removed slots are silenced immediately and recycled at the start of
//! the next update.

use crate::common::SlotId;
use crate::config::{CapacityConfig, Config, DefaultConfig, Float, TimeSpan};
use crate::contract::{confirm, ContractViolation};
use crate::slot_component::SlotComponent;
use tracing::{debug, trace};

/// The callback receiving the transformed progress of a slot on each update.
pub type UpdateFn<C> =
    Box<dyn FnMut(&mut TweenerSystem<C>, <C as Config>::Id, <C as Config>::Float) + Send>;

/// Maps the progress of a slot, in `[0, 1]`, to the ratio given to its update
/// callback.
pub type TransformFn<C> = Box<dyn FnMut(<C as Config>::Float) -> <C as Config>::Float + Send>;

/// A callback notified when a slot starts or completes.
pub type SlotFn<C> = Box<dyn FnMut(&mut TweenerSystem<C>, <C as Config>::Id) + Send>;

type Callbacks<C> = SlotComponent<Option<SlotFn<C>>, <C as Config>::Id>;

/// The lifecycle of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Configured and idle. It can be started.
    Ready,
    /// Advanced on every update.
    Running,
    /// Reached its duration during the current update.
    Done,
    /// Removed; waiting to be recycled by the next update.
    Dead,
    /// Not in use. Its identifier is handed out by the next configuration.
    Available,
}

#[derive(Debug, Clone, Copy)]
enum Notification {
    Start,
    Done,
}

struct Slot<C: Config> {
    duration: C::Duration,
    predecessor: C::Id,
    pending_start: bool,
    transform: Option<TransformFn<C>>,
    update: Option<UpdateFn<C>>,
}

impl<C: Config> Slot<C> {
    fn vacant() -> Self {
        Self {
            duration: C::Duration::zero(),
            predecessor: C::Id::NONE,
            pending_start: false,
            transform: None,
            update: None,
        }
    }
}

/// Schedules and advances the tweeners.
///
/// The plain operations panic on a contract violation; each of them has a
/// `try_*` counterpart returning the [`ContractViolation`] instead. A failed
/// operation leaves the system untouched.
pub struct TweenerSystem<C: Config = DefaultConfig> {
    /// Slots to start during the next update.
    start_queue: Vec<C::Id>,
    /// Slots completed during the current update.
    done_queue: Vec<C::Id>,
    /// Slots to recycle during the next update.
    dead_queue: Vec<C::Id>,
    /// Successors of the slots completed during the current update.
    sequence_queue: Vec<C::Id>,
    available_ids: Vec<C::Id>,

    // Per-slot properties, indexed by identifier.
    slot_states: Vec<SlotState>,
    slots: Vec<Slot<C>>,
    elapsed: Vec<C::Duration>,

    start_fns: Callbacks<C>,
    done_fns: Callbacks<C>,
    successors: SlotComponent<Vec<C::Id>, C::Id>,

    /// Slots advanced by the current or the next update.
    need_update: Vec<C::Id>,
    updating: bool,
}

impl<C: Config> Default for TweenerSystem<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Config> TweenerSystem<C> {
    /// An identifier distinct from every valid slot.
    pub const NOT_AN_ID: C::Id = <C::Id as SlotId>::NONE;

    pub fn new() -> Self {
        Self {
            start_queue: Vec::new(),
            done_queue: Vec::new(),
            dead_queue: Vec::new(),
            sequence_queue: Vec::new(),
            available_ids: Vec::new(),
            slot_states: Vec::new(),
            slots: Vec::new(),
            elapsed: Vec::new(),
            start_fns: SlotComponent::new(None),
            done_fns: SlotComponent::new(None),
            successors: SlotComponent::new(Vec::new()),
            need_update: Vec::new(),
            updating: false,
        }
    }

    /// Creates a system with the capacities of `capacity` reserved.
    pub fn with_capacity(capacity: &CapacityConfig) -> Self {
        let mut system = Self::new();
        system.reserve(
            capacity.slot_count,
            capacity.value_count_per_component,
            capacity.simultaneous_count,
        );
        system
    }

    /// Reserves storage for `slot_count` slots, of which
    /// `value_count_per_component` have a start callback, a done callback or
    /// successors, and `simultaneous_count` run at the same time.
    pub fn reserve(
        &mut self,
        slot_count: usize,
        value_count_per_component: usize,
        simultaneous_count: usize,
    ) {
        self.slot_states.reserve(slot_count);
        self.slots.reserve(slot_count);
        self.elapsed.reserve(slot_count);
        self.available_ids.reserve(slot_count);

        self.start_fns.reserve(slot_count, value_count_per_component);
        self.done_fns.reserve(slot_count, value_count_per_component);
        self.successors.reserve(slot_count, value_count_per_component);

        self.start_queue.reserve(simultaneous_count);
        self.done_queue.reserve(simultaneous_count);
        self.dead_queue.reserve(simultaneous_count);
        self.sequence_queue.reserve(simultaneous_count);
        self.need_update.reserve(simultaneous_count);
    }

    // --- Slot configuration ---

    /// Creates a slot lasting `duration`, in the [`Ready`](SlotState::Ready)
    /// state.
    ///
    /// The identifier of a removed slot may be reused once an update has
    /// recycled it.
    #[track_caller]
    pub fn configure<U, T>(&mut self, duration: C::Duration, update: U, transform: T) -> C::Id
    where
        U: FnMut(&mut TweenerSystem<C>, C::Id, C::Float) + Send + 'static,
        T: FnMut(C::Float) -> C::Float + Send + 'static,
    {
        confirm(self.try_configure(duration, Some(Box::new(update)), Some(Box::new(transform))))
    }

    /// Fallible form of [`configure`](Self::configure).
    pub fn try_configure(
        &mut self,
        duration: C::Duration,
        update: Option<UpdateFn<C>>,
        transform: Option<TransformFn<C>>,
    ) -> Result<C::Id, ContractViolation<C::Id>> {
        let transform = transform.ok_or(ContractViolation::MissingTransform)?;
        let update = update.ok_or(ContractViolation::MissingUpdate)?;

        let id = match self.available_ids.pop() {
            Some(id) => id,
            None => self.create_slot()?,
        };

        let i = id.index();
        self.slots[i] = Slot {
            duration,
            predecessor: C::Id::NONE,
            pending_start: false,
            transform: Some(transform),
            update: Some(update),
        };
        self.slot_states[i] = SlotState::Ready;
        self.elapsed[i] = C::Duration::zero();

        self.check_invariants();
        Ok(id)
    }

    /// Queues the slot to start during the next update.
    ///
    /// The slot must be [`Ready`](SlotState::Ready), not already queued, and
    /// not chained after another slot. Its elapsed time is reset.
    #[track_caller]
    pub fn start(&mut self, id: C::Id) {
        confirm(self.try_start(id))
    }

    /// Fallible form of [`start`](Self::start).
    pub fn try_start(&mut self, id: C::Id) -> Result<(), ContractViolation<C::Id>> {
        self.ensure_valid(id)?;

        let i = id.index();
        let state = self.slot_states[i];
        if state != SlotState::Ready {
            return Err(ContractViolation::NotReady { id, state });
        }

        let slot = &mut self.slots[i];
        if slot.pending_start {
            return Err(ContractViolation::AlreadyQueued { id });
        }
        if slot.predecessor != C::Id::NONE {
            return Err(ContractViolation::AlreadyChained {
                id,
                predecessor: slot.predecessor,
            });
        }

        slot.pending_start = true;
        self.elapsed[i] = C::Duration::zero();
        self.start_queue.push(id);

        self.check_invariants();
        Ok(())
    }

    /// Sets the callback invoked each time the slot starts.
    #[track_caller]
    pub fn on_start<F>(&mut self, id: C::Id, callback: F)
    where
        F: FnMut(&mut TweenerSystem<C>, C::Id) + Send + 'static,
    {
        confirm(self.try_on_start(id, Box::new(callback)))
    }

    /// Fallible form of [`on_start`](Self::on_start).
    pub fn try_on_start(
        &mut self,
        id: C::Id,
        callback: SlotFn<C>,
    ) -> Result<(), ContractViolation<C::Id>> {
        self.ensure_valid(id)?;
        self.start_fns.set(id, Some(callback));
        Ok(())
    }

    /// Sets the callback invoked each time the slot completes.
    #[track_caller]
    pub fn on_done<F>(&mut self, id: C::Id, callback: F)
    where
        F: FnMut(&mut TweenerSystem<C>, C::Id) + Send + 'static,
    {
        confirm(self.try_on_done(id, Box::new(callback)))
    }

    /// Fallible form of [`on_done`](Self::on_done).
    pub fn try_on_done(
        &mut self,
        id: C::Id,
        callback: SlotFn<C>,
    ) -> Result<(), ContractViolation<C::Id>> {
        self.ensure_valid(id)?;
        self.done_fns.set(id, Some(callback));
        Ok(())
    }

    /// Starts `second` each time `first` completes.
    ///
    /// `second` receives the time by which `first` overran its duration. A
    /// slot can have several successors but a single predecessor. Cycles,
    /// including a slot following itself, are allowed as long as one of
    /// their slots has a non-zero duration; otherwise the update never ends.
    #[track_caller]
    pub fn play_in_sequence(&mut self, first: C::Id, second: C::Id) {
        confirm(self.try_play_in_sequence(first, second))
    }

    /// Fallible form of [`play_in_sequence`](Self::play_in_sequence).
    pub fn try_play_in_sequence(
        &mut self,
        first: C::Id,
        second: C::Id,
    ) -> Result<(), ContractViolation<C::Id>> {
        self.ensure_valid(first)?;
        self.ensure_valid(second)?;

        let predecessor = self.slots[second.index()].predecessor;
        if predecessor != C::Id::NONE {
            return Err(ContractViolation::AlreadyChained {
                id: second,
                predecessor,
            });
        }

        self.slots[second.index()].predecessor = first;
        if self.successors.has_value(first) {
            self.successors.get_existing(first).push(second);
        } else {
            self.successors.set(first, vec![second]);
        }

        self.check_invariants();
        Ok(())
    }

    /// Removes the slot.
    ///
    /// The slot stops receiving callbacks immediately. Its identifier is
    /// released during the next update. Removing a slot twice is harmless.
    #[track_caller]
    pub fn remove(&mut self, id: C::Id) {
        confirm(self.try_remove(id))
    }

    /// Fallible form of [`remove`](Self::remove).
    pub fn try_remove(&mut self, id: C::Id) -> Result<(), ContractViolation<C::Id>> {
        self.ensure_valid(id)?;

        let state = &mut self.slot_states[id.index()];
        if *state != SlotState::Dead {
            *state = SlotState::Dead;
            self.dead_queue.push(id);
        }

        self.check_invariants();
        Ok(())
    }

    // --- Introspection ---

    /// The state of the slot, or `None` if no slot was ever created with this
    /// identifier.
    pub fn slot_state(&self, id: C::Id) -> Option<SlotState> {
        self.slot_states.get(id.index()).copied()
    }

    /// Whether the identifier designates a slot in use, dead ones included.
    pub fn is_valid_slot(&self, id: C::Id) -> bool {
        matches!(self.slot_state(id), Some(state) if state != SlotState::Available)
    }

    /// The time accumulated by the slot since it last started.
    pub fn elapsed(&self, id: C::Id) -> Option<C::Duration> {
        if self.is_valid_slot(id) {
            Some(self.elapsed[id.index()])
        } else {
            None
        }
    }

    /// The duration the slot was configured with.
    pub fn duration(&self, id: C::Id) -> Option<C::Duration> {
        if self.is_valid_slot(id) {
            Some(self.slots[id.index()].duration)
        } else {
            None
        }
    }

    /// The slot after which this one is chained, if any.
    pub fn predecessor(&self, id: C::Id) -> Option<C::Id> {
        if !self.is_valid_slot(id) {
            return None;
        }

        match self.slots[id.index()].predecessor {
            p if p == C::Id::NONE => None,
            p => Some(p),
        }
    }

    /// The slots started each time this one completes.
    pub fn successors(&self, id: C::Id) -> &[C::Id] {
        self.successors.lookup(id)
    }

    /// Number of slots currently running.
    pub fn running_count(&self) -> usize {
        self.slot_states
            .iter()
            .filter(|&&state| state == SlotState::Running)
            .count()
    }

    /// Number of slots in use, dead ones included.
    pub fn slot_count(&self) -> usize {
        self.slot_states.len() - self.available_ids.len()
    }

    // --- Update ---

    /// Advances time by `step`.
    ///
    /// Dead slots are recycled first, then the queued slots start, then every
    /// running slot is advanced. Slots completing during this call start their
    /// successors, which are advanced by the remaining time before the call
    /// returns.
    ///
    /// Must not be called from a callback.
    #[track_caller]
    pub fn update(&mut self, step: C::Duration) {
        confirm(self.try_update(step))
    }

    /// Fallible form of [`update`](Self::update).
    pub fn try_update(&mut self, step: C::Duration) -> Result<(), ContractViolation<C::Id>> {
        if self.updating {
            return Err(ContractViolation::ReentrantUpdate);
        }

        self.updating = true;
        trace!(
            "Update by {:?} with {} slots to advance.",
            step,
            self.need_update.len()
        );

        self.remove_dead_slots();

        let mut queue = std::mem::take(&mut self.start_queue);
        for &id in &queue {
            self.slots[id.index()].pending_start = false;
        }
        self.start_slots(&mut queue);
        Self::recycle_queue(&mut self.start_queue, queue);

        self.advance_current_time(step);

        let mut from = 0;
        loop {
            from = self.update_running_slots(from);
            self.stop_completed_slots();

            if self.sequence_queue.is_empty() {
                break;
            }

            let mut queue = std::mem::take(&mut self.sequence_queue);
            debug!("Starting {} slots in sequence.", queue.len());
            self.start_slots(&mut queue);
            Self::recycle_queue(&mut self.sequence_queue, queue);
        }

        self.updating = false;
        self.check_invariants();
        Ok(())
    }

    #[doc(hidden)]
    fn create_slot(&mut self) -> Result<C::Id, ContractViolation<C::Id>> {
        let count = self.slot_states.len();
        let id = C::Id::from_index(count)
            .ok_or(ContractViolation::SlotsExhausted { count: count + 1 })?;

        self.slot_states.push(SlotState::Available);
        self.slots.push(Slot::vacant());
        self.elapsed.push(C::Duration::zero());
        self.start_fns.add_slot();
        self.done_fns.add_slot();
        self.successors.add_slot();

        Ok(id)
    }

    fn ensure_valid(&self, id: C::Id) -> Result<(), ContractViolation<C::Id>> {
        if self.is_valid_slot(id) {
            Ok(())
        } else {
            Err(ContractViolation::InvalidSlot { id })
        }
    }

    /// Puts back a processed queue so its storage is reused, unless a
    /// callback queued new slots in the meantime.
    fn recycle_queue(slot: &mut Vec<C::Id>, mut queue: Vec<C::Id>) {
        if slot.is_empty() {
            queue.clear();
            *slot = queue;
        }
    }

    #[doc(hidden)]
    fn start_slots(&mut self, queue: &mut Vec<C::Id>) {
        let states = &mut self.slot_states;
        let need_update = &mut self.need_update;

        queue.retain(|&id| {
            let state = &mut states[id.index()];
            if *state != SlotState::Ready {
                return false;
            }

            *state = SlotState::Running;
            need_update.push(id);
            true
        });

        for &id in queue.iter() {
            // An earlier start callback may have removed this one.
            if self.slot_states[id.index()] == SlotState::Running {
                self.notify(Notification::Start, id);
            }
        }
    }

    fn advance_current_time(&mut self, step: C::Duration) {
        for &id in &self.need_update {
            let elapsed = &mut self.elapsed[id.index()];
            *elapsed = *elapsed + step;
        }
    }

    /// Advances the running slots of `need_update[from..]` and drops the
    /// others from the list. Returns the new length of the list.
    #[doc(hidden)]
    fn update_running_slots(&mut self, from: usize) -> usize {
        let mut kept = from;

        for read in from..self.need_update.len() {
            let id = self.need_update[read];
            if self.slot_states[id.index()] != SlotState::Running {
                continue;
            }

            self.update_tweener(id);

            if self.slot_states[id.index()] == SlotState::Running {
                self.need_update[kept] = id;
                kept += 1;
            }
        }

        self.need_update.truncate(kept);
        kept
    }

    #[doc(hidden)]
    fn update_tweener(&mut self, id: C::Id) {
        let i = id.index();
        let duration = self.slots[i].duration;
        let elapsed = self.elapsed[i];

        let progress = if elapsed < duration {
            elapsed.ratio::<C::Float>(duration)
        } else {
            self.complete_slot(id, elapsed - duration);
            C::Float::one()
        };

        let ratio = match self.slots[i].transform.as_mut() {
            Some(transform) => transform(progress),
            None => progress,
        };

        if let Some(mut update) = self.slots[i].update.take() {
            update(self, id, ratio);

            let slot = &mut self.slots[i];
            if slot.update.is_none() {
                slot.update = Some(update);
            }
        }
    }

    fn complete_slot(&mut self, id: C::Id, successors_elapsed: C::Duration) {
        self.slot_states[id.index()] = SlotState::Done;
        self.done_queue.push(id);

        for &next in self.successors.lookup(id) {
            self.elapsed[next.index()] = successors_elapsed;
            self.sequence_queue.push(next);
        }
    }

    #[doc(hidden)]
    fn stop_completed_slots(&mut self) {
        let mut done = std::mem::take(&mut self.done_queue);
        let states = &mut self.slot_states;

        done.retain(|&id| {
            let state = &mut states[id.index()];
            if *state != SlotState::Done {
                return false;
            }

            *state = SlotState::Ready;
            true
        });

        // Every completed slot is notified, even if a sibling's done callback
        // removed it in the meantime.
        for &id in &done {
            self.notify(Notification::Done, id);
        }

        Self::recycle_queue(&mut self.done_queue, done);
    }

    fn callbacks(&mut self, notification: Notification) -> &mut Callbacks<C> {
        match notification {
            Notification::Start => &mut self.start_fns,
            Notification::Done => &mut self.done_fns,
        }
    }

    /// Invokes a start or done callback. The callback is moved out of the
    /// store during the call, then put back unless it was replaced.
    fn notify(&mut self, notification: Notification, id: C::Id) {
        let Some(mut callback) = self
            .callbacks(notification)
            .get_mut(id)
            .and_then(Option::take)
        else {
            return;
        };

        callback(self, id);

        if let Some(entry) = self.callbacks(notification).get_mut(id) {
            if entry.is_none() {
                *entry = Some(callback);
            }
        }
    }

    #[doc(hidden)]
    fn remove_dead_slots(&mut self) {
        if self.dead_queue.is_empty() {
            return;
        }

        let mut dead = std::mem::take(&mut self.dead_queue);
        dead.sort_unstable();
        dead.dedup();
        debug!("Recycling {} dead slots.", dead.len());

        for &id in &dead {
            let i = id.index();
            let slot = &mut self.slots[i];
            slot.update = None;
            slot.transform = None;
            slot.pending_start = false;

            let predecessor = std::mem::replace(&mut slot.predecessor, C::Id::NONE);
            if predecessor != C::Id::NONE {
                self.remove_from_predecessor_successors(predecessor, id);
            }

            for &next in self.successors.lookup(id) {
                self.slots[next.index()].predecessor = C::Id::NONE;
            }

            self.elapsed[i] = C::Duration::zero();
            self.slot_states[i] = SlotState::Available;
            self.available_ids.push(id);
        }

        self.start_fns.erase(&dead);
        self.done_fns.erase(&dead);
        self.successors.erase(&dead);

        let is_alive = |id: &C::Id| dead.binary_search(id).is_err();
        self.start_queue.retain(is_alive);
        self.done_queue.retain(is_alive);
        self.sequence_queue.retain(is_alive);
        self.need_update.retain(is_alive);

        dead.clear();
        Self::recycle_queue(&mut self.dead_queue, dead);
    }

    fn remove_from_predecessor_successors(&mut self, predecessor: C::Id, successor: C::Id) {
        let Some(successors) = self.successors.get_mut(predecessor) else {
            return;
        };

        successors.retain(|&id| id != successor);
        if successors.is_empty() {
            self.successors.erase(&[predecessor]);
        }
    }

    // --- Internal consistency checks ---

    #[cfg(any(test, feature = "debug-invariants"))]
    fn check_invariants(&self) {
        self.check_update_queue_invariants();
        self.check_sequences_invariants();
        self.check_available_ids();
        self.start_fns.check_invariants();
        self.done_fns.check_invariants();
        self.successors.check_invariants();
    }

    #[cfg(not(any(test, feature = "debug-invariants")))]
    #[inline(always)]
    fn check_invariants(&self) {}

    #[cfg(any(test, feature = "debug-invariants"))]
    fn check_update_queue_invariants(&self) {
        let mut ids = self.need_update.clone();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(
            ids.len(),
            self.need_update.len(),
            "a slot is advanced twice per update"
        );
    }

    #[cfg(any(test, feature = "debug-invariants"))]
    fn check_sequences_invariants(&self) {
        for (i, slot) in self.slots.iter().enumerate() {
            if self.slot_states[i] == SlotState::Available {
                continue;
            }

            let Some(id) = C::Id::from_index(i) else {
                continue;
            };

            if slot.predecessor != C::Id::NONE {
                assert!(
                    self.successors(slot.predecessor).contains(&id),
                    "slot {id:?} is not a successor of its predecessor {:?}",
                    slot.predecessor
                );
            }

            for &next in self.successors(id) {
                assert_eq!(
                    self.slots[next.index()].predecessor,
                    id,
                    "slot {next:?} follows {id:?} but does not link back"
                );
            }
        }
    }

    #[cfg(any(test, feature = "debug-invariants"))]
    fn check_available_ids(&self) {
        for &id in &self.available_ids {
            let i = id.index();
            assert_eq!(self.slot_states[i], SlotState::Available);
            assert_eq!(self.slots[i].predecessor, C::Id::NONE);
            assert!(!self.successors.has_value(id));
            assert!(!self.start_queue.contains(&id));
            assert!(!self.need_update.contains(&id));
        }
    }
}
