use std::any::type_name;
use std::mem;

use crate::{PoolExhausted, Result};

/// A fixed-capacity collection of `CAPACITY` slots, each holding one value of
/// type `T`, with O(1) allocation, release and lookup by stable position.
///
/// Free slots are threaded into an intrusive singly-linked list through their
/// own storage, so the pool performs no allocations of its own after
/// construction. [`new()`][Self::new] is a `const fn`, which means a pool can
/// live in a `static` (behind external synchronization) just as well as on
/// the stack or the heap.
///
/// There are two ways to put a value into the pool:
///
/// * [`allocate()`][Self::allocate] - hands over a value and returns the
///   position it was stored at.
/// * [`begin_allocate()`][Self::begin_allocate] - reserves a slot and reports
///   its position before the value exists; the reservation is completed with
///   [`fill()`][SlotReservation::fill] or abandoned by dropping it, leaving
///   the pool unchanged. Useful when the value comes from a fallible step
///   that must not leak a slot on failure.
///
/// Positions are stable: once a value is stored, its position never changes
/// until the value is released, and released positions are reused by later
/// allocations.
///
/// # Examples
///
/// ```
/// use slot_pool::SlotPool;
///
/// let mut pool = SlotPool::<&str, 4>::new();
///
/// let position = pool.allocate("first").unwrap();
/// assert_eq!(pool.lookup(position), Some(&"first"));
///
/// assert_eq!(pool.release(position), Some("first"));
/// assert_eq!(pool.lookup(position), None);
/// ```
///
/// A pool with no free slots reports exhaustion instead of growing:
///
/// ```
/// use slot_pool::SlotPool;
///
/// let mut pool = SlotPool::<u32, 2>::new();
///
/// pool.allocate(1).unwrap();
/// pool.allocate(2).unwrap();
///
/// assert!(pool.allocate(3).is_err());
/// ```
#[derive(Debug)]
pub struct SlotPool<T, const CAPACITY: usize> {
    /// One entry per position, holding either a live value or a link in the
    /// free list. Entries never move, which is what makes positions stable.
    entries: [Entry<T>; CAPACITY],

    /// Head of the free list. Starts out `Uninitialized`; the first mutating
    /// operation builds the list and publishes the head.
    first_free: FreeLink,

    /// Tail of the free list, tracked so a release onto an empty list can
    /// set both ends of the chain in O(1).
    last_free: FreeLink,

    /// Number of currently allocated slots.
    count: usize,
}

/// One slot's storage: either a live value or a link in the free list.
#[derive(Debug)]
enum Entry<T> {
    /// The slot is allocated and owns a live value.
    Occupied { value: T },

    /// The slot is free; `next_free` threads it into the free list, with
    /// `None` marking the end of the chain.
    Vacant { next_free: Option<usize> },
}

/// Where the pool's free list begins or ends.
///
/// The two memberless states are deliberately distinct: a pristine pool has
/// no list at all (`Uninitialized`), while a fully allocated pool has a list
/// that exists but is empty (`Empty`). Collapsing them would make it
/// impossible to build the list lazily exactly once.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FreeLink {
    /// The list has not been built yet; every slot is implicitly free.
    Uninitialized,

    /// The list is built and has no members; every slot is occupied.
    Empty,

    /// The list starts (or ends) at this slot position.
    At(usize),
}

impl<T, const CAPACITY: usize> SlotPool<T, CAPACITY> {
    /// Creates an empty pool.
    ///
    /// This is a `const fn`: the free-list links are not built here but by
    /// the first mutating operation, so construction is O(1) in work even
    /// for large capacities and is usable in `static` initializers.
    ///
    /// # Panics
    ///
    /// Panics if `CAPACITY` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Mutex;
    ///
    /// use slot_pool::SlotPool;
    ///
    /// static UNITS: Mutex<SlotPool<u8, 4>> = Mutex::new(SlotPool::new());
    ///
    /// let position = UNITS.lock().unwrap().allocate(77).unwrap();
    /// assert_eq!(UNITS.lock().unwrap().lookup(position), Some(&77));
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        assert!(CAPACITY > 0, "SlotPool must have non-zero capacity");

        Self {
            entries: [const { Entry::Vacant { next_free: None } }; CAPACITY],
            first_free: FreeLink::Uninitialized,
            last_free: FreeLink::Uninitialized,
            count: 0,
        }
    }

    /// The maximum number of values the pool can hold.
    #[expect(
        clippy::unused_self,
        reason = "method form matches the other containers callers already know"
    )]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    /// The number of currently allocated slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no slot is currently allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if every slot is currently allocated.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == CAPACITY
    }

    /// The number of slots currently available for allocation.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        CAPACITY
            .checked_sub(self.count)
            .expect("count never exceeds capacity")
    }

    /// Returns a reference to the value at `position` if that slot is
    /// currently allocated.
    ///
    /// Free slots - including the slot most recently released, which forms
    /// the head or tail of the free list - and out-of-range positions all
    /// report `None`; only a position belonging to a live allocation yields
    /// a value. Never mutates the pool.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::<u32, 4>::new();
    ///
    /// assert_eq!(pool.lookup(0), None);
    ///
    /// let position = pool.allocate(99).unwrap();
    /// assert_eq!(pool.lookup(position), Some(&99));
    /// ```
    #[must_use]
    pub fn lookup(&self, position: usize) -> Option<&T> {
        match self.entries.get(position)? {
            Entry::Occupied { value } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Returns an exclusive reference to the value at `position` if that
    /// slot is currently allocated.
    #[must_use]
    pub fn lookup_mut(&mut self, position: usize) -> Option<&mut T> {
        match self.entries.get_mut(position)? {
            Entry::Occupied { value } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Stores `value` in a free slot and returns the slot's stable position.
    ///
    /// The position doubles as the value's external identity: it stays valid
    /// until the value is released and can be handed out as a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PoolExhausted`] if every slot is occupied. The pool is
    /// unchanged in that case.
    pub fn allocate(&mut self, value: T) -> Result<usize> {
        let reservation = self.begin_allocate()?;
        let position = reservation.position();
        reservation.fill(value);

        Ok(position)
    }

    /// Reserves a free slot without storing a value in it yet.
    ///
    /// The returned reservation reports the slot's position up front and is
    /// completed with [`fill()`][SlotReservation::fill]. Dropping the
    /// reservation unfilled abandons it and leaves the pool unchanged, which
    /// makes this the right entry point when the value comes from a step
    /// that can fail.
    ///
    /// # Errors
    ///
    /// Returns [`PoolExhausted`] if every slot is occupied.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::<String, 2>::new();
    ///
    /// let reservation = pool.begin_allocate().unwrap();
    /// let position = reservation.position();
    /// reservation.fill("ready".to_string());
    ///
    /// assert_eq!(pool.lookup(position), Some(&"ready".to_string()));
    /// ```
    pub fn begin_allocate(&mut self) -> Result<SlotReservation<'_, T, CAPACITY>> {
        self.ensure_initialized();

        #[cfg(debug_assertions)]
        self.integrity_check();

        let FreeLink::At(position) = self.first_free else {
            return Err(PoolExhausted::new(CAPACITY));
        };

        Ok(SlotReservation {
            pool: self,
            position,
        })
    }

    /// Releases the slot at `position`, returning its value.
    ///
    /// The slot is pushed onto the head of the free list, so it is the first
    /// candidate for the next allocation. Positions that are out of range or
    /// not currently allocated - including a repeated release of the same
    /// position - are rejected with `None` and leave the pool unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::<u32, 2>::new();
    ///
    /// let position = pool.allocate(8).unwrap();
    ///
    /// assert_eq!(pool.release(position), Some(8));
    /// assert_eq!(pool.release(position), None);
    /// ```
    pub fn release(&mut self, position: usize) -> Option<T> {
        match self.entries.get(position) {
            Some(Entry::Occupied { .. }) => {}
            Some(Entry::Vacant { .. }) | None => return None,
        }

        // The released slot points at the old head; if the list was empty,
        // the released slot also terminates the chain.
        let next_free = match self.first_free {
            FreeLink::At(first) => Some(first),
            FreeLink::Empty | FreeLink::Uninitialized => None,
        };

        let entry = self
            .entries
            .get_mut(position)
            .expect("guarded by the occupancy check above");

        let value = match mem::replace(entry, Entry::Vacant { next_free }) {
            Entry::Occupied { value } => value,
            Entry::Vacant { .. } => panic!(
                "release({position}) found a vacant entry after the occupancy check in pool of {}",
                type_name::<T>()
            ),
        };

        self.first_free = FreeLink::At(position);

        // A release onto an empty list makes this slot the tail as well.
        if matches!(self.last_free, FreeLink::Empty | FreeLink::Uninitialized) {
            self.last_free = FreeLink::At(position);
        }

        self.count = self
            .count
            .checked_sub(1)
            .expect("guarded by the occupancy check above");

        #[cfg(debug_assertions)]
        self.integrity_check();

        Some(value)
    }

    /// Builds the free list on first use: slot k links to slot k+1 and the
    /// head/tail are published so that the very first allocation can
    /// succeed. Idempotent; runs at most once per pool.
    fn ensure_initialized(&mut self) {
        if self.first_free != FreeLink::Uninitialized {
            return;
        }

        let last = CAPACITY
            .checked_sub(1)
            .expect("guarded by the non-zero capacity assertion in new()");

        for (position, entry) in self.entries.iter_mut().enumerate() {
            let next_free = position.checked_add(1).filter(|&next| next <= last);
            *entry = Entry::Vacant { next_free };
        }

        self.first_free = FreeLink::At(0);
        self.last_free = FreeLink::At(last);
    }

    #[cfg_attr(test, mutants::skip)] // Test-only diagnostics, mutation is meaningless.
    #[cfg(debug_assertions)]
    fn integrity_check(&self) {
        let mut observed_occupied = 0_usize;

        for entry in &self.entries {
            if matches!(entry, Entry::Occupied { .. }) {
                observed_occupied = observed_occupied
                    .checked_add(1)
                    .expect("bounded by CAPACITY");
            }
        }

        assert!(
            observed_occupied == self.count,
            "self.count {} does not match the observed occupied count {observed_occupied} in pool of {}",
            self.count,
            type_name::<T>()
        );

        if self.first_free == FreeLink::Uninitialized {
            assert!(
                self.last_free == FreeLink::Uninitialized,
                "free list tail was published before the head in pool of {}",
                type_name::<T>()
            );
            assert!(
                self.count == 0,
                "uninitialized pool of {} claims live allocations",
                type_name::<T>()
            );
            return;
        }

        // Walk the free chain from head to tail, verifying its length, its
        // termination and that it only visits vacant slots.
        let mut cursor = match self.first_free {
            FreeLink::At(first) => Some(first),
            FreeLink::Empty | FreeLink::Uninitialized => None,
        };
        let mut chain_length = 0_usize;
        let mut last_visited = None;

        while let Some(position) = cursor {
            assert!(
                chain_length < CAPACITY,
                "free list contains a cycle in pool of {}",
                type_name::<T>()
            );
            chain_length = chain_length
                .checked_add(1)
                .expect("guarded by the cycle assertion above");

            match self.entries.get(position) {
                Some(Entry::Vacant { next_free }) => {
                    last_visited = Some(position);
                    cursor = *next_free;
                }
                Some(Entry::Occupied { .. }) => panic!(
                    "free link points at the occupied slot {position} in pool of {}",
                    type_name::<T>()
                ),
                None => panic!(
                    "free link points out of bounds at {position} in pool of {}",
                    type_name::<T>()
                ),
            }
        }

        let expected_free = CAPACITY
            .checked_sub(self.count)
            .expect("count never exceeds capacity");

        assert!(
            chain_length == expected_free,
            "free list length {chain_length} does not match the expected {expected_free} in pool of {}",
            type_name::<T>()
        );

        match (last_visited, self.last_free) {
            (Some(tail), FreeLink::At(recorded)) => assert!(
                tail == recorded,
                "free list ends at {tail} but the recorded tail is {recorded} in pool of {}",
                type_name::<T>()
            ),
            (None, FreeLink::Empty) => {}
            _ => panic!(
                "free list head and tail disagree about emptiness in pool of {}",
                type_name::<T>()
            ),
        }
    }
}

impl<T, const CAPACITY: usize> Default for SlotPool<T, CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-progress allocation obtained from
/// [`begin_allocate()`][SlotPool::begin_allocate].
///
/// The reservation pins down which position the allocation will use without
/// taking the slot off the free list yet. Dropping it without calling
/// [`fill()`][Self::fill] is a no-op.
#[derive(Debug)]
pub struct SlotReservation<'p, T, const CAPACITY: usize> {
    pool: &'p mut SlotPool<T, CAPACITY>,

    /// Position the allocation will occupy once filled.
    position: usize,
}

impl<'p, T, const CAPACITY: usize> SlotReservation<'p, T, CAPACITY> {
    /// The position the value will be stored at.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Completes the allocation by storing `value` in the reserved slot,
    /// returning an exclusive reference to the stored value.
    pub fn fill(self, value: T) -> &'p mut T {
        let position = self.position;
        let pool = self.pool;

        let next_free = {
            let entry = pool
                .entries
                .get_mut(position)
                .expect("reservations only refer to in-range positions");

            match mem::replace(entry, Entry::Occupied { value }) {
                Entry::Vacant { next_free } => next_free,
                Entry::Occupied { .. } => panic!(
                    "slot {position} was occupied when a reservation filled it in pool of {}",
                    type_name::<T>()
                ),
            }
        };

        // Pop the head of the free list; when that empties the list, both
        // ends record the fact.
        pool.first_free = match next_free {
            Some(next) => FreeLink::At(next),
            None => FreeLink::Empty,
        };

        if pool.first_free == FreeLink::Empty {
            pool.last_free = FreeLink::Empty;
        }

        pool.count = pool
            .count
            .checked_add(1)
            .expect("count is bounded by CAPACITY");

        #[cfg(debug_assertions)]
        pool.integrity_check();

        match pool
            .entries
            .get_mut(position)
            .expect("reservations only refer to in-range positions")
        {
            Entry::Occupied { value } => value,
            Entry::Vacant { .. } => panic!(
                "slot {position} was vacant right after a reservation filled it in pool of {}",
                type_name::<T>()
            ),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SlotPool<u32, 4>: Send, Sync);

    #[test]
    fn smoke_test() {
        let mut pool = SlotPool::<u32, 3>::new();

        let a = pool.allocate(42).unwrap();
        let b = pool.allocate(43).unwrap();
        let c = pool.allocate(44).unwrap();

        assert_eq!(pool.lookup(a), Some(&42));
        assert_eq!(pool.lookup(b), Some(&43));
        assert_eq!(pool.lookup(c), Some(&44));

        assert_eq!(pool.len(), 3);
        assert!(pool.is_full());

        assert_eq!(pool.release(b), Some(43));
        assert_eq!(pool.len(), 2);

        let d = pool.allocate(45).unwrap();
        assert_eq!(d, b);
        assert_eq!(pool.lookup(d), Some(&45));
    }

    #[test]
    fn fresh_pool_allocates_immediately() {
        // The free list is built lazily; publishing the head and tail is
        // part of that build, otherwise no allocation could ever succeed.
        let mut pool = SlotPool::<u32, 4>::new();

        let position = pool.allocate(42).expect("fresh pool has free slots");

        assert_eq!(position, 0);
        assert_eq!(pool.lookup(position), Some(&42));
    }

    #[test]
    fn lookup_on_untouched_pool_is_not_found() {
        let pool = SlotPool::<u32, 4>::new();

        assert_eq!(pool.lookup(0), None);
        assert_eq!(pool.lookup(3), None);
        assert_eq!(pool.lookup(17), None);
    }

    #[test]
    fn allocates_every_slot_before_exhaustion() {
        let mut pool = SlotPool::<u32, 4>::new();

        let positions = [
            pool.allocate(10).unwrap(),
            pool.allocate(11).unwrap(),
            pool.allocate(12).unwrap(),
            pool.allocate(13).unwrap(),
        ];

        let unique = positions.iter().copied().collect::<BTreeSet<_>>();
        assert_eq!(unique.len(), 4);
        assert!(positions.iter().all(|&position| position < 4));

        let error = pool.allocate(14).expect_err("pool is full");
        assert_eq!(error.capacity(), 4);
    }

    #[test]
    fn releasing_one_slot_makes_exactly_that_slot_available() {
        let mut pool = SlotPool::<u32, 4>::new();

        for value in 0..4 {
            pool.allocate(value).unwrap();
        }
        assert!(pool.allocate(99).is_err());

        assert_eq!(pool.release(1), Some(1));
        assert_eq!(pool.lookup(1), None);
        assert_eq!(pool.lookup(0), Some(&0));
        assert_eq!(pool.lookup(2), Some(&2));
        assert_eq!(pool.lookup(3), Some(&3));

        let position = pool.allocate(77).unwrap();
        assert_eq!(position, 1);
        assert_eq!(pool.lookup(1), Some(&77));
    }

    #[test]
    fn releasing_everything_restores_full_capacity() {
        let mut pool = SlotPool::<u32, 4>::new();

        let positions = (0..4)
            .map(|value| pool.allocate(value).unwrap())
            .collect::<Vec<_>>();

        for position in positions {
            assert!(pool.release(position).is_some());
        }

        assert!(pool.is_empty());

        for value in 10..14 {
            pool.allocate(value).unwrap();
        }
        assert!(pool.is_full());
        assert!(pool.allocate(99).is_err());
    }

    #[test]
    fn released_slot_reports_not_found_until_reallocated() {
        let mut pool = SlotPool::<&str, 2>::new();

        let position = pool.allocate("alpha").unwrap();
        assert_eq!(pool.release(position), Some("alpha"));

        assert_eq!(pool.lookup(position), None);

        let reused = pool.allocate("beta").unwrap();
        assert_eq!(reused, position);
        assert_eq!(pool.lookup(position), Some(&"beta"));
    }

    #[test]
    fn releases_are_reused_most_recent_first() {
        let mut pool = SlotPool::<u32, 3>::new();

        let a = pool.allocate(1).unwrap();
        let b = pool.allocate(2).unwrap();
        pool.allocate(3).unwrap();

        pool.release(a);
        pool.release(b);

        // The free list is a stack: the most recently released slot comes
        // back first.
        assert_eq!(pool.allocate(4).unwrap(), b);
        assert_eq!(pool.allocate(5).unwrap(), a);
    }

    #[test]
    fn double_release_is_rejected() {
        let mut pool = SlotPool::<u32, 2>::new();

        let position = pool.allocate(5).unwrap();
        assert_eq!(pool.release(position), Some(5));

        assert_eq!(pool.release(position), None);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.free_slots(), 2);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let mut pool = SlotPool::<u32, 2>::new();
        pool.allocate(1).unwrap();

        assert_eq!(pool.lookup(17), None);
        assert_eq!(pool.release(17), None);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn abandoned_reservation_is_noop() {
        let mut pool = SlotPool::<u32, 3>::new();

        let reservation = pool.begin_allocate().unwrap();
        assert_eq!(reservation.position(), 0);
        drop(reservation);

        assert_eq!(pool.len(), 0);
        assert_eq!(pool.free_slots(), 3);

        let reservation = pool.begin_allocate().unwrap();
        assert_eq!(reservation.position(), 0);
        reservation.fill(20);

        assert_eq!(pool.lookup(0), Some(&20));
    }

    #[test]
    fn fill_returns_reference_to_stored_value() {
        let mut pool = SlotPool::<String, 2>::new();

        let reservation = pool.begin_allocate().unwrap();
        let value = reservation.fill("grow".to_string());
        value.push_str("ing");

        assert_eq!(pool.lookup(0), Some(&"growing".to_string()));
    }

    #[test]
    fn lookup_mut_allows_in_place_updates() {
        let mut pool = SlotPool::<String, 2>::new();

        let position = pool.allocate("count: ".to_string()).unwrap();

        pool.lookup_mut(position)
            .expect("slot was allocated")
            .push_str("went up");

        assert_eq!(pool.lookup(position), Some(&"count: went up".to_string()));
    }

    #[test]
    fn accounting_reflects_allocations() {
        let mut pool = SlotPool::<u32, 3>::new();

        assert_eq!(pool.capacity(), 3);
        assert!(pool.is_empty());
        assert!(!pool.is_full());
        assert_eq!(pool.free_slots(), 3);

        pool.allocate(1).unwrap();
        pool.allocate(2).unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.free_slots(), 1);

        pool.allocate(3).unwrap();
        assert!(pool.is_full());
        assert_eq!(pool.free_slots(), 0);
    }

    #[test]
    fn release_returns_ownership() {
        struct Droppable {
            dropped: Rc<Cell<bool>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let mut pool = SlotPool::<Droppable, 2>::new();

        let position = pool
            .allocate(Droppable {
                dropped: Rc::clone(&dropped),
            })
            .unwrap();

        let value = pool.release(position).expect("slot was allocated");
        assert!(!dropped.get());

        drop(value);
        assert!(dropped.get());
    }

    #[test]
    fn values_drop_with_the_pool() {
        struct Droppable {
            dropped: Rc<Cell<bool>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));

        {
            let mut pool = SlotPool::<Droppable, 2>::new();
            pool.allocate(Droppable {
                dropped: Rc::clone(&first),
            })
            .unwrap();
            pool.allocate(Droppable {
                dropped: Rc::clone(&second),
            })
            .unwrap();
        }

        assert!(first.get());
        assert!(second.get());
    }

    #[test]
    fn multithreaded_via_mutex() {
        let pool = Arc::new(Mutex::new(SlotPool::<u32, 3>::new()));

        let a;
        let b;

        {
            let mut pool = pool.lock().unwrap();
            a = pool.allocate(42).unwrap();
            b = pool.allocate(43).unwrap();
        }

        let pool_clone = Arc::clone(&pool);
        thread::spawn(move || {
            let mut pool = pool_clone.lock().unwrap();

            pool.release(b);

            let c = pool.allocate(44).unwrap();
            assert_eq!(pool.lookup(a), Some(&42));
            assert_eq!(pool.lookup(c), Some(&44));
        })
        .join()
        .unwrap();

        let pool = pool.lock().unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn const_constructed_static_pool_works() {
        static POOL: Mutex<SlotPool<u32, 2>> = Mutex::new(SlotPool::new());

        let mut pool = POOL.lock().unwrap();
        let position = pool.allocate(5).unwrap();
        assert_eq!(pool.lookup(position), Some(&5));
        pool.release(position);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_is_panic() {
        drop(SlotPool::<u32, 0>::new());
    }
}
