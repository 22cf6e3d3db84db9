#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A fixed-capacity object pool with an intrusive free list, stable
//! positions and no allocations after construction.
//!
//! The pool owns an array of `CAPACITY` slots. Each slot either holds a live
//! value or participates in a singly-linked list of free slots threaded
//! through the slot storage itself, so allocating and releasing never touch
//! the heap and complete in O(1).
//!
//! This is part of the [`flash_fd` project](https://github.com/folo-rs/flash_fd),
//! which builds descriptor-based storage access for embedded targets on top
//! of this pool.
//!
//! # Features
//!
//! * Capacity is a compile-time constant; construction via
//!   [`SlotPool::new()`] is `const` and performs no work proportional to the
//!   capacity, so pools can live in `static` variables.
//! * Values are identified by their slot position, which remains stable and
//!   unique for the lifetime of the allocation and is reused afterwards.
//! * Exhaustion is a recoverable [`PoolExhausted`] error, not a panic, so
//!   callers can surface "too many open resources" conditions cleanly.
//! * Two-phase allocation via [`SlotPool::begin_allocate()`] reports the
//!   chosen position before the value is stored; abandoning the reservation
//!   leaves the pool untouched.
//!
//! # Example
//!
//! ```
//! use slot_pool::SlotPool;
//!
//! let mut pool = SlotPool::<String, 8>::new();
//!
//! let position = pool.allocate("hello".to_string()).unwrap();
//!
//! assert_eq!(pool.lookup(position).map(String::as_str), Some("hello"));
//!
//! let value = pool.release(position).unwrap();
//! assert_eq!(value, "hello");
//! assert_eq!(pool.lookup(position), None);
//! ```
//!
//! Because construction is `const`, a pool can be a process-wide resource
//! table behind a lock:
//!
//! ```
//! use std::sync::Mutex;
//!
//! use slot_pool::SlotPool;
//!
//! static CONNECTIONS: Mutex<SlotPool<u64, 4>> = Mutex::new(SlotPool::new());
//!
//! let id = CONNECTIONS.lock().unwrap().allocate(0x2A).unwrap();
//! assert_eq!(CONNECTIONS.lock().unwrap().lookup(id), Some(&0x2A));
//! ```

mod error;
mod pool;

pub use error::*;
pub use pool::*;
