//! counter-table: a single-threaded, open-addressed table from string keys
//! to `i64` counters, with tombstone deletion, automatic grow/shrink, and
//! slot-order snapshots.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small counting table whose layout is deterministic: the
//!   position of every key is a fixed function of its FNV-1a hash, the
//!   capacity, and the insert/delete history.
//! - Layers:
//!   - `capacity`: power-of-two rounding and the load-factor policy.
//!   - `fnv`: default 64-bit FNV-1a `BuildHasher` over the raw key bytes.
//!   - `SlotArray`: tri-state slots (empty / tombstone / occupied) with
//!     linear probing; knows nothing about keys beyond an `eq` callback.
//!   - `CounterTable<S>`: owns the hasher, the `SlotArray` index and a
//!     `SlotMap` of entries; exposes insert/get/delete/inc/dec, the flat
//!     view and the `Cursor`.
//!
//! Constraints
//! - Single-threaded, synchronous; all mutation goes through `&mut self`.
//! - Capacity is a power of two, never below 4.
//! - Load factor stays at or below 80 %: inserting a new key that would
//!   exceed it doubles the capacity first.
//! - Deleting down to 20 % or less halves the capacity (floor 4).
//! - At least one slot is always empty, so every probe terminates; when
//!   tombstones eat into that margin the index is rebuilt at the same
//!   capacity.
//! - Keys are unique; inserting a live key overwrites its value in place.
//!
//! Handles and views
//! - Every item has a generational `Handle` (a `slotmap` key). Handles are
//!   unaffected by resizes because only the index is rebuilt; entries never
//!   move. A handle resolves to `None` once its key is deleted, even if the
//!   storage is reused.
//! - `Item<'a>` is a borrowed (handle, key, value) view used by `get`, the
//!   flat view, `iter` and the cursor.
//! - `Cursor` snapshots the slot order at creation and borrows the table,
//!   so the table cannot change underneath it.
//!
//! Hashing and rehashing
//! - Each entry stores its `u64` hash; resizing re-places entries from the
//!   stored hash and never calls the hasher.
//!
//! Notes and non-goals
//! - Keys are `&str` and values `i64`; no generic key/value types.
//! - Arithmetic through `add`/`inc`/`dec` wraps on overflow.
//! - No persistence, concurrency or I/O.

pub mod capacity;
mod counter_table;
mod counter_table_proptest;
mod cursor;
pub mod fnv;
mod slots;

// Public surface
pub use capacity::next_pow2;
pub use counter_table::{CapacityError, CounterTable, Handle, Item, Iter};
pub use cursor::Cursor;
pub use fnv::FnvBuildHasher;
