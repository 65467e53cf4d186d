//! Capacity rounding and the load-factor policy.
//!
//! Capacities are always powers of two so that the home slot of a hash is
//! `hash & (capacity - 1)`. The table keeps its load factor inside
//! `(MIN_LOAD_PERCENT, MAX_LOAD_PERCENT]` except at the `MIN_CAPACITY` floor.

/// Smallest slot array the table will ever use.
pub const MIN_CAPACITY: usize = 4;

/// Inserting past this load factor (in percent) doubles the capacity.
pub const MAX_LOAD_PERCENT: usize = 80;

/// Deleting down to this load factor (in percent) halves the capacity.
pub const MIN_LOAD_PERCENT: usize = 20;

/// Smallest power of two `>= n`, with `next_pow2(0) == 1`.
///
/// Panics with "capacity overflow" if the result does not fit in `usize`.
pub fn next_pow2(n: usize) -> usize {
    checked_next_pow2(n).expect("capacity overflow")
}

/// Like [`next_pow2`], returning `None` instead of panicking on overflow.
#[inline]
pub fn checked_next_pow2(n: usize) -> Option<usize> {
    n.checked_next_power_of_two()
}

/// Slot count used for a requested capacity: rounded up, never below the floor.
pub(crate) fn normalize(requested: usize) -> Option<usize> {
    checked_next_pow2(requested).map(|p| p.max(MIN_CAPACITY))
}

/// True when `used` occupied slots out of `capacity` exceed the max load.
#[inline]
pub(crate) fn exceeds_max_load(used: usize, capacity: usize) -> bool {
    // u128 so `used * 100` cannot overflow for any usize capacity.
    (used as u128) * 100 > (capacity as u128) * MAX_LOAD_PERCENT as u128
}

/// True when a table of `capacity` holding `len` items should shrink.
#[inline]
pub(crate) fn should_shrink(len: usize, capacity: usize) -> bool {
    capacity > MIN_CAPACITY && (len as u128) * 100 <= (capacity as u128) * MIN_LOAD_PERCENT as u128
}
