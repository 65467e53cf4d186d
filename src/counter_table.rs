//! CounterTable: string keys to `i64` values over an open-addressed index.
//!
//! Entries live in a `SlotMap` so that every item has a stable, generational
//! `Handle`; the `SlotArray` index maps probe positions to those handles.
//! Each entry caches its hash, so resizing never calls the hasher again.

use crate::capacity::{self, MIN_CAPACITY};
use crate::cursor::Cursor;
use crate::fnv::FnvBuildHasher;
use crate::slots::{Occupied, SlotArray};
use core::fmt;
use core::hash::{BuildHasher, Hasher};
use slotmap::{DefaultKey, SlotMap};

/// Generational reference to an item.
///
/// Stays valid across resizes and resolves to `None` once its key has been
/// deleted, even if the storage is reused for another key. A handle is only
/// meaningful for the table that returned it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    pub fn key<'a, S>(&self, table: &'a CounterTable<S>) -> Option<&'a str> {
        table.entries.get(self.0).map(|e| &*e.key)
    }

    pub fn value<S>(&self, table: &CounterTable<S>) -> Option<i64> {
        table.entries.get(self.0).map(|e| e.value)
    }

    pub fn value_mut<'a, S>(&self, table: &'a mut CounterTable<S>) -> Option<&'a mut i64> {
        table.entries.get_mut(self.0).map(|e| &mut e.value)
    }

    pub fn item<'a, S>(&self, table: &'a CounterTable<S>) -> Option<Item<'a>> {
        table.item(self.0)
    }
}

/// Borrowed view of one live item.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Item<'a> {
    handle: Handle,
    key: &'a str,
    value: i64,
}

impl<'a> Item<'a> {
    pub fn handle(&self) -> Handle {
        self.handle
    }
    pub fn key(&self) -> &'a str {
        self.key
    }
    pub fn value(&self) -> i64 {
        self.value
    }
}

#[derive(Debug)]
struct Entry {
    key: Box<str>,
    value: i64,
    hash: u64,
}

/// Failure to build a table of the requested capacity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapacityError {
    /// The capacity rounded up to a power of two does not fit in `usize`.
    Overflow,
    /// The slot array could not be allocated.
    AllocFailed,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityError::Overflow => f.write_str("capacity overflow"),
            CapacityError::AllocFailed => f.write_str("slot array allocation failed"),
        }
    }
}

impl std::error::Error for CapacityError {}

pub struct CounterTable<S = FnvBuildHasher> {
    hasher: S,
    index: SlotArray,
    entries: SlotMap<DefaultKey, Entry>,
}

impl CounterTable {
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Table with `max(4, next_pow2(capacity))` slots.
    ///
    /// Panics with "capacity overflow" if the rounded capacity does not fit
    /// in `usize`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FnvBuildHasher)
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, CapacityError> {
        Self::try_with_capacity_and_hasher(capacity, FnvBuildHasher)
    }
}

impl Default for CounterTable {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CounterTable<S> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Number of slots in the index; always a power of two, at least 4.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    #[cfg(test)]
    pub(crate) fn tombstones(&self) -> usize {
        self.index.tombstones()
    }

    fn item(&self, k: DefaultKey) -> Option<Item<'_>> {
        self.entries.get(k).map(|e| Item {
            handle: Handle::new(k),
            key: &e.key,
            value: e.value,
        })
    }

    /// Every live item in ascending slot order.
    ///
    /// The order is a function of the key hashes, the capacity and the
    /// insert/delete history; it changes whenever the table resizes.
    pub fn flat_view(&self) -> Vec<Item<'_>> {
        let mut view = Vec::with_capacity(self.len());
        view.extend(self.iter());
        view
    }

    /// Resettable cursor over a snapshot of the current slot order.
    pub fn cursor(&self) -> Cursor<'_, S> {
        Cursor::new(self, self.index.occupied().map(Handle::new).collect())
    }

    pub fn iter(&self) -> Iter<'_, S> {
        Iter {
            table: self,
            occupied: self.index.occupied(),
            remaining: self.len(),
        }
    }

    /// Remove every item and return to the minimum capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = SlotArray::new(MIN_CAPACITY);
    }

    fn rebuild(&mut self, capacity: usize) {
        let entries = &self.entries;
        self.index = self
            .index
            .rebuild(capacity, |k| entries.get(k).map(|e| e.hash).unwrap_or(0));
    }

    /// Load-factor invariants; checked after every mutation in debug builds.
    #[inline]
    fn debug_check(&self) {
        let cap = self.capacity();
        debug_assert!(cap.is_power_of_two() && cap >= MIN_CAPACITY);
        debug_assert!(!capacity::exceeds_max_load(self.len(), cap));
        // At least one empty slot, so every probe terminates.
        debug_assert!(self.len() + self.index.tombstones() < cap);
    }
}

impl<S> CounterTable<S>
where
    S: BuildHasher,
{
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = capacity::normalize(capacity).expect("capacity overflow");
        Self {
            hasher,
            index: SlotArray::new(capacity),
            entries: SlotMap::with_key(),
        }
    }

    pub fn try_with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self, CapacityError> {
        let capacity = capacity::normalize(capacity).ok_or(CapacityError::Overflow)?;
        let index = SlotArray::try_new(capacity).map_err(|_| CapacityError::AllocFailed)?;
        Ok(Self {
            hasher,
            index,
            entries: SlotMap::with_key(),
        })
    }

    fn make_hash(&self, key: &str) -> u64 {
        let mut h = self.hasher.build_hasher();
        h.write(key.as_bytes());
        h.finish()
    }

    /// Slot index and entry key for `key`, if live.
    fn lookup(&self, hash: u64, key: &str) -> Option<(usize, DefaultKey)> {
        let entries = &self.entries;
        self.index.find(hash, |k| {
            entries
                .get(k)
                .map(|e| e.hash == hash && &*e.key == key)
                .unwrap_or(false)
        })
    }

    pub fn find(&self, key: &str) -> Option<Handle> {
        self.lookup(self.make_hash(key), key).map(|(_, k)| Handle::new(k))
    }

    pub fn get(&self, key: &str) -> Option<Item<'_>> {
        self.find(key).and_then(|h| self.item(h.raw_handle()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(self.make_hash(key), key).is_some()
    }

    /// Set `key` to `value`, overwriting and keeping the handle of a live key.
    pub fn insert(&mut self, key: &str, value: i64) -> Handle {
        let hash = self.make_hash(key);
        let entries = &self.entries;
        let found = self.index.find_or_find_insert_slot(hash, |k| {
            entries
                .get(k)
                .map(|e| e.hash == hash && &*e.key == key)
                .unwrap_or(false)
        });
        let handle = match found {
            Ok((_, k)) => {
                if let Some(e) = self.entries.get_mut(k) {
                    e.value = value;
                }
                Handle::new(k)
            }
            Err(mut slot) => {
                if self.reserve_one(slot) {
                    slot = self.index.find_insert_slot(hash);
                }
                let k = self.entries.insert(Entry {
                    key: key.into(),
                    value,
                    hash,
                });
                self.index.insert_in_slot(slot, k);
                Handle::new(k)
            }
        };
        self.debug_check();
        handle
    }

    /// Make room for one new item about to land in `slot`. Returns true if
    /// the index was rebuilt, which invalidates `slot`.
    fn reserve_one(&mut self, slot: usize) -> bool {
        let cap = self.capacity();
        if capacity::exceeds_max_load(self.len() + 1, cap) {
            let grown = cap.checked_mul(2).expect("capacity overflow");
            self.rebuild(grown);
            true
        } else if !self.index.is_tombstone(slot)
            && capacity::exceeds_max_load(self.len() + self.index.tombstones() + 1, cap)
        {
            // Too few empty slots left: purge tombstones in place.
            self.rebuild(cap);
            true
        } else {
            false
        }
    }

    /// Remove `key`, returning its value. Absent keys are a no-op.
    pub fn delete(&mut self, key: &str) -> Option<i64> {
        let (slot, _) = self.lookup(self.make_hash(key), key)?;
        let k = self.index.remove(slot)?;
        let entry = self.entries.remove(k)?;

        let cap = self.capacity();
        if capacity::should_shrink(self.len(), cap) {
            self.rebuild(cap / 2);
        }
        self.debug_check();
        Some(entry.value)
    }

    /// Add `delta` to the value of `key`, starting from 0 if absent.
    /// Wraps on overflow.
    pub fn add(&mut self, key: &str, delta: i64) -> Handle {
        let handle = match self.find(key) {
            Some(h) => h,
            None => self.insert(key, 0),
        };
        if let Some(v) = handle.value_mut(self) {
            *v = v.wrapping_add(delta);
        }
        handle
    }

    pub fn inc(&mut self, key: &str) -> Handle {
        self.add(key, 1)
    }

    pub fn dec(&mut self, key: &str) -> Handle {
        self.add(key, -1)
    }
}

impl<S> fmt::Debug for CounterTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|it| (it.key(), it.value())))
            .finish()
    }
}

/// Items in slot order.
pub struct Iter<'a, S> {
    table: &'a CounterTable<S>,
    occupied: Occupied<'a>,
    remaining: usize,
}

impl<'a, S> Iterator for Iter<'a, S> {
    type Item = Item<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.occupied.next()?;
        self.remaining -= 1;
        self.table.item(k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, S> ExactSizeIterator for Iter<'a, S> {}

impl<'a, S> IntoIterator for &'a CounterTable<S> {
    type Item = Item<'a>;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
