//! SlotArray: the open-addressed index with tri-state slots.
//!
//! Each slot is empty, a tombstone, or holds the `slotmap` key of a live
//! entry. Probing is linear from `hash & (capacity - 1)` and wraps around.
//! A probe for a key stops at the first empty slot, so deletions leave a
//! tombstone to keep chains through that slot intact. Rebuilding into a
//! fresh array is the only way tombstones disappear.
//!
//! The array never looks at keys itself: callers pass an `eq` closure for
//! matching and a `hash_of` closure for rebuilding.

use slotmap::DefaultKey;
use std::collections::TryReserveError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Slot {
    Empty,
    Tombstone,
    Occupied(DefaultKey),
}

#[derive(Debug)]
pub(crate) struct SlotArray {
    slots: Vec<Slot>,
    tombstones: usize,
}

impl SlotArray {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            slots: vec![Slot::Empty; capacity],
            tombstones: 0,
        }
    }

    pub(crate) fn try_new(capacity: usize) -> Result<Self, TryReserveError> {
        debug_assert!(capacity.is_power_of_two());
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize(capacity, Slot::Empty);
        Ok(Self {
            slots,
            tombstones: 0,
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    pub(crate) fn is_tombstone(&self, index: usize) -> bool {
        self.slots[index] == Slot::Tombstone
    }

    /// Every slot index exactly once, starting at the home slot of `hash`.
    fn probe(&self, hash: u64) -> impl Iterator<Item = usize> {
        let mask = self.slots.len() - 1;
        let home = (hash as usize) & mask;
        (0..self.slots.len()).map(move |step| (home + step) & mask)
    }

    /// Slot index and key of the occupied slot whose key satisfies `eq`.
    pub(crate) fn find<F>(&self, hash: u64, mut eq: F) -> Option<(usize, DefaultKey)>
    where
        F: FnMut(DefaultKey) -> bool,
    {
        for i in self.probe(hash) {
            match self.slots[i] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(k) => {
                    if eq(k) {
                        return Some((i, k));
                    }
                }
            }
        }
        None
    }

    /// `Ok` with the matching slot and its key, or `Err(index)` of the first
    /// empty or tombstone slot on the probe sequence.
    ///
    /// Requires at least one non-occupied slot.
    pub(crate) fn find_or_find_insert_slot<F>(
        &self,
        hash: u64,
        mut eq: F,
    ) -> Result<(usize, DefaultKey), usize>
    where
        F: FnMut(DefaultKey) -> bool,
    {
        let mut reusable = None;
        for i in self.probe(hash) {
            match self.slots[i] {
                Slot::Empty => return Err(reusable.unwrap_or(i)),
                Slot::Tombstone => {
                    reusable.get_or_insert(i);
                }
                Slot::Occupied(k) => {
                    if eq(k) {
                        return Ok((i, k));
                    }
                }
            }
        }
        Err(reusable.expect("slot array has no free slot"))
    }

    /// First empty or tombstone slot on the probe sequence of `hash`.
    pub(crate) fn find_insert_slot(&self, hash: u64) -> usize {
        self.probe(hash)
            .find(|&i| !matches!(self.slots[i], Slot::Occupied(_)))
            .expect("slot array has no free slot")
    }

    pub(crate) fn insert_in_slot(&mut self, index: usize, k: DefaultKey) {
        match self.slots[index] {
            Slot::Empty => {}
            Slot::Tombstone => self.tombstones -= 1,
            Slot::Occupied(_) => panic!("insert into occupied slot {index}"),
        }
        self.slots[index] = Slot::Occupied(k);
    }

    /// Turn an occupied slot into a tombstone, returning the key it held.
    pub(crate) fn remove(&mut self, index: usize) -> Option<DefaultKey> {
        match self.slots[index] {
            Slot::Occupied(k) => {
                self.slots[index] = Slot::Tombstone;
                self.tombstones += 1;
                Some(k)
            }
            Slot::Empty | Slot::Tombstone => None,
        }
    }

    /// Live keys in ascending slot order.
    pub(crate) fn occupied(&self) -> Occupied<'_> {
        Occupied {
            it: self.slots.iter(),
        }
    }

    /// A new array of `capacity` slots holding the same keys, placed by
    /// `hash_of`, with no tombstones.
    pub(crate) fn rebuild<H>(&self, capacity: usize, mut hash_of: H) -> SlotArray
    where
        H: FnMut(DefaultKey) -> u64,
    {
        let mut fresh = SlotArray::new(capacity);
        for k in self.occupied() {
            let i = fresh.find_insert_slot(hash_of(k));
            fresh.slots[i] = Slot::Occupied(k);
        }
        fresh
    }
}

/// Iterator over live keys in slot order.
pub(crate) struct Occupied<'a> {
    it: core::slice::Iter<'a, Slot>,
}

impl<'a> Iterator for Occupied<'a> {
    type Item = DefaultKey;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.find_map(|s| match *s {
            Slot::Occupied(k) => Some(k),
            Slot::Empty | Slot::Tombstone => None,
        })
    }
}
