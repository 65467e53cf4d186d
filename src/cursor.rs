//! Resettable forward cursor over a slot-order snapshot.

use crate::counter_table::{CounterTable, Handle, Item};

/// Cursor over the items of a table, in the slot order captured when the
/// cursor was created.
///
/// The cursor borrows the table, so the table cannot be mutated while the
/// cursor is alive. `reset` replays exactly the same sequence.
pub struct Cursor<'a, S> {
    table: &'a CounterTable<S>,
    order: Vec<Handle>,
    pos: usize,
}

impl<'a, S> Cursor<'a, S> {
    pub(crate) fn new(table: &'a CounterTable<S>, order: Vec<Handle>) -> Self {
        Self {
            table,
            order,
            pos: 0,
        }
    }

    /// Item under the cursor, or `None` once past the end.
    pub fn current(&self) -> Option<Item<'a>> {
        let h = self.order.get(self.pos)?;
        h.item(self.table)
    }

    /// Move to the next item. Stays at the end once there.
    pub fn advance(&mut self) {
        if self.pos < self.order.len() {
            self.pos += 1;
        }
    }

    /// Back to the first item of the snapshot.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Number of items in the snapshot.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
