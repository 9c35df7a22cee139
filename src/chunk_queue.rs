//! Write chunk queue: a bounded, ordered set of dirty indices awaiting flush.
//!
//! The spec describes this as a bitset over `[0, length)` plus a count and
//! a "lowest set bit" pointer. For an array whose length can run into the
//! billions but whose queue capacity `C_w` is always small (a handful to a
//! few thousand entries), a `BTreeSet` gives the same ordered-iteration and
//! "first/min" semantics in O(log n) without allocating a bit per index —
//! the faithful-but-wasteful bitset is not worth it here.

use std::collections::BTreeSet;

/// Bounded ordered set of dirty record indices.
#[derive(Debug, Default)]
pub struct WriteChunkQueue {
    capacity: usize,
    indices: BTreeSet<i64>,
}

impl WriteChunkQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            indices: BTreeSet::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity without touching currently-queued indices.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: i64) -> bool {
        self.indices.contains(&index)
    }

    pub fn first(&self) -> Option<i64> {
        self.indices.iter().next().copied()
    }

    /// Insert `index` if absent. Returns `true` once the queue has reached
    /// capacity (a signal to the caller to flush now).
    pub fn add(&mut self, index: i64) -> bool {
        self.indices.insert(index);
        self.indices.len() >= self.capacity
    }

    pub fn remove(&mut self, index: i64) {
        self.indices.remove(&index);
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Ascending iteration over currently-queued indices.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.indices.iter().copied()
    }
}
