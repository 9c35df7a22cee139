//! In-memory window: a ring-shaped `index -> record` cache of fixed
//! capacity `W`. Pure mapping layer — no I/O happens here.
//!
//! Slot for index `i` is `i mod W`. At most one index per residue class can
//! be resident at a time; claiming a slot for a different index is the
//! caller's responsibility to reconcile first (see
//! [`crate::array::PersistentArray::set`] collision handling).

/// Sentinel `owner` value meaning "this slot is empty".
const EMPTY: i64 = -1;

pub struct Window<T> {
    value: Vec<Option<T>>,
    owner: Vec<i64>,
}

impl<T: Clone> Window<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            value: vec![None; capacity],
            owner: vec![EMPTY; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.value.len()
    }

    fn slot(&self, index: i64) -> usize {
        (index.rem_euclid(self.value.len() as i64)) as usize
    }

    /// Is `index` the current resident of its slot?
    pub fn contains(&self, index: i64) -> bool {
        self.owner[self.slot(index)] == index
    }

    /// The index currently occupying `index`'s slot, or `-1` if empty.
    pub fn owner_at(&self, index: i64) -> i64 {
        self.owner[self.slot(index)]
    }

    /// The cached value for `index`, if it is the slot's current resident.
    pub fn get(&self, index: i64) -> Option<&T> {
        if self.contains(index) {
            self.value[self.slot(index)].as_ref()
        } else {
            None
        }
    }

    /// Claim the slot for `index`, overwriting whatever was resident there.
    pub fn associate(&mut self, index: i64, v: Option<T>) {
        let slot = self.slot(index);
        self.value[slot] = v;
        self.owner[slot] = index;
    }

    /// Vacate `index`'s slot unconditionally.
    pub fn evict(&mut self, index: i64) {
        let slot = self.slot(index);
        self.owner[slot] = EMPTY;
        self.value[slot] = None;
    }

    /// Reallocate to a new capacity; every slot starts empty.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        self.value = vec![None; capacity];
        self.owner = vec![EMPTY; capacity];
    }
}
