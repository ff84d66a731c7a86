//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a per-thread circular buffer of uop ids in program order. It provides:
//! 1. **Allocation:** Dispatch appends at the tail after checking `can_enqueue`.
//! 2. **In-order Commit:** Commit inspects and removes only the head.
//! 3. **Squash:** Recovery removes speculative entries from the tail.
//!
//! The buffer holds ids; the uops themselves live in the core's arena.

use crate::core::uop::UopId;

/// Reorder Buffer, a circular buffer of uop ids.
#[derive(Clone, Debug)]
pub struct Rob {
    /// Fixed-size slot array.
    entries: Vec<Option<UopId>>,
    /// Index of the oldest entry (commit point).
    head: usize,
    /// Index where the next entry will be written.
    tail: usize,
    /// Number of occupied slots.
    count: usize,
}

impl Rob {
    /// Creates an empty ROB with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the ROB capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the ROB is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the ROB is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Returns true if one more uop fits.
    #[inline]
    pub fn can_enqueue(&self) -> bool {
        !self.is_full()
    }

    /// Appends a uop at the tail.
    ///
    /// # Panics
    ///
    /// Panics if the ROB is full; dispatch must check [`can_enqueue`](Self::can_enqueue).
    pub fn enqueue(&mut self, id: UopId) {
        assert!(self.can_enqueue(), "ROB enqueue of {id} into a full buffer");
        self.entries[self.tail] = Some(id);
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
    }

    /// Returns the oldest entry without removing it.
    pub fn head(&self) -> Option<UopId> {
        if self.count == 0 {
            None
        } else {
            self.entries[self.head]
        }
    }

    /// Removes the oldest entry.
    ///
    /// # Panics
    ///
    /// Panics if the ROB is empty.
    pub fn remove_head(&mut self) -> UopId {
        assert!(self.count > 0, "ROB remove_head on an empty buffer");
        let Some(id) = self.entries[self.head].take() else {
            unreachable!("occupied ROB slot without an id");
        };
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        id
    }

    /// Returns the youngest entry without removing it.
    pub fn tail(&self) -> Option<UopId> {
        if self.count == 0 {
            None
        } else {
            self.entries[self.last_index()]
        }
    }

    /// Removes the youngest entry. Only misprediction recovery does this.
    ///
    /// # Panics
    ///
    /// Panics if the ROB is empty.
    pub fn remove_tail(&mut self) -> UopId {
        assert!(self.count > 0, "ROB remove_tail on an empty buffer");
        self.tail = self.last_index();
        let Some(id) = self.entries[self.tail].take() else {
            unreachable!("occupied ROB slot without an id");
        };
        self.count -= 1;
        id
    }

    /// Returns the `i`-th oldest entry.
    pub fn get(&self, i: usize) -> Option<UopId> {
        if i >= self.count {
            return None;
        }
        self.entries[(self.head + i) % self.entries.len()]
    }

    /// Iterates over entries from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = UopId> + '_ {
        (0..self.count).filter_map(|i| self.get(i))
    }

    fn last_index(&self) -> usize {
        (self.tail + self.entries.len() - 1) % self.entries.len()
    }
}
