//! Issue, load and store queues.
//!
//! The three queues share one shape: an unordered pool of uop ids waiting for
//! operands, a functional unit or the memory system, iterated oldest first. Each
//! thread owns its queues; whether their capacity is private to the thread or
//! pooled across the core is decided by a [`QueueLimit`].

use std::collections::BTreeSet;

use crate::config::QueueKind;
use crate::core::uop::{UopId, UopPool};

/// Capacity rule of a per-thread structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueLimit {
    kind: QueueKind,
    size: usize,
    threads: usize,
}

impl QueueLimit {
    /// Creates a rule for `size` entries per thread on a core with `threads` threads.
    pub const fn new(kind: QueueKind, size: usize, threads: usize) -> Self {
        Self {
            kind,
            size,
            threads,
        }
    }

    /// Entries a single thread's structure must be able to hold.
    pub const fn per_thread_capacity(&self) -> usize {
        match self.kind {
            QueueKind::Private => self.size,
            QueueKind::Shared => self.size * self.threads,
        }
    }

    /// Returns true if one more entry fits.
    ///
    /// `thread_len` is the occupancy of the requesting thread's structure and
    /// `core_len` the occupancy summed over every thread of the core.
    pub const fn has_room(&self, thread_len: usize, core_len: usize) -> bool {
        match self.kind {
            QueueKind::Private => thread_len < self.size,
            QueueKind::Shared => core_len < self.size * self.threads,
        }
    }
}

/// Unordered uop pool iterated oldest first.
#[derive(Clone, Debug)]
pub struct UopQueue {
    name: &'static str,
    entries: BTreeSet<UopId>,
    capacity: usize,
}

/// Issue queue.
pub type IssueQueue = UopQueue;
/// Load queue.
pub type LoadQueue = UopQueue;
/// Store queue.
pub type StoreQueue = UopQueue;

impl UopQueue {
    /// Creates an empty queue named `name` for diagnostics.
    pub const fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            entries: BTreeSet::new(),
            capacity,
        }
    }

    /// Number of uops held.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the queue holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Physical capacity of this thread's queue.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the queue holds `id`.
    pub fn contains(&self, id: UopId) -> bool {
        self.entries.contains(&id)
    }

    /// Adds a uop.
    ///
    /// # Panics
    ///
    /// Panics if the queue is full or already holds `id`.
    pub fn insert(&mut self, id: UopId) {
        assert!(
            self.entries.len() < self.capacity,
            "{} insert of {id} into a full queue",
            self.name
        );
        let fresh = self.entries.insert(id);
        assert!(fresh, "{} already holds {id}", self.name);
    }

    /// Removes a uop, returning true if it was present.
    pub fn remove(&mut self, id: UopId) -> bool {
        self.entries.remove(&id)
    }

    /// Iterates over held uops, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = UopId> + '_ {
        self.entries.iter().copied()
    }

    /// Removes every speculative uop and returns them oldest first.
    pub fn recover(&mut self, uops: &UopPool) -> Vec<UopId> {
        let squashed: Vec<UopId> = self
            .entries
            .iter()
            .copied()
            .filter(|&id| uops[id].specmode)
            .collect();
        for id in &squashed {
            let _ = self.entries.remove(id);
        }
        squashed
    }
}
