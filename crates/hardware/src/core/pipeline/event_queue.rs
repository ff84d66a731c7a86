//! In-flight execution events.
//!
//! Uops that issued to a functional unit, and loads whose data returned from
//! memory, wait here until the cycle their result is available. Events are
//! extracted in `(when, id)` order, so completion order is deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::common::Cycle;
use crate::core::uop::UopId;

/// Min-heap of `(completion cycle, uop)` pairs for one core.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<(Cycle, UopId)>>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `id` to complete at `when`.
    pub fn push(&mut self, when: Cycle, id: UopId) {
        self.heap.push(Reverse((when, id)));
    }

    /// Removes and returns the earliest event due at or before `now`.
    pub fn pop_ready(&mut self, now: Cycle) -> Option<UopId> {
        match self.heap.peek() {
            Some(Reverse((when, _))) if *when <= now => self.heap.pop().map(|Reverse((_, id))| id),
            _ => None,
        }
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Removes every event whose uop matches `squash` and returns those uops.
    pub fn remove_if(&mut self, mut squash: impl FnMut(UopId) -> bool) -> Vec<UopId> {
        let mut removed = Vec::new();
        self.heap.retain(|Reverse((_, id))| {
            if squash(*id) {
                removed.push(*id);
                false
            } else {
                true
            }
        });
        removed.sort_unstable();
        removed
    }
}
