//! Per-thread front end state.
//!
//! The front end feeds the fetch stage and holds its output. It tracks:
//! 1. **Trace:** Decoded uops of the correct path still waiting to be fetched.
//! 2. **Fetch Queue:** Fetched uops, oldest first, waiting for dispatch.
//! 3. **Wrong Path:** After a misprediction the front end fetches synthesized uops
//!    from the predicted address until recovery.
//! 4. **Stall:** Fetch is blocked until a cycle set by recovery.

use std::collections::VecDeque;

use crate::common::constants::WRONG_PATH_UOP_SIZE;
use crate::common::Cycle;
use crate::core::units::bru::PredictionSnapshot;
use crate::core::uop::{DecodedUop, UopId, UopKind, UopPool};

/// Speculative fetch state entered on a misprediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrongPath {
    /// The mispredicted control uop.
    pub branch: UopId,
    /// Address of the next wrong-path uop.
    pub next_eip: u64,
    /// Predictor state recorded by the mispredicted uop.
    pub snapshot: PredictionSnapshot,
}

/// Front end of one hardware thread.
#[derive(Clone, Debug)]
pub struct Frontend {
    trace: VecDeque<DecodedUop>,
    queue: VecDeque<UopId>,
    capacity: usize,
    wrong_path: Option<WrongPath>,
    stall_until: Cycle,
}

impl Frontend {
    /// Creates an empty front end with a fetch queue of `capacity` uops.
    pub const fn new(capacity: usize) -> Self {
        Self {
            trace: VecDeque::new(),
            queue: VecDeque::new(),
            capacity,
            wrong_path: None,
            stall_until: 0,
        }
    }

    /// Appends decoded uops to the correct-path trace.
    pub fn load(&mut self, trace: impl IntoIterator<Item = DecodedUop>) {
        self.trace.extend(trace);
    }

    /// Decoded uops not fetched yet.
    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    /// Returns the next uop to fetch, if fetch is not blocked.
    ///
    /// On the wrong path this synthesizes a no-op at the predicted address and
    /// marks it speculative; otherwise it takes the next trace record.
    pub fn next_decoded(&mut self) -> Option<(DecodedUop, bool)> {
        if let Some(path) = &mut self.wrong_path {
            let uop = DecodedUop::new(UopKind::Nop, path.next_eip, WRONG_PATH_UOP_SIZE);
            path.next_eip = uop.neip;
            return Some((uop, true));
        }
        self.trace.pop_front().map(|uop| (uop, false))
    }

    /// Uops in the fetch queue.
    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if the fetch queue cannot take another uop.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    /// Oldest uop in the fetch queue.
    pub fn head(&self) -> Option<UopId> {
        self.queue.front().copied()
    }

    /// Appends a fetched uop.
    pub fn push(&mut self, id: UopId) {
        self.queue.push_back(id);
    }

    /// Removes the oldest uop.
    pub fn pop(&mut self) -> Option<UopId> {
        self.queue.pop_front()
    }

    /// Iterates over the fetch queue, oldest first.
    pub fn queue(&self) -> impl Iterator<Item = UopId> + '_ {
        self.queue.iter().copied()
    }

    /// Returns true while fetching down a mispredicted path.
    #[inline]
    pub const fn in_specmode(&self) -> bool {
        self.wrong_path.is_some()
    }

    /// Current wrong-path state.
    pub const fn wrong_path(&self) -> Option<&WrongPath> {
        self.wrong_path.as_ref()
    }

    /// Starts fetching the wrong path at `pred_neip` after `branch` mispredicted.
    pub const fn enter_specmode(&mut self, branch: UopId, pred_neip: u64, snapshot: PredictionSnapshot) {
        self.wrong_path = Some(WrongPath {
            branch,
            next_eip: pred_neip,
            snapshot,
        });
    }

    /// Leaves the wrong path, returning its state.
    pub const fn leave_specmode(&mut self) -> Option<WrongPath> {
        self.wrong_path.take()
    }

    /// Blocks fetch until cycle `until`; an earlier block stays if it ends later.
    pub fn stall(&mut self, until: Cycle) {
        self.stall_until = self.stall_until.max(until);
    }

    /// Returns true if fetch is blocked at `now`.
    #[inline]
    pub const fn is_stalled(&self, now: Cycle) -> bool {
        now < self.stall_until
    }

    /// Removes speculative uops from the fetch queue and returns them oldest first.
    pub fn recover(&mut self, uops: &UopPool) -> Vec<UopId> {
        let (squashed, kept): (Vec<UopId>, Vec<UopId>) =
            self.queue.iter().copied().partition(|id| uops[*id].specmode);
        self.queue = kept.into();
        squashed
    }

    /// Returns true when the trace and fetch queue are empty and fetch is on
    /// the correct path.
    pub fn is_drained(&self) -> bool {
        self.trace.is_empty() && self.queue.is_empty() && self.wrong_path.is_none()
    }
}
