//! Dispatch Stage: move uops from the fetch queue into the back end.
//!
//! A dispatched uop is renamed, appended to the thread's ROB and inserted in the
//! issue queue (non-memory uops) or the load or store queue. Every dispatch slot
//! of the cycle is accounted to exactly one [`DispatchStall`] outcome.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::common::Cycle;
use crate::config::{Config, StageKind};
use crate::core::cpu::Core;
use crate::core::uop::Structure;
use crate::soc::MemorySystem;

/// Outcome of a dispatch slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DispatchStall {
    /// A correct-path uop dispatched.
    Used,
    /// A wrong-path uop dispatched.
    Spec,
    /// Fetch queue empty or its head still being fetched.
    FetchQueue,
    /// Reorder buffer full.
    Rob,
    /// Issue queue full.
    Iq,
    /// Load queue full.
    Lq,
    /// Store queue full.
    Sq,
    /// Not enough free physical registers.
    Rename,
    /// No running context on the thread.
    Ctx,
}

impl DispatchStall {
    /// Number of outcomes.
    pub const COUNT: usize = 9;

    /// All outcomes in report order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Used,
        Self::Spec,
        Self::FetchQueue,
        Self::Rob,
        Self::Iq,
        Self::Lq,
        Self::Sq,
        Self::Rename,
        Self::Ctx,
    ];

    /// Position in the stall counter array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Used => "used",
            Self::Spec => "spec",
            Self::FetchQueue => "fetch_queue",
            Self::Rob => "rob",
            Self::Iq => "iq",
            Self::Lq => "lq",
            Self::Sq => "sq",
            Self::Rename => "rename",
            Self::Ctx => "ctx",
        }
    }
}

impl fmt::Display for DispatchStall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns why thread `t` cannot dispatch its fetch queue head, or
/// [`DispatchStall::Used`] if it can.
pub fn can_dispatch(core: &Core, t: usize, mem: &dyn MemorySystem, now: Cycle) -> DispatchStall {
    let thread = &core.threads[t];
    if !thread.is_running() {
        return DispatchStall::Ctx;
    }
    let Some(id) = thread.frontend.head() else {
        return DispatchStall::FetchQueue;
    };
    let uop = &core.uops[id];
    if mem.fetch_pending(core.id, uop.fetch_access, now) {
        return DispatchStall::FetchQueue;
    }

    let limits = &core.limits;
    if !thread.rob.can_enqueue() || !limits.rob.has_room(thread.rob.len(), core.total(|th| th.rob.len())) {
        return DispatchStall::Rob;
    }
    if uop.kind.is_load() {
        if !limits.lq.has_room(thread.lq.len(), core.total(|th| th.lq.len())) {
            return DispatchStall::Lq;
        }
    } else if uop.kind.is_store() {
        if !limits.sq.has_room(thread.sq.len(), core.total(|th| th.sq.len())) {
            return DispatchStall::Sq;
        }
    } else if !limits.iq.has_room(thread.iq.len(), core.total(|th| th.iq.len())) {
        return DispatchStall::Iq;
    }
    if !thread.rf.can_rename(uop, &core.rf_in_use()) {
        return DispatchStall::Rename;
    }
    DispatchStall::Used
}

/// Dispatches up to `quantum` uops of thread `t` and returns how many went through.
///
/// The first slot that cannot be used charges every remaining slot to its reason.
fn dispatch_thread(core: &mut Core, t: usize, quantum: usize, mem: &dyn MemorySystem, now: Cycle) -> usize {
    let mut remaining = quantum;
    while remaining > 0 {
        let stall = can_dispatch(core, t, mem, now);
        if stall != DispatchStall::Used {
            core.stats.dispatch_stalls[stall.index()] += remaining as u64;
            break;
        }

        let thread = &mut core.threads[t];
        let Some(id) = thread.frontend.pop() else {
            break;
        };
        let uop = &mut core.uops[id];
        thread.rf.rename(uop);
        uop.di_seq = core.di_seq;
        core.di_seq += 1;
        let kind = uop.kind;
        let outcome = if uop.specmode {
            DispatchStall::Spec
        } else {
            DispatchStall::Used
        };

        thread.rob.enqueue(id);
        core.uops.enter(id, Structure::Rob);
        let queue = if kind.is_load() {
            thread.lq.insert(id);
            Structure::Lq
        } else if kind.is_store() {
            thread.sq.insert(id);
            Structure::Sq
        } else {
            thread.iq.insert(id);
            Structure::Iq
        };
        core.uops.enter(id, queue);
        let _ = core.uops.leave(id, Structure::FetchQueue);

        thread.stats.dispatched[kind.index()] += 1;
        core.stats.dispatch_stalls[outcome.index()] += 1;
        trace!(target: "o3sim::pipeline", core = core.id, thread = t, uop = %id, %kind, "dispatch");
        remaining -= 1;
    }
    quantum - remaining
}

/// Executes the Dispatch stage of one core.
///
/// With [`StageKind::Timeslice`] the first thread (in rotation) able to dispatch
/// receives the whole width. With [`StageKind::Shared`] threads take turns one
/// uop at a time until the width is used or every thread failed in a row.
pub fn dispatch_stage(core: &mut Core, config: &Config, mem: &dyn MemorySystem, now: Cycle) {
    let threads = core.threads.len();
    let width = config.pipeline.dispatch_width;
    match config.pipeline.dispatch_kind {
        StageKind::Timeslice => {
            for _ in 0..threads {
                core.dispatch_current = (core.dispatch_current + 1) % threads;
                if can_dispatch(core, core.dispatch_current, mem, now) == DispatchStall::Used {
                    break;
                }
            }
            let _ = dispatch_thread(core, core.dispatch_current, width, mem, now);
        }
        StageKind::Shared => {
            let mut quantum = width;
            let mut skip = threads;
            while quantum > 0 && skip > 0 {
                core.dispatch_current = (core.dispatch_current + 1) % threads;
                if dispatch_thread(core, core.dispatch_current, 1, mem, now) == 1 {
                    quantum -= 1;
                    skip = threads;
                } else {
                    skip -= 1;
                }
            }
        }
    }
}
