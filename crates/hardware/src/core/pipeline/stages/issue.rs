//! Issue Stage: send ready uops to the memory system or a functional unit.
//!
//! Each thread issues, in order:
//! 1. **Stores:** Committed stores at the head of the store queue start their write.
//! 2. **Loads:** Loads with ready operands leave the load queue and start their read.
//! 3. **Issue Queue:** Uops with ready operands reserve a functional unit and enter
//!    the event queue until their result is available.

use tracing::trace;

use crate::common::Cycle;
use crate::config::{Config, StageKind};
use crate::core::cpu::Core;
use crate::core::uop::Structure;
use crate::soc::{AccessKind, MemRequest, MemorySystem};

/// Marks stores still in the ROB as ready once their operands are available.
///
/// A ready store may commit; its memory write starts after commit.
fn refresh_store_readiness(core: &mut Core, t: usize) {
    let thread = &core.threads[t];
    for id in thread.sq.iter() {
        let uop = &mut core.uops[id];
        if !uop.ready && uop.residency.contains(Structure::Rob) {
            uop.ready = thread.rf.ready(uop);
        }
    }
}

fn issue_sq(core: &mut Core, t: usize, mut quantum: usize, mem: &mut dyn MemorySystem, now: Cycle) -> usize {
    let pending: Vec<_> = core.threads[t].sq.iter().collect();
    for id in pending {
        if quantum == 0 {
            break;
        }
        let uop = &mut core.uops[id];
        if uop.issued {
            continue;
        }
        // Stores write memory only after commit, in program order.
        if uop.residency.contains(Structure::Rob) || !mem.can_access(core.id, AccessKind::Store, now) {
            break;
        }
        uop.issued = true;
        uop.issue_when = now;
        let request = MemRequest {
            core: core.id,
            thread: t,
            uop: id,
            kind: AccessKind::Store,
            addr: uop.mem_addr,
        };
        let kind = uop.kind;
        core.uops.enter(id, Structure::Memory);
        mem.access(request, now);
        core.threads[t].stats.issued[kind.index()] += 1;
        trace!(target: "o3sim::pipeline", core = core.id, thread = t, uop = %id, "issue store");
        quantum -= 1;
    }
    quantum
}

fn issue_lq(core: &mut Core, t: usize, mut quantum: usize, mem: &mut dyn MemorySystem, now: Cycle) -> usize {
    let pending: Vec<_> = core.threads[t].lq.iter().collect();
    for id in pending {
        if quantum == 0 {
            break;
        }
        let thread = &mut core.threads[t];
        let uop = &mut core.uops[id];
        if !thread.rf.ready(uop) {
            continue;
        }
        if !mem.can_access(core.id, AccessKind::Load, now) {
            break;
        }
        uop.ready = true;
        uop.issued = true;
        uop.issue_when = now;
        let request = MemRequest {
            core: core.id,
            thread: t,
            uop: id,
            kind: AccessKind::Load,
            addr: uop.mem_addr,
        };
        let kind = uop.kind;
        let _ = thread.lq.remove(id);
        thread.stats.issued[kind.index()] += 1;
        core.uops.enter(id, Structure::Memory);
        let _ = core.uops.leave(id, Structure::Lq);
        mem.access(request, now);
        trace!(target: "o3sim::pipeline", core = core.id, thread = t, uop = %id, "issue load");
        quantum -= 1;
    }
    quantum
}

fn issue_iq(core: &mut Core, t: usize, mut quantum: usize, now: Cycle) -> usize {
    let pending: Vec<_> = core.threads[t].iq.iter().collect();
    for id in pending {
        if quantum == 0 {
            break;
        }
        let thread = &mut core.threads[t];
        let uop = &mut core.uops[id];
        if !thread.rf.ready(uop) {
            continue;
        }
        uop.ready = true;
        let latency = match uop.fu_class {
            Some(class) => {
                let first_try = *uop.issue_try_when.get_or_insert(now);
                match core.fu.reserve(class, first_try, now) {
                    Ok(latency) => latency,
                    Err(_) => continue,
                }
            }
            None => 1,
        };
        uop.issued = true;
        uop.issue_when = now;
        uop.when = now + latency;
        let (kind, when) = (uop.kind, uop.when);
        let _ = thread.iq.remove(id);
        thread.stats.issued[kind.index()] += 1;
        core.events.push(when, id);
        core.uops.enter(id, Structure::EventQueue);
        let _ = core.uops.leave(id, Structure::Iq);
        trace!(target: "o3sim::pipeline", core = core.id, thread = t, uop = %id, when, "issue");
        quantum -= 1;
    }
    quantum
}

/// Issues up to `quantum` uops of thread `t` and returns the unused quantum.
fn issue_thread(core: &mut Core, t: usize, quantum: usize, mem: &mut dyn MemorySystem, now: Cycle) -> usize {
    refresh_store_readiness(core, t);
    let quantum = issue_sq(core, t, quantum, mem, now);
    let quantum = issue_lq(core, t, quantum, mem, now);
    issue_iq(core, t, quantum, now)
}

/// Executes the Issue stage of one core.
///
/// With [`StageKind::Timeslice`] the next thread with a non-empty issue, load or
/// store queue receives the whole width. With [`StageKind::Shared`] threads take
/// turns one uop at a time until the width is used or every thread failed in a row.
pub fn issue_stage(core: &mut Core, config: &Config, mem: &mut dyn MemorySystem, now: Cycle) {
    let threads = core.threads.len();
    let width = config.pipeline.issue_width;
    match config.pipeline.issue_kind {
        StageKind::Timeslice => {
            for _ in 0..threads {
                core.issue_current = (core.issue_current + 1) % threads;
                let thread = &core.threads[core.issue_current];
                if !(thread.iq.is_empty() && thread.lq.is_empty() && thread.sq.is_empty()) {
                    let _ = issue_thread(core, core.issue_current, width, mem, now);
                    break;
                }
            }
        }
        StageKind::Shared => {
            let mut quantum = width;
            let mut skip = threads;
            while quantum > 0 && skip > 0 {
                core.issue_current = (core.issue_current + 1) % threads;
                if issue_thread(core, core.issue_current, 1, mem, now) == 0 {
                    quantum -= 1;
                    skip = threads;
                } else {
                    skip -= 1;
                }
            }
        }
    }
}
