//! Misprediction recovery.
//!
//! Recovery removes every wrong-path uop of one thread from the fetch queue, the
//! issue, load and store queues, the core's event queue and the ROB tail. ROB
//! entries are undone youngest first so each logical register returns to the
//! mapping it had before the mispredicted control uop. The branch predictor
//! history and return stack are restored from the snapshot the mispredicted uop
//! took at fetch, and fetch resumes on the correct path after the penalty.

use tracing::debug;

use crate::common::Cycle;
use crate::core::cpu::Core;
use crate::core::uop::{Structure, UopId};

/// Squashes the wrong path of thread `t` and blocks its fetch for `penalty` cycles.
///
/// # Panics
///
/// Panics if the ROB tail holds a speculative uop whose renames were already
/// released, which means uops were committed past a misprediction.
pub fn recover(core: &mut Core, t: usize, penalty: Cycle, now: Cycle) {
    let core_id = core.id;
    let Core {
        threads,
        uops,
        events,
        ..
    } = core;
    let thread = &mut threads[t];
    let mut squashed = 0u64;

    for id in thread.frontend.recover(uops) {
        let _ = uops.leave(id, Structure::FetchQueue);
        squashed += 1;
    }
    for id in thread.iq.recover(uops) {
        let _ = uops.leave(id, Structure::Iq);
    }
    for id in thread.lq.recover(uops) {
        let _ = uops.leave(id, Structure::Lq);
    }
    for id in thread.sq.recover(uops) {
        let _ = uops.leave(id, Structure::Sq);
    }
    let in_thread = |id: UopId| uops.get(id).is_some_and(|u| u.thread == t && u.specmode);
    for id in events.remove_if(in_thread) {
        let _ = uops.leave(id, Structure::EventQueue);
    }

    while let Some(id) = thread.rob.tail() {
        let uop = &uops[id];
        if !uop.specmode {
            break;
        }
        if !uop.completed {
            thread.rf.write(uop);
        }
        thread.rf.undo(uop);
        let _ = thread.rob.remove_tail();
        let _ = uops.leave(id, Structure::Rob);
        squashed += 1;
    }

    if let Some(path) = thread.frontend.leave_specmode() {
        thread.bpred.recover(&path.snapshot);
        debug!(
            target: "o3sim::pipeline",
            core = core_id,
            thread = t,
            branch = %path.branch,
            squashed,
            "recover"
        );
    }
    thread.frontend.stall(now + penalty);
    thread.stats.squashed += squashed;
    thread.stats.recoveries += 1;
}
