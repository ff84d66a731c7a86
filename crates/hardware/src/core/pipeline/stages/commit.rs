//! Commit Stage: retire uops from the ROB head in program order.
//!
//! This stage:
//! 1. Runs the forward-progress watchdog for every thread.
//! 2. Retires eligible heads: stores once their operands are ready, everything
//!    else once completed.
//! 3. Releases the physical registers the retired uop replaced and trains the
//!    branch predictor with committed control uops.
//! 4. With commit-time recovery, squashes the wrong path behind a mispredicted
//!    control uop and frees the functional units.

use tracing::{error, trace};

use crate::common::error::SimError;
use crate::common::Cycle;
use crate::config::{Config, RecoverKind, StageKind};
use crate::core::cpu::Core;
use crate::core::pipeline::recover::recover;
use crate::core::uop::Structure;

/// Checks every thread of the core for a commit stall.
///
/// # Errors
///
/// Returns [`SimError::CommitStall`] for the first running thread that has not
/// committed for more than `threshold` cycles.
pub fn watchdog(core: &mut Core, threshold: Cycle, now: Cycle) -> Result<(), SimError> {
    for thread in &mut core.threads {
        if !thread.is_running() {
            thread.last_commit_cycle = now;
        } else if now - thread.last_commit_cycle > threshold {
            error!(
                core = core.id,
                thread = thread.id,
                last_commit = thread.last_commit_cycle,
                cycle = now,
                "simulation ended due to commit stall"
            );
            return Err(SimError::CommitStall {
                core: core.id,
                thread: thread.id,
                last_commit: thread.last_commit_cycle,
                cycle: now,
            });
        }
    }
    Ok(())
}

/// Returns true if thread `t` has a ROB head that may retire.
pub fn can_commit(core: &Core, t: usize) -> bool {
    let thread = &core.threads[t];
    if !thread.is_running() {
        return false;
    }
    thread.rob.head().is_some_and(|id| {
        let uop = &core.uops[id];
        if uop.kind.is_store() {
            uop.ready
        } else {
            uop.completed
        }
    })
}

/// Retires up to `quantum` uops of thread `t` and returns how many retired.
fn commit_thread(core: &mut Core, t: usize, quantum: usize, config: &Config, now: Cycle) -> usize {
    let at_commit = config.general.recover_kind == RecoverKind::Commit;
    let mut committed = 0;
    while committed < quantum && can_commit(core, t) {
        let thread = &mut core.threads[t];
        let Some(id) = thread.rob.head() else {
            break;
        };
        let uop = &core.uops[id];

        if uop.specmode && at_commit {
            recover(core, t, config.general.recover_penalty, now);
            break;
        }

        thread.rf.commit(uop);
        let kind = uop.kind;
        let mispredicted = uop.is_mispredicted();
        if kind.is_control() {
            thread.bpred.update(uop);
            thread.stats.branches += 1;
            if mispredicted {
                thread.stats.mispredictions += 1;
            }
        }
        let _ = thread.rob.remove_head();
        thread.stats.committed[kind.index()] += 1;
        thread.last_commit_cycle = now;
        let _ = core.uops.leave(id, Structure::Rob);
        trace!(target: "o3sim::pipeline", core = core.id, thread = t, uop = %id, %kind, "commit");
        committed += 1;

        if mispredicted && at_commit {
            recover(core, t, config.general.recover_penalty, now);
            core.fu.release_all();
            break;
        }
    }
    committed
}

/// Executes the Commit stage of one core.
///
/// With [`StageKind::Timeslice`] the next thread able to commit retires up to the
/// whole width. With [`StageKind::Shared`] threads take turns one uop at a time
/// until the width is used or every thread failed in a row.
///
/// # Errors
///
/// Returns the watchdog error; nothing is committed in that cycle.
pub fn commit_stage(core: &mut Core, config: &Config, now: Cycle) -> Result<(), SimError> {
    watchdog(core, config.general.commit_stall_threshold, now)?;

    let threads = core.threads.len();
    let width = config.pipeline.commit_width;
    match config.pipeline.commit_kind {
        StageKind::Timeslice => {
            for _ in 0..threads {
                core.commit_current = (core.commit_current + 1) % threads;
                if can_commit(core, core.commit_current) {
                    let _ = commit_thread(core, core.commit_current, width, config, now);
                    break;
                }
            }
        }
        StageKind::Shared => {
            let mut quantum = width;
            let mut skip = threads;
            while quantum > 0 && skip > 0 {
                core.commit_current = (core.commit_current + 1) % threads;
                if commit_thread(core, core.commit_current, 1, config, now) == 1 {
                    quantum -= 1;
                    skip = threads;
                } else {
                    skip -= 1;
                }
            }
        }
    }
    Ok(())
}
