//! Fetch Stage: move uops from each thread's front end into its fetch queue.
//!
//! Every fetched uop gets a fresh sequence number and starts an instruction fetch
//! in the memory system; dispatch waits for that fetch to finish. Control uops
//! on the correct path consult the branch predictor. A wrong prediction switches
//! the front end to the wrong path until recovery.

use tracing::trace;

use crate::common::Cycle;
use crate::config::Config;
use crate::core::cpu::Core;
use crate::core::uop::{Structure, Uop, UopId};
use crate::soc::MemorySystem;

/// Executes the Fetch stage of one core.
///
/// `next_uop` is the processor-wide sequence counter.
pub fn fetch_stage(core: &mut Core, config: &Config, mem: &mut dyn MemorySystem, now: Cycle, next_uop: &mut u64) {
    for t in 0..core.threads.len() {
        let thread = &mut core.threads[t];
        if !thread.is_running() || thread.frontend.is_stalled(now) {
            continue;
        }
        for _ in 0..config.pipeline.fetch_width {
            if thread.frontend.is_full() {
                break;
            }
            let Some((decoded, specmode)) = thread.frontend.next_decoded() else {
                break;
            };
            let id = UopId(*next_uop);
            *next_uop += 1;

            let mut uop = Uop::from_decoded(id, core.id, t, &decoded);
            uop.specmode = specmode;
            uop.fetch_access = mem.start_fetch(core.id, t, uop.eip, now);
            if uop.kind.is_control() && !specmode {
                let _ = thread.bpred.lookup(&mut uop);
                if uop.is_mispredicted() {
                    trace!(
                        target: "o3sim::pipeline",
                        core = core.id,
                        thread = t,
                        uop = %id,
                        neip = uop.neip,
                        pred_neip = uop.pred_neip,
                        "mispredicted, fetching wrong path"
                    );
                    thread.frontend.enter_specmode(id, uop.pred_neip, uop.prediction);
                }
            }

            trace!(target: "o3sim::pipeline", core = core.id, thread = t, uop = %id, kind = %uop.kind, specmode, "fetch");
            let _ = core.uops.insert(uop, Structure::FetchQueue);
            thread.frontend.push(id);
            thread.stats.fetched += 1;
        }
    }
}
