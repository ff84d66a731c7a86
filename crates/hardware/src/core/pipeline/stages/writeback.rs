//! Writeback Stage: complete uops whose results are available.
//!
//! Memory completions are collected first: load data enters the event queue for
//! this cycle, and finished store writes leave the store queue. Then every due
//! event completes in `(when, id)` order, marking its outputs written so dependent
//! uops can issue. With writeback-time recovery a mispredicted control uop
//! squashes the wrong path as soon as it completes.

use tracing::trace;

use crate::common::Cycle;
use crate::config::{Config, RecoverKind};
use crate::core::cpu::Core;
use crate::core::pipeline::recover::recover;
use crate::core::uop::Structure;
use crate::soc::{AccessKind, MemorySystem};

fn collect_memory(core: &mut Core, mem: &mut dyn MemorySystem, now: Cycle) {
    for done in mem.completions(core.id, now) {
        let id = done.uop;
        let Some(uop) = core.uops.get_mut(id) else {
            continue;
        };
        match done.kind {
            AccessKind::Load if uop.residency.contains(Structure::Rob) => {
                uop.when = now;
                core.events.push(now, id);
                core.uops.enter(id, Structure::EventQueue);
            }
            AccessKind::Load => {}
            AccessKind::Store => {
                uop.completed = true;
                let _ = core.threads[uop.thread].sq.remove(id);
                let _ = core.uops.leave(id, Structure::Sq);
                trace!(target: "o3sim::pipeline", core = core.id, uop = %id, "store done");
            }
        }
        let _ = core.uops.leave(id, Structure::Memory);
    }
}

/// Executes the Writeback stage of one core.
pub fn writeback_stage(core: &mut Core, config: &Config, mem: &mut dyn MemorySystem, now: Cycle) {
    collect_memory(core, mem, now);

    while let Some(id) = core.events.pop_ready(now) {
        let uop = &mut core.uops[id];
        uop.completed = true;
        let t = uop.thread;
        let mispredicted = !uop.specmode && uop.is_mispredicted();
        core.threads[t].rf.write(uop);
        trace!(target: "o3sim::pipeline", core = core.id, thread = t, uop = %id, "writeback");

        if mispredicted && config.general.recover_kind == RecoverKind::Writeback {
            recover(core, t, config.general.recover_penalty, now);
        }
        let _ = core.uops.leave(id, Structure::EventQueue);
    }
}
