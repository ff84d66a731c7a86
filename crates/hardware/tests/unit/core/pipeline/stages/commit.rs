//! Commit Stage Tests.
//!
//! Verifies in-order retirement, the store eligibility rule, the commit width and
//! the forward-progress watchdog. A property test runs random traces through
//! random machine shapes and checks program-order commit and queue capacities
//! on every cycle.

use std::collections::HashSet;

use o3sim_core::common::SimError;
use o3sim_core::config::{Config, FuUnitConfig, PredictorKind, QueueKind, RecoverKind, StageKind};
use o3sim_core::core::units::fu::FuClass;
use o3sim_core::core::uop::{DecodedUop, UopId, UopKind};
use o3sim_core::core::{Core, Cpu, Thread};
use o3sim_core::soc::FixedLatencyMemory;
use o3sim_core::Simulator;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::builder::TraceBuilder;
use crate::common::harness::{TestContext, narrow_config};

#[test]
fn younger_completed_uop_waits_for_older_head() {
    let mut config = narrow_config(2);
    *config.functional_units.unit_mut(FuClass::IntMult) = FuUnitConfig::new(1, 10, 1);
    let trace = TraceBuilder::default().mul(1, 2, 3).add(4, &[]).build();
    let mut ctx = TestContext::with_config(config).load(0, 0, trace);

    ctx.step(8);
    let thread = ctx.thread(0, 0);
    let core = &ctx.cpu().cores()[0];
    let (Some(head), Some(tail)) = (thread.rob.head(), thread.rob.tail()) else {
        panic!("both uops in the ROB");
    };
    assert!(!core.uops[head].completed);
    assert!(core.uops[tail].completed);
    assert_eq!(thread.stats.committed_total(), 0);

    ctx.run_to_completion(50);
    assert_eq!(ctx.thread(0, 0).stats.committed_total(), 2);
}

#[test]
fn store_commits_on_ready_operands() {
    let trace = TraceBuilder::default().store(1, 0, 0x100).build();
    let mut ctx = TestContext::new().load(0, 0, trace);

    ctx.step(4);
    let thread = ctx.thread(0, 0);
    assert_eq!(thread.stats.committed[UopKind::Store.index()], 1);
    assert!(thread.rob.is_empty());
    // The write is still in flight.
    assert_eq!(thread.sq.len(), 1);
}

#[test]
fn commit_width_bounds_retirement_per_cycle() {
    let mut config = narrow_config(4);
    config.pipeline.commit_width = 1;
    let mut ctx = TestContext::with_config(config).load(0, 0, TraceBuilder::default().independent_adds(6).build());

    let mut last = 0;
    while !ctx.sim.is_finished() {
        ctx.step(1);
        let committed = ctx.stats().committed;
        assert!(committed - last <= 1);
        last = committed;
    }
    assert_eq!(last, 6);
}

fn stalled_cpu(threshold: u64) -> (Cpu, FixedLatencyMemory) {
    let mut config = Config::default();
    config.general.commit_stall_threshold = threshold;
    let memory = FixedLatencyMemory::new(&config.memory, config.general.cores);
    let mut cpu = Cpu::new(config).unwrap();
    cpu.map_context(0, 0, 0).unwrap();
    (cpu, memory)
}

#[test]
fn watchdog_fires_one_cycle_past_the_threshold() {
    let (mut cpu, mut memory) = stalled_cpu(5);
    for _ in 0..5 {
        cpu.tick(&mut memory).unwrap();
    }
    match cpu.tick(&mut memory) {
        Err(SimError::CommitStall {
            core: 0,
            thread: 0,
            last_commit: 0,
            cycle: 6,
        }) => {}
        other => panic!("expected a commit stall, got {other:?}"),
    }
}

#[test]
fn suspended_context_does_not_trip_the_watchdog() {
    let (mut cpu, mut memory) = stalled_cpu(5);
    cpu.set_running(0, 0, false).unwrap();
    for _ in 0..20 {
        cpu.tick(&mut memory).unwrap();
    }

    // Resuming restarts the count from the last suspended cycle.
    cpu.set_running(0, 0, true).unwrap();
    for _ in 0..5 {
        cpu.tick(&mut memory).unwrap();
    }
    assert!(cpu.tick(&mut memory).is_err());
}

// ══════════════════════════════════════════════════════════
// Random traces
// ══════════════════════════════════════════════════════════

/// One trace entry: operation selector, destination, source, branch distance.
type Op = (u8, u8, u8, u64);

fn random_trace(ops: &[Op], base: u64) -> Vec<DecodedUop> {
    ops.iter()
        .fold(TraceBuilder::new(base), |b, &(op, dst, src, skip)| match op {
            0 => b.add(dst, &[src]),
            1 => b.mul(dst, src, dst),
            2 => b.load(dst, src, 0x100),
            3 => b.store(src, dst, 0x200),
            // Forward targets keep addresses unique; a cold BTB mispredicts taken ones.
            4 => {
                let target = b.eip() + 4 + 4 * skip;
                b.branch(target)
            }
            _ => b.nop(),
        })
        .build()
}

fn stage_kind(shared: bool) -> StageKind {
    if shared { StageKind::Shared } else { StageKind::Timeslice }
}

fn queue_kind(shared: bool) -> QueueKind {
    if shared { QueueKind::Shared } else { QueueKind::Private }
}

/// Checks every per-thread structure of `core` against its configured capacity.
fn assert_within_capacity(core: &Core, config: &Config) -> Result<(), TestCaseError> {
    let q = &config.queues;
    let threads = config.general.threads;
    let bound = |kind: QueueKind, size: usize| match kind {
        QueueKind::Private => (size, size * threads),
        QueueKind::Shared => (size * threads, size * threads),
    };
    let checks: [(&str, (usize, usize), fn(&Thread) -> usize); 4] = [
        ("rob", bound(q.rob_kind, q.rob_size), |t| t.rob.len()),
        ("iq", bound(q.iq_kind, q.iq_size), |t| t.iq.len()),
        ("lq", bound(q.lsq_kind, q.lq_size), |t| t.lq.len()),
        ("sq", bound(q.lsq_kind, q.sq_size), |t| t.sq.len()),
    ];
    for (name, (per_thread, per_core), len) in checks {
        prop_assert!(core.threads.iter().all(|t| len(t) <= per_thread), "{} over thread capacity", name);
        prop_assert!(core.total(len) <= per_core, "{} over core capacity", name);
    }
    prop_assert!(core.threads.iter().all(|t| t.frontend.queue_len() <= q.fetch_queue_size));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_traces_commit_in_program_order_within_capacity(
        traces in prop::collection::vec(
            prop::collection::vec((0u8..6, 1u8..8, 0u8..8, 0u64..3), 1..24),
            1..=2,
        ),
        (rob, iq, lq, sq, fetch_queue) in (1usize..8, 1usize..8, 1usize..4, 1usize..4, 1usize..8),
        width in 1usize..4,
        shared_queues in any::<bool>(),
        shared_stages in any::<bool>(),
        at_commit in any::<bool>(),
        predictor in prop::sample::select(vec![
            PredictorKind::TwoLevel,
            PredictorKind::Bimodal,
            PredictorKind::Combined,
            PredictorKind::NotTaken,
        ]),
    ) {
        let mut config = Config::default();
        config.general.threads = traces.len();
        config.general.recover_kind = if at_commit { RecoverKind::Commit } else { RecoverKind::Writeback };
        config.pipeline.fetch_width = width;
        config.pipeline.dispatch_width = width;
        config.pipeline.issue_width = width;
        config.pipeline.commit_width = width;
        config.pipeline.dispatch_kind = stage_kind(shared_stages);
        config.pipeline.issue_kind = stage_kind(shared_stages);
        config.pipeline.commit_kind = stage_kind(!shared_stages);
        config.queues.rob_size = rob;
        config.queues.iq_size = iq;
        config.queues.lq_size = lq;
        config.queues.sq_size = sq;
        config.queues.fetch_queue_size = fetch_queue;
        config.queues.rob_kind = queue_kind(shared_queues);
        config.queues.iq_kind = queue_kind(shared_queues);
        config.queues.lsq_kind = queue_kind(shared_queues);
        config.branch_predictor.kind = predictor;

        let traces: Vec<Vec<DecodedUop>> = traces
            .iter()
            .enumerate()
            .map(|(t, ops)| random_trace(ops, 0x1000 + 0x10_0000 * t as u64))
            .collect();
        let mut sim = Simulator::new(config.clone()).unwrap();
        for (t, trace) in traces.iter().enumerate() {
            sim.load_trace(0, t, trace.clone()).unwrap();
        }

        // Committed uops leave the ROB head and are never speculative, so a
        // correct-path ROB entry that disappears during a tick has committed.
        let mut committed: Vec<Vec<u64>> = vec![Vec::new(); traces.len()];
        let mut cycles = 0;
        while !sim.is_finished() {
            prop_assert!(cycles < 5_000, "no progress after {} cycles", cycles);
            let before: Vec<Vec<(u64, UopId)>> = sim.cpu.cores()[0]
                .threads
                .iter()
                .map(|t| {
                    let core = &sim.cpu.cores()[0];
                    t.rob
                        .iter()
                        .filter(|&id| !core.uops[id].specmode)
                        .map(|id| (core.uops[id].eip, id))
                        .collect()
                })
                .collect();
            sim.tick().unwrap();
            cycles += 1;

            let core = &sim.cpu.cores()[0];
            for (t, entries) in before.into_iter().enumerate() {
                let still: HashSet<_> = core.threads[t].rob.iter().collect();
                committed[t].extend(entries.into_iter().filter(|(_, id)| !still.contains(id)).map(|(eip, _)| eip));
            }
            assert_within_capacity(core, &config)?;
        }

        for (t, trace) in traces.iter().enumerate() {
            let expected: Vec<u64> = trace.iter().map(|u| u.eip).collect();
            prop_assert_eq!(&committed[t], &expected, "thread {} commit order", t);
        }
        let stats = sim.stats();
        prop_assert_eq!(stats.committed, traces.iter().map(Vec::len).sum::<usize>() as u64);
    }
}
