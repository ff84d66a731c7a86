//! Writeback Stage Tests.

use o3sim_core::core::uop::UopId;
use o3sim_core::soc::{AccessKind, MemCompletion};
use pretty_assertions::assert_eq;

use crate::common::builder::TraceBuilder;
use crate::common::harness::{TestContext, narrow_config};
use crate::common::mocks::MockMemory;

#[test]
fn load_completes_when_its_data_returns() {
    let trace = TraceBuilder::default().load(1, 0, 0x100).build();
    let mut ctx = TestContext::new().load(0, 0, trace);
    let latency = ctx.cpu().config().memory.load_latency;

    // Issued in cycle 3.
    ctx.step(2 + latency);
    let head = ctx.thread(0, 0).rob.head().unwrap();
    assert!(!ctx.cpu().cores()[0].uops[head].completed);

    ctx.step(1);
    assert!(ctx.cpu().cores()[0].uops[head].completed);
    assert!(ctx.thread(0, 0).lq.is_empty());
}

#[test]
fn completion_of_untracked_uop_is_ignored() {
    let mut mem = MockMemory::new();
    let _ = mem.expect_start_fetch().returning(|_, _, _, _| 0);
    let _ = mem.expect_fetch_pending().return_const(false);
    let _ = mem.expect_can_access().return_const(false);
    let _ = mem.expect_completions().returning(|_, _| {
        vec![MemCompletion {
            uop: UopId(999),
            kind: AccessKind::Load,
        }]
    });
    let mut ctx = TestContext::with_memory(narrow_config(2), Box::new(mem))
        .load(0, 0, TraceBuilder::default().independent_adds(2).build());

    ctx.run_to_completion(50);
    assert_eq!(ctx.stats().committed, 2);
}

#[test]
fn mispredicted_branch_recovers_before_it_commits() {
    let trace = TraceBuilder::default().branch(0x2000).nop().nop().build();
    let mut ctx = TestContext::new().load(0, 0, trace);

    // Issued in cycle 3 with a one-cycle latency.
    ctx.step(4);
    let thread = ctx.thread(0, 0);
    assert_eq!(thread.stats.recoveries, 1);
    assert_eq!(thread.stats.committed_total(), 0);
    assert!(!thread.frontend.in_specmode());
}
