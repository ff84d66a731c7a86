//! Dispatch Stage Tests.
//!
//! Verifies that every dispatch slot is charged to exactly one outcome and that
//! the thread selection policies divide the width as configured.

use o3sim_core::config::StageKind;
use o3sim_core::core::pipeline::stages::DispatchStall;
use o3sim_core::core::uop::UopKind;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::TraceBuilder;
use crate::common::harness::{TestContext, narrow_config};
use crate::common::mocks::MockMemory;

fn stall(ctx: &TestContext, reason: DispatchStall) -> u64 {
    ctx.cpu().cores()[0].stats.dispatch_stall(reason)
}

fn dispatched(ctx: &TestContext, thread: usize) -> u64 {
    ctx.thread(0, thread).stats.dispatched.iter().sum()
}

#[test]
fn rob_of_one_entry_charges_the_second_slot() {
    let mut config = narrow_config(2);
    config.queues.rob_size = 1;
    let mut ctx = TestContext::with_config(config).load(0, 0, TraceBuilder::default().independent_adds(2).build());

    // Cycle 1: nothing fetched yet. Cycle 2: one uop fits in the ROB.
    ctx.step(2);
    assert_eq!(stall(&ctx, DispatchStall::FetchQueue), 2);
    assert_eq!(stall(&ctx, DispatchStall::Used), 1);
    assert_eq!(stall(&ctx, DispatchStall::Rob), 1);

    let thread = ctx.thread(0, 0);
    assert_eq!(thread.rob.len(), 1);
    assert_eq!(thread.iq.len(), 1);
    assert_eq!(thread.frontend.queue_len(), 1);
}

#[test]
fn every_slot_is_accounted_once() {
    let mut ctx = TestContext::with_config(narrow_config(3)).load(0, 0, TraceBuilder::default().independent_adds(7).build());
    let cycles = ctx.run_to_completion(100);
    let total: u64 = DispatchStall::ALL.iter().map(|&r| stall(&ctx, r)).sum();
    assert_eq!(total, cycles * 3);
    assert_eq!(stall(&ctx, DispatchStall::Used), 7);
}

#[test]
fn thread_without_context_charges_ctx() {
    let mut ctx = TestContext::new();
    ctx.step(3);
    let width = ctx.cpu().config().pipeline.dispatch_width as u64;
    assert_eq!(stall(&ctx, DispatchStall::Ctx), 3 * width);
}

#[test]
fn pending_instruction_fetch_charges_fetch_queue() {
    let mut mem = MockMemory::new();
    let _ = mem.expect_start_fetch().returning(|_, _, _, _| 0);
    let _ = mem.expect_fetch_pending().return_const(true);
    let _ = mem.expect_can_access().return_const(true);
    let _ = mem.expect_completions().returning(|_, _| Vec::new());
    let mut ctx = TestContext::with_memory(narrow_config(2), Box::new(mem))
        .load(0, 0, TraceBuilder::default().independent_adds(4).build());

    ctx.step(5);
    assert_eq!(stall(&ctx, DispatchStall::FetchQueue), 10);
    assert!(ctx.thread(0, 0).rob.is_empty());
    assert_eq!(ctx.thread(0, 0).frontend.queue_len(), 4);
}

#[test]
fn full_load_queue_charges_lq() {
    let mut config = narrow_config(2);
    config.queues.lq_size = 1;
    let trace = TraceBuilder::default().load(1, 0, 0x100).load(2, 0, 0x200).build();
    let mut ctx = TestContext::with_config(config).load(0, 0, trace);

    ctx.step(2);
    assert_eq!(stall(&ctx, DispatchStall::Lq), 1);
    assert_eq!(ctx.thread(0, 0).lq.len(), 1);
    assert_eq!(ctx.thread(0, 0).stats.dispatched[UopKind::Load.index()], 1);
}

#[test]
fn exhausted_register_file_charges_rename() {
    let mut config = narrow_config(8);
    // 32 architectural mappings leave four registers to rename into.
    config.queues.rf_int_size = 36;
    let mut ctx = TestContext::with_config(config).load(0, 0, TraceBuilder::default().independent_adds(5).build());

    ctx.step(2);
    assert_eq!(stall(&ctx, DispatchStall::Used), 4);
    assert_eq!(stall(&ctx, DispatchStall::Rename), 4);

    ctx.run_to_completion(100);
    assert_eq!(ctx.thread(0, 0).stats.committed_total(), 5);
}

#[rstest]
#[case::timeslice(StageKind::Timeslice, [0, 2])]
#[case::shared(StageKind::Shared, [1, 1])]
fn dispatch_width_is_divided_by_policy(#[case] kind: StageKind, #[case] expected: [u64; 2]) {
    let mut config = narrow_config(2);
    config.general.threads = 2;
    config.pipeline.dispatch_kind = kind;
    let trace = TraceBuilder::default().independent_adds(4).build();
    let mut ctx = TestContext::with_config(config)
        .load(0, 0, trace.clone())
        .load(0, 1, trace);

    ctx.step(2);
    assert_eq!([dispatched(&ctx, 0), dispatched(&ctx, 1)], expected);
}
