//! Front End Tests.
//!
//! Verifies correct-path trace order, wrong-path uop synthesis after a
//! misprediction, fetch stalls and the squash of speculative fetch queue entries.

use o3sim_core::core::pipeline::frontend::Frontend;
use o3sim_core::core::units::bru::PredictionSnapshot;
use o3sim_core::core::uop::{DecodedUop, Structure, Uop, UopId, UopKind, UopPool};
use pretty_assertions::assert_eq;

fn trace(count: u64) -> Vec<DecodedUop> {
    (0..count)
        .map(|n| DecodedUop::new(UopKind::Arithmetic, 0x1000 + 4 * n, 4))
        .collect()
}

#[test]
fn correct_path_uops_come_out_in_trace_order() {
    let mut fe = Frontend::new(8);
    fe.load(trace(3));
    let eips: Vec<(u64, bool)> = std::iter::from_fn(|| fe.next_decoded())
        .map(|(uop, spec)| (uop.eip, spec))
        .collect();
    assert_eq!(eips, vec![(0x1000, false), (0x1004, false), (0x1008, false)]);
    assert_eq!(fe.trace_len(), 0);
}

#[test]
fn wrong_path_synthesizes_sequential_nops_and_keeps_the_trace() {
    let mut fe = Frontend::new(8);
    fe.load(trace(2));
    let snapshot = PredictionSnapshot {
        bhr: 5,
        ras_idx: 2,
        ..PredictionSnapshot::default()
    };
    fe.enter_specmode(UopId(1), 0x4000, snapshot);
    assert!(fe.in_specmode());

    let (first, spec) = fe.next_decoded().unwrap();
    assert!(spec);
    assert_eq!((first.kind, first.eip), (UopKind::Nop, 0x4000));
    let (second, _) = fe.next_decoded().unwrap();
    assert_eq!(second.eip, 0x4004);
    assert_eq!(fe.trace_len(), 2);

    let path = fe.leave_specmode().unwrap();
    assert_eq!(path.branch, UopId(1));
    assert_eq!(path.snapshot, snapshot);
    assert_eq!(fe.next_decoded().map(|(u, s)| (u.eip, s)), Some((0x1000, false)));
}

#[test]
fn stall_keeps_the_latest_deadline() {
    let mut fe = Frontend::new(1);
    fe.stall(10);
    fe.stall(7);
    assert!(fe.is_stalled(9));
    assert!(!fe.is_stalled(10));
}

#[test]
fn recover_removes_only_speculative_queue_entries() {
    let mut pool = UopPool::new();
    let mut fe = Frontend::new(4);
    for n in 1..=4 {
        let mut uop = Uop::from_decoded(UopId(n), 0, 0, &DecodedUop::new(UopKind::Nop, 0, 4));
        uop.specmode = n > 2;
        fe.push(pool.insert(uop, Structure::FetchQueue));
    }
    assert!(fe.is_full());

    assert_eq!(fe.recover(&pool), vec![UopId(3), UopId(4)]);
    assert_eq!(fe.queue().collect::<Vec<_>>(), vec![UopId(1), UopId(2)]);
    assert_eq!(fe.head(), Some(UopId(1)));
}
