//! Statistics Tests.

use o3sim_core::core::pipeline::stages::DispatchStall;
use o3sim_core::stats::{Occupancy, STATS_SECTIONS};
use pretty_assertions::assert_eq;

use crate::common::builder::TraceBuilder;
use crate::common::harness::TestContext;

fn finished_run() -> TestContext {
    let trace = TraceBuilder::default()
        .independent_adds(4)
        .branch(0x2000)
        .nop()
        .build();
    let mut ctx = TestContext::new().load(0, 0, trace);
    let _ = ctx.run_to_completion(200);
    ctx
}

#[test]
fn snapshot_totals_match_thread_counters() {
    let ctx = finished_run();
    let stats = ctx.stats();
    let thread = &stats.cores[0].threads[0];

    assert_eq!(stats.committed, 6);
    assert_eq!(thread.committed_total(), 6);
    assert_eq!(thread.branches, 1);
    assert_eq!(thread.mispredictions, 1);
    assert!(thread.fetched >= 6);
    assert_eq!(stats.cores[0].functional_units.len(), 12);
    assert!((stats.ipc() - 6.0 / stats.cycles as f64).abs() < f64::EPSILON);
}

#[test]
fn json_export_flattens_core_counters() {
    let json = finished_run().stats().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["committed"], 6);
    let core = &value["cores"][0];
    assert_eq!(
        core["dispatch_stalls"].as_array().map(Vec::len),
        Some(DispatchStall::COUNT)
    );
    assert_eq!(core["functional_units"][0]["class"], "IntAdd");
    assert!(core["functional_units"][0]["accesses"].as_u64().is_some_and(|n| n >= 4));
    assert!(value.get("start_time").is_none());
}

#[test]
fn occupancy_average_handles_no_samples() {
    let occ = Occupancy::default();
    assert!(occ.average(10).abs() < f64::EPSILON);
    let occ = Occupancy {
        samples: 4,
        ..Occupancy::default()
    };
    assert!((occ.average(10) - 2.5).abs() < f64::EPSILON);
}

#[test]
fn every_section_prints() {
    let stats = finished_run().stats();
    for section in STATS_SECTIONS {
        stats.print_sections(&[(*section).to_string()]);
    }
    stats.print();
}
