//! Trace Loading Tests.

use std::io::Write;

use o3sim_core::common::{LogicalReg, SimError};
use o3sim_core::core::units::fu::FuClass;
use o3sim_core::core::uop::UopKind;
use o3sim_core::sim::{load_trace, parse_trace};
use pretty_assertions::assert_eq;

use crate::common::harness::TestContext;

const TRACE: &str = r#"[
    { "kind": "Arithmetic", "fu_class": "IntMult", "eip": 4096, "size": 4,
      "inputs": [{ "Int": 1 }, { "Int": 2 }], "outputs": [{ "Int": 3 }] },
    { "kind": "Store", "eip": 4100, "size": 4, "inputs": [{ "Int": 3 }], "mem_addr": 512 },
    { "kind": "Branch", "eip": 4104, "size": 2, "neip": 4096 }
]"#;

#[test]
fn file_trace_runs_to_completion() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TRACE.as_bytes()).unwrap();
    let trace = load_trace(file.path()).unwrap();

    assert_eq!(trace[0].fu_class, Some(FuClass::IntMult));
    assert_eq!(trace[0].outputs, vec![LogicalReg::Int(3)]);
    assert_eq!(trace[1].neip, 4104);
    assert_eq!(trace[2].kind, UopKind::Branch);

    let mut ctx = TestContext::new().load(0, 0, trace);
    ctx.run_to_completion(200);
    assert_eq!(ctx.stats().committed, 3);
}

#[test]
fn missing_file_is_a_trace_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_trace(dir.path().join("none.json")).unwrap_err();
    assert!(matches!(err, SimError::Trace(ref msg) if msg.contains("cannot read")));
}

#[test]
fn rejects_unknown_kinds_and_registers() {
    assert!(parse_trace(r#"[{ "kind": "Teleport", "eip": 0, "size": 4 }]"#).is_err());
    assert!(parse_trace(r#"{ "kind": "Nop", "eip": 0, "size": 4 }"#).is_err());
    let err = parse_trace(r#"[{ "kind": "Nop", "eip": 0, "size": 4, "outputs": [{ "Vector": 99 }] }]"#).unwrap_err();
    assert!(err.to_string().contains("v99"));
}

#[test]
fn rejects_uop_running_past_the_address_space() {
    let err = parse_trace(r#"[{ "kind": "Arithmetic", "eip": 18446744073709551614, "size": 4 }]"#).unwrap_err();
    assert!(matches!(err, SimError::Trace(ref msg) if msg.contains("uop 0") && msg.contains("overflows")));
}

#[test]
fn jump_to_address_zero_is_not_treated_as_fallthrough() {
    let trace = parse_trace(
        r#"[
            { "kind": "Jump", "eip": 4096, "size": 4, "neip": 0 },
            { "kind": "Nop", "eip": 0, "size": 4 }
        ]"#,
    )
    .unwrap();
    assert_eq!(trace[0].neip, 0);
    assert_eq!(trace[1].neip, 4);
}
