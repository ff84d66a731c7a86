//! Functional Unit Pool Tests.
//!
//! Verifies reservation latencies, per-class unit counts, denial accounting and
//! the commit-time release of every unit.

use o3sim_core::config::{FuUnitConfig, FunctionalUnitsConfig};
use o3sim_core::core::units::fu::{Denied, FuClass, FuPool};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn pool_with(class: FuClass, unit: FuUnitConfig) -> FuPool {
    let mut config = FunctionalUnitsConfig::default();
    *config.unit_mut(class) = unit;
    FuPool::new(&config)
}

#[rstest]
#[case(FuClass::IntAdd)]
#[case(FuClass::IntMult)]
#[case(FuClass::IntDiv)]
#[case(FuClass::FpDiv)]
#[case(FuClass::FpComplex)]
fn grant_returns_configured_op_latency(#[case] class: FuClass) {
    let config = FunctionalUnitsConfig::default();
    let mut fu = FuPool::new(&config);
    assert_eq!(fu.reserve(class, 0, 0), Ok(config.unit(class).op_lat));
}

#[test]
fn every_unit_of_a_class_can_be_reserved_in_one_cycle() {
    let mut fu = pool_with(FuClass::IntAdd, FuUnitConfig::new(3, 1, 2));
    for _ in 0..3 {
        assert_eq!(fu.reserve(FuClass::IntAdd, 5, 5), Ok(1));
    }
    assert_eq!(fu.reserve(FuClass::IntAdd, 5, 5), Err(Denied));
    assert_eq!(fu.reserve(FuClass::IntAdd, 5, 6), Err(Denied));
    assert_eq!(fu.reserve(FuClass::IntAdd, 5, 7), Ok(1));
}

#[test]
fn pipelined_unit_accepts_a_new_uop_before_the_result() {
    // A 4-cycle multiplier that accepts one uop per cycle.
    let mut fu = pool_with(FuClass::IntMult, FuUnitConfig::new(1, 4, 1));
    assert_eq!(fu.reserve(FuClass::IntMult, 0, 0), Ok(4));
    assert_eq!(fu.reserve(FuClass::IntMult, 1, 1), Ok(4));
}

#[test]
fn classes_do_not_share_units() {
    let mut fu = pool_with(FuClass::IntDiv, FuUnitConfig::new(1, 20, 20));
    assert!(fu.reserve(FuClass::IntDiv, 0, 0).is_ok());
    assert!(fu.reserve(FuClass::IntDiv, 0, 0).is_err());
    assert!(fu.reserve(FuClass::IntAdd, 0, 0).is_ok());
}

#[test]
fn denied_reservations_count_and_waiting_time_accumulates() {
    let mut fu = pool_with(FuClass::FpDiv, FuUnitConfig::new(1, 10, 10));
    assert!(fu.reserve(FuClass::FpDiv, 0, 0).is_ok());
    for now in 1..10 {
        assert!(fu.reserve(FuClass::FpDiv, 1, now).is_err());
    }
    assert!(fu.reserve(FuClass::FpDiv, 1, 10).is_ok());

    let stats = fu.stats(FuClass::FpDiv);
    assert_eq!(stats.accesses, 2);
    assert_eq!(stats.denied, 9);
    assert_eq!(stats.waiting_time, 9);
    assert_eq!(fu.all_stats()[FuClass::FpDiv.index()], *stats);
}

#[test]
fn release_all_makes_every_class_available() {
    let mut fu = FuPool::new(&FunctionalUnitsConfig::default());
    for class in FuClass::ALL {
        while fu.reserve(class, 0, 0).is_ok() {}
    }
    fu.release_all();
    for class in FuClass::ALL {
        assert!(fu.reserve(class, 0, 0).is_ok(), "{class} still busy");
    }
}

proptest! {
    #[test]
    fn at_most_count_grants_per_issue_window(
        count in 1usize..=10,
        issue_lat in 1u64..8,
        attempts in 1usize..40,
    ) {
        let mut fu = pool_with(FuClass::Logical, FuUnitConfig::new(count, 1, issue_lat));
        let granted = (0..attempts)
            .filter(|_| fu.reserve(FuClass::Logical, 0, 0).is_ok())
            .count();
        prop_assert_eq!(granted, attempts.min(count));
        prop_assert!(fu.reserve(FuClass::Logical, 0, issue_lat).is_ok());
    }
}
