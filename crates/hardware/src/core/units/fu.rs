//! Functional Unit Pool.
//!
//! Each core owns one pool holding a reservation table per functional unit class.
//! A reservation scans the class's parallel units for one whose busy-until cycle has
//! passed, occupies it for `issue_lat` cycles and reports `op_lat` as the latency
//! of the result. A class with every unit busy denies the request; the caller
//! retries on a later cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::Cycle;
use crate::config::FunctionalUnitsConfig;

/// Functional unit class required by a uop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FuClass {
    /// Integer addition.
    IntAdd,
    /// Integer subtraction.
    IntSub,
    /// Integer multiplication.
    IntMult,
    /// Integer division.
    IntDiv,
    /// Effective address computation.
    EffAddr,
    /// Bitwise logic.
    Logical,
    /// Simple floating-point operations (moves, sign manipulation).
    FpSimple,
    /// Floating-point addition.
    FpAdd,
    /// Floating-point comparison.
    FpComp,
    /// Floating-point multiplication.
    FpMult,
    /// Floating-point division.
    FpDiv,
    /// Complex floating-point operations (square root, transcendental).
    FpComplex,
}

impl FuClass {
    /// Number of functional unit classes.
    pub const COUNT: usize = 12;

    /// All classes in reservation table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::IntAdd,
        Self::IntSub,
        Self::IntMult,
        Self::IntDiv,
        Self::EffAddr,
        Self::Logical,
        Self::FpSimple,
        Self::FpAdd,
        Self::FpComp,
        Self::FpMult,
        Self::FpDiv,
        Self::FpComplex,
    ];

    /// Position of this class in the reservation table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name used in reports and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IntAdd => "IntAdd",
            Self::IntSub => "IntSub",
            Self::IntMult => "IntMult",
            Self::IntDiv => "IntDiv",
            Self::EffAddr => "EffAddr",
            Self::Logical => "Logical",
            Self::FpSimple => "FpSimple",
            Self::FpAdd => "FpAdd",
            Self::FpComp => "FpComp",
            Self::FpMult => "FpMult",
            Self::FpDiv => "FpDiv",
            Self::FpComplex => "FpComplex",
        }
    }
}

impl fmt::Display for FuClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every unit of the requested class is busy this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Denied;

impl fmt::Display for Denied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("functional unit denied")
    }
}

/// Per-class reservation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FuStats {
    /// Granted reservations.
    pub accesses: u64,
    /// Denied reservations.
    pub denied: u64,
    /// Cycles granted uops spent between their first attempt and the grant.
    pub waiting_time: u64,
}

/// Reservation table row for one class.
#[derive(Clone, Debug)]
struct Reservation {
    op_lat: u64,
    issue_lat: u64,
    cycle_when_free: Vec<Cycle>,
}

/// Functional unit pool of a core.
#[derive(Clone, Debug)]
pub struct FuPool {
    table: Vec<Reservation>,
    stats: [FuStats; FuClass::COUNT],
}

impl FuPool {
    /// Builds the reservation table from a validated configuration.
    pub fn new(config: &FunctionalUnitsConfig) -> Self {
        let table = FuClass::ALL
            .iter()
            .map(|&class| {
                let unit = config.unit(class);
                Reservation {
                    op_lat: unit.op_lat,
                    issue_lat: unit.issue_lat,
                    cycle_when_free: vec![0; unit.count],
                }
            })
            .collect();
        Self {
            table,
            stats: [FuStats::default(); FuClass::COUNT],
        }
    }

    /// Reserves a unit of `class` at cycle `now`.
    ///
    /// `first_try` is the cycle the uop first asked for a unit and feeds the
    /// waiting-time statistic. On success the unit stays busy until
    /// `now + issue_lat` and the returned value is `op_lat`.
    ///
    /// # Errors
    ///
    /// Returns [`Denied`] when every unit of the class is busy at `now`.
    pub fn reserve(&mut self, class: FuClass, first_try: Cycle, now: Cycle) -> Result<u64, Denied> {
        let row = &mut self.table[class.index()];
        let stats = &mut self.stats[class.index()];
        let Some(free) = row.cycle_when_free.iter_mut().find(|free| **free <= now) else {
            stats.denied += 1;
            return Err(Denied);
        };
        *free = now + row.issue_lat;
        stats.accesses += 1;
        stats.waiting_time += now.saturating_sub(first_try);
        Ok(row.op_lat)
    }

    /// Frees every unit of every class.
    pub fn release_all(&mut self) {
        for row in &mut self.table {
            row.cycle_when_free.fill(0);
        }
    }

    /// Returns the reservation counters of `class`.
    pub const fn stats(&self, class: FuClass) -> &FuStats {
        &self.stats[class.index()]
    }

    /// Returns the reservation counters of every class in table order.
    pub const fn all_stats(&self) -> &[FuStats; FuClass::COUNT] {
        &self.stats
    }
}
