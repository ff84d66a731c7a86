//! Simulation statistics collection and reporting.
//!
//! Counters live next to the structures that produce them: [`ThreadStats`] in each
//! hardware thread, [`CoreStats`] and the functional unit counters in each core.
//! [`SimStats::collect`] takes a snapshot of all of them. The snapshot provides:
//! 1. **Summary:** Cycles, committed uops and IPC.
//! 2. **Uop Mix:** Dispatched, issued and committed counts per uop kind.
//! 3. **Dispatch:** Slots used, spent on the wrong path, or lost per stall reason.
//! 4. **Branch Prediction:** Committed control uops, mispredictions and recoveries.
//! 5. **Functional Units:** Accesses, denials and waiting time per class.
//! 6. **Occupancy:** Average structure occupancy, when sampling is enabled.

use std::time::Instant;

use serde::Serialize;

use crate::core::Cpu;
use crate::core::pipeline::stages::DispatchStall;
use crate::core::units::fu::{FuClass, FuStats};
use crate::core::uop::UopKind;

/// Counters of one hardware thread.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThreadStats {
    /// Uops that entered the fetch queue, including the wrong path.
    pub fetched: u64,
    /// Uops dispatched, per kind.
    pub dispatched: [u64; UopKind::COUNT],
    /// Uops issued to a functional unit or the memory system, per kind.
    pub issued: [u64; UopKind::COUNT],
    /// Uops committed, per kind.
    pub committed: [u64; UopKind::COUNT],
    /// Wrong-path uops removed by recovery.
    pub squashed: u64,
    /// Committed control uops.
    pub branches: u64,
    /// Committed control uops whose prediction was wrong.
    pub mispredictions: u64,
    /// Recoveries performed.
    pub recoveries: u64,
}

impl ThreadStats {
    /// Committed uops of every kind.
    pub fn committed_total(&self) -> u64 {
        self.committed.iter().sum()
    }
}

/// Running occupancy sums, one sample per cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    /// Cycles sampled.
    pub samples: u64,
    /// Sum of fetch queue lengths.
    pub fetch_queue: u64,
    /// Sum of ROB lengths.
    pub rob: u64,
    /// Sum of issue queue lengths.
    pub iq: u64,
    /// Sum of load queue lengths.
    pub lq: u64,
    /// Sum of store queue lengths.
    pub sq: u64,
}

impl Occupancy {
    /// Average of `sum` over the samples taken.
    pub fn average(&self, sum: u64) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            sum as f64 / self.samples as f64
        }
    }
}

/// Counters of one core.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CoreStats {
    /// Dispatch slots per outcome, indexed by [`DispatchStall::index`].
    pub dispatch_stalls: [u64; DispatchStall::COUNT],
    /// Structure occupancy sums.
    pub occupancy: Occupancy,
}

impl CoreStats {
    /// Dispatch slots counted for `reason`.
    #[inline]
    pub const fn dispatch_stall(&self, reason: DispatchStall) -> u64 {
        self.dispatch_stalls[reason.index()]
    }
}

/// Functional unit counters of one class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FuReport {
    /// Unit class.
    pub class: FuClass,
    /// Reservation counters.
    #[serde(flatten)]
    pub stats: FuStats,
}

/// Snapshot of one core.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoreReport {
    /// Core counters.
    #[serde(flatten)]
    pub stats: CoreStats,
    /// Functional unit counters in table order.
    pub functional_units: Vec<FuReport>,
    /// Per-thread counters.
    pub threads: Vec<ThreadStats>,
}

/// Simulation statistics snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Option<Instant>,
    /// Total simulated cycles.
    pub cycles: u64,
    /// Committed uops over every thread.
    pub committed: u64,
    /// Per-core snapshots.
    pub cores: Vec<CoreReport>,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"uops"`, `"dispatch"`, `"branch"`,
/// `"fu"`, `"occupancy"`. Pass an empty slice to `print_sections` to print all
/// sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "uops", "dispatch", "branch", "fu", "occupancy"];

impl SimStats {
    /// Takes a snapshot of every counter of `cpu`.
    pub fn collect(cpu: &Cpu) -> Self {
        let cores: Vec<CoreReport> = cpu
            .cores()
            .iter()
            .map(|core| CoreReport {
                stats: core.stats.clone(),
                functional_units: FuClass::ALL
                    .iter()
                    .map(|&class| FuReport {
                        class,
                        stats: *core.fu.stats(class),
                    })
                    .collect(),
                threads: core.threads.iter().map(|t| t.stats.clone()).collect(),
            })
            .collect();
        let committed = cores
            .iter()
            .flat_map(|c| &c.threads)
            .map(ThreadStats::committed_total)
            .sum();
        Self {
            start_time: None,
            cycles: cpu.cycle(),
            committed,
            cores,
        }
    }

    /// Records the wall-clock start used for the host-speed line of the summary.
    #[must_use]
    pub const fn with_start_time(mut self, start: Instant) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Committed uops per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.committed as f64 / self.cycles as f64
        }
    }

    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; the snapshot itself always serializes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn threads(&self) -> impl Iterator<Item = &ThreadStats> {
        self.cores.iter().flat_map(|c| &c.threads)
    }

    fn sum_kind(&self, field: impl Fn(&ThreadStats) -> &[u64; UopKind::COUNT], kind: UopKind) -> u64 {
        self.threads().map(|t| field(t)[kind.index()]).sum()
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        if want("summary") {
            println!("\n==========================================================");
            println!("PIPELINE SIMULATION STATISTICS");
            println!("==========================================================");
            if let Some(start) = self.start_time {
                let seconds = start.elapsed().as_secs_f64();
                println!("host_seconds             {seconds:.4} s");
                println!("sim_freq                 {:.2} kHz", self.cycles as f64 / seconds / 1000.0);
            }
            println!("sim_cycles               {}", self.cycles);
            println!("sim_committed            {}", self.committed);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("----------------------------------------------------------");
        }
        if want("uops") {
            println!("UOP MIX                  dispatched     issued  committed");
            for kind in UopKind::ALL {
                println!(
                    "  {:<22} {:>10} {:>10} {:>10}",
                    kind.name(),
                    self.sum_kind(|t| &t.dispatched, kind),
                    self.sum_kind(|t| &t.issued, kind),
                    self.sum_kind(|t| &t.committed, kind),
                );
            }
            println!("----------------------------------------------------------");
        }
        if want("dispatch") {
            println!("DISPATCH SLOTS");
            for (c, core) in self.cores.iter().enumerate() {
                let total: u64 = core.stats.dispatch_stalls.iter().sum::<u64>().max(1);
                for reason in DispatchStall::ALL {
                    let n = core.stats.dispatch_stall(reason);
                    println!(
                        "  c{c}.{:<19} {n} ({:.2}%)",
                        reason.name(),
                        n as f64 / total as f64 * 100.0
                    );
                }
            }
            println!("----------------------------------------------------------");
        }
        if want("branch") {
            let branches: u64 = self.threads().map(|t| t.branches).sum();
            let miss: u64 = self.threads().map(|t| t.mispredictions).sum();
            let acc = if branches > 0 {
                100.0 * (1.0 - miss as f64 / branches as f64)
            } else {
                0.0
            };
            println!("BRANCH PREDICTION");
            println!("  bp.branches            {branches}");
            println!("  bp.mispredicts         {miss}");
            println!("  bp.accuracy            {acc:.2}%");
            println!("  bp.recoveries          {}", self.threads().map(|t| t.recoveries).sum::<u64>());
            println!("  bp.squashed            {}", self.threads().map(|t| t.squashed).sum::<u64>());
            println!("----------------------------------------------------------");
        }
        if want("fu") {
            println!("FUNCTIONAL UNITS");
            for (c, core) in self.cores.iter().enumerate() {
                for fu in core.functional_units.iter().filter(|fu| fu.stats.accesses + fu.stats.denied > 0) {
                    let wait = fu.stats.waiting_time as f64 / fu.stats.accesses.max(1) as f64;
                    println!(
                        "  c{c}.{:<10} accesses: {:<10} | denied: {:<10} | avg_wait: {wait:.2}",
                        fu.class.name(),
                        fu.stats.accesses,
                        fu.stats.denied,
                    );
                }
            }
            println!("----------------------------------------------------------");
        }
        if want("occupancy") {
            println!("OCCUPANCY (average per cycle)");
            for (c, core) in self.cores.iter().enumerate() {
                let occ = &core.stats.occupancy;
                if occ.samples == 0 {
                    println!("  c{c}  not sampled");
                    continue;
                }
                println!(
                    "  c{c}  fetchq {:.2} | rob {:.2} | iq {:.2} | lq {:.2} | sq {:.2}",
                    occ.average(occ.fetch_queue),
                    occ.average(occ.rob),
                    occ.average(occ.iq),
                    occ.average(occ.lq),
                    occ.average(occ.sq),
                );
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
