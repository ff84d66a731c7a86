//! Out-of-order superscalar pipeline timing simulator.
//!
//! This crate models the per-cycle behavior of a multi-core, multi-threaded
//! out-of-order processor driven by a trace of decoded micro-operations:
//! 1. **Core:** Fetch, dispatch (rename), issue, writeback and commit stages over a
//!    reorder buffer, issue/load/store queues and a physical register file.
//! 2. **Units:** Functional unit pool with per-class latencies and a branch predictor
//!    (direction predictor, BTB, RAS) with misprediction recovery.
//! 3. **SoC:** The memory-system interface and a fixed-latency implementation.
//! 4. **Simulation:** Configuration, trace loading, the run loop and statistics.
//!
//! # Examples
//!
//! ```
//! use o3sim_core::core::uop::{DecodedUop, UopKind};
//! use o3sim_core::{Config, Simulator};
//!
//! let mut sim = Simulator::new(Config::default()).unwrap();
//! let trace = (0..8)
//!     .map(|n| DecodedUop::new(UopKind::Arithmetic, 0x1000 + n * 4, 4))
//!     .collect();
//! sim.load_trace(0, 0, trace).unwrap();
//! sim.run(1_000).unwrap();
//! assert_eq!(sim.stats().committed, 8);
//! ```

/// Common types and constants (register names, errors, cycle type).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Processor model (uops, pipeline, units, cpu hierarchy).
pub mod core;
/// Simulation driver and trace loading.
pub mod sim;
/// Memory system interface and fixed-latency model.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Processor type; holds every core and thread.
pub use crate::core::Cpu;
/// Simulation driver owning a processor and its memory system.
pub use crate::sim::Simulator;
