//! Configuration and Simulation Error definitions.
//!
//! This module defines the fatal error paths of the simulator. It provides:
//! 1. **Configuration Errors:** Malformed or zero-sized resource pools rejected before
//!    the first cycle runs.
//! 2. **Simulation Errors:** Conditions that must stop a running simulation, such as
//!    the forward-progress watchdog.
//!
//! Ordinary "cannot proceed this cycle" conditions are not errors; they are
//! reported through stall enums and counters and retried on the next cycle.

use std::io;

use thiserror::Error;

use crate::common::reg::RegClass;
use crate::core::units::fu::FuClass;

/// Errors raised while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A structure size or width that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroSized {
        /// Configuration key that was zero.
        name: &'static str,
    },

    /// The branch target buffer would have no entries.
    #[error("branch target buffer must have at least one entry (sets = {sets}, assoc = {assoc})")]
    EmptyBtb {
        /// Configured number of BTB sets.
        sets: usize,
        /// Configured BTB associativity.
        assoc: usize,
    },

    /// The branch history register is wider than supported.
    #[error("branch history size {size} exceeds the maximum of {max} bits")]
    HistoryTooLong {
        /// Configured history size in bits.
        size: u32,
        /// Largest supported history size.
        max: u32,
    },

    /// A functional unit class has no units or more than the model supports.
    #[error("functional unit {class}: count {count} must be between 1 and {max}")]
    FuCount {
        /// Offending class.
        class: FuClass,
        /// Configured unit count.
        count: usize,
        /// Largest supported unit count.
        max: usize,
    },

    /// A functional unit class has a zero operation or issue latency.
    #[error("functional unit {class}: op_lat and issue_lat must be greater than zero")]
    FuLatency {
        /// Offending class.
        class: FuClass,
    },

    /// A physical register pool cannot hold the architectural state plus one uop.
    #[error("{class} register file must have at least {min} entries, got {size}")]
    RegisterFileTooSmall {
        /// Register class of the pool.
        class: RegClass,
        /// Configured pool size.
        size: usize,
        /// Minimum pool size.
        min: usize,
    },

    /// A physical register pool has more entries than a register index can name.
    #[error("{class} register file of {size} entries exceeds {max} physical registers")]
    RegisterFileTooLarge {
        /// Register class of the pool.
        class: RegClass,
        /// Configured pool size, per thread.
        size: usize,
        /// Largest pool, summed over threads for a shared file.
        max: usize,
    },

    /// The configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] io::Error),
}

/// Fatal conditions that stop a running simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A running hardware thread went too long without committing.
    #[error(
        "c{core}t{thread}: simulation ended due to commit stall \
         (no commit since cycle {last_commit}, now cycle {cycle})"
    )]
    CommitStall {
        /// Core index.
        core: usize,
        /// Hardware thread index within the core.
        thread: usize,
        /// Cycle of the last commit or non-running observation.
        last_commit: u64,
        /// Cycle at which the watchdog fired.
        cycle: u64,
    },

    /// A trace could not be loaded or contains a malformed uop.
    #[error("trace error: {0}")]
    Trace(String),

    /// A core or thread index outside the configured topology.
    #[error("no hardware thread c{core}t{thread} in this configuration")]
    NoSuchThread {
        /// Requested core index.
        core: usize,
        /// Requested thread index.
        thread: usize,
    },

    /// The simulator was built from an invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
