//! Configuration system for the pipeline simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline pipeline widths, queue capacities, functional unit latencies
//!    and predictor geometry.
//! 2. **Structures:** Hierarchical config for general, pipeline, queue, functional unit,
//!    branch predictor and memory settings.
//! 3. **Enums:** Scheduling kinds, queue sharing kinds, recovery point and predictor kind.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`) or
//! built from `Config::default()`. Every constructor that accepts a `Config` runs
//! [`Config::validate`] first, so zero-sized structures never reach the pipeline.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::common::constants::{FU_RES_MAX, MAX_HISTORY_BITS, MAX_PHYS_REGS, ODEP_COUNT};
use crate::common::error::ConfigError;
use crate::common::reg::RegClass;
use crate::core::units::fu::FuClass;

/// Default configuration constants for the simulator.
mod defaults {
    /// Number of cores.
    pub const CORES: usize = 1;

    /// Hardware threads per core.
    pub const THREADS: usize = 1;

    /// Cycles without a commit before the watchdog stops the simulation.
    pub const COMMIT_STALL_THRESHOLD: u64 = 1_000_000;

    /// Uops entering the fetch queue per thread per cycle.
    pub const FETCH_WIDTH: usize = 4;

    /// Uops dispatched per core per cycle.
    pub const DISPATCH_WIDTH: usize = 4;

    /// Uops issued per core per cycle.
    pub const ISSUE_WIDTH: usize = 4;

    /// Uops committed per core per cycle.
    pub const COMMIT_WIDTH: usize = 4;

    /// Fetch queue capacity in uops.
    pub const FETCH_QUEUE_SIZE: usize = 32;

    /// Reorder buffer capacity per thread.
    pub const ROB_SIZE: usize = 64;

    /// Issue queue capacity per thread.
    pub const IQ_SIZE: usize = 40;

    /// Load queue capacity per thread.
    pub const LQ_SIZE: usize = 20;

    /// Store queue capacity per thread.
    pub const SQ_SIZE: usize = 20;

    /// Integer physical registers per thread.
    pub const RF_INT_SIZE: usize = 80;

    /// Floating-point physical registers per thread.
    pub const RF_FP_SIZE: usize = 40;

    /// Flag physical registers per thread.
    pub const RF_FLAG_SIZE: usize = 16;

    /// Vector physical registers per thread.
    pub const RF_VECTOR_SIZE: usize = 40;

    /// BTB sets.
    pub const BTB_SETS: usize = 256;

    /// BTB associativity.
    pub const BTB_ASSOC: usize = 4;

    /// Bimodal counter table size.
    pub const BIMOD_SIZE: usize = 1024;

    /// Combined predictor choice table size.
    pub const CHOICE_SIZE: usize = 1024;

    /// Return address stack entries.
    pub const RAS_SIZE: usize = 32;

    /// Branch history register width in bits.
    pub const HISTORY_SIZE: u32 = 8;

    /// Instruction fetch latency in cycles.
    pub const FETCH_LATENCY: u64 = 1;

    /// Load latency in cycles.
    pub const LOAD_LATENCY: u64 = 3;

    /// Store latency in cycles.
    pub const STORE_LATENCY: u64 = 3;
}

/// Point in the pipeline where a mispredicted branch triggers recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RecoverKind {
    /// Recover as soon as the branch writes back its result.
    #[default]
    Writeback,
    /// Recover when the branch reaches the ROB head and commits.
    Commit,
}

/// Thread scheduling shape for a bandwidth-limited stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StageKind {
    /// Round-robin one uop at a time across threads.
    Shared,
    /// Give one thread the whole bandwidth of the cycle.
    #[default]
    #[serde(alias = "TimeSlice")]
    Timeslice,
}

/// Capacity sharing of a per-thread structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QueueKind {
    /// Each thread owns `size` entries.
    #[default]
    Private,
    /// Threads of a core share `size * threads` entries.
    Shared,
}

/// Branch direction predictor algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PredictorKind {
    /// Oracle predictor: the predicted target is always the resolved one.
    Perfect,
    /// Always predicts taken.
    Taken,
    /// Always predicts not taken.
    NotTaken,
    /// Two-bit counters indexed by the branch address.
    Bimodal,
    /// Two-bit counters indexed by the branch history register.
    #[default]
    TwoLevel,
    /// A choice table selecting between bimodal and two-level predictions.
    Combined,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use o3sim_core::config::{Config, PredictorKind, StageKind};
///
/// let json = r#"{
///     "general": { "threads": 2 },
///     "pipeline": { "dispatch_kind": "Shared", "dispatch_width": 2 },
///     "branch_predictor": { "kind": "Bimodal", "bimod_size": 64 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.general.threads, 2);
/// assert_eq!(config.pipeline.dispatch_kind, StageKind::Shared);
/// assert_eq!(config.branch_predictor.kind, PredictorKind::Bimodal);
/// assert_eq!(config.queues.rob_size, 64);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Topology, recovery and watchdog settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Stage widths and scheduling kinds
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Queue capacities and sharing kinds
    #[serde(default)]
    pub queues: QueuesConfig,
    /// Functional unit reservation table
    #[serde(default)]
    pub functional_units: FunctionalUnitsConfig,
    /// Branch predictor geometry
    #[serde(default)]
    pub branch_predictor: BranchPredictorConfig,
    /// Latencies of the fixed-latency memory system
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a JSON configuration and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first validation
    /// failure reported by [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the same
    /// errors as [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Rejects configurations that would build zero-sized or malformed structures.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking sections in declaration order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general.validate()?;
        self.pipeline.validate()?;
        self.queues.validate(self.general.threads)?;
        self.functional_units.validate()?;
        self.branch_predictor.validate()?;
        self.memory.validate()
    }
}

/// Returns `ZeroSized` for `name` when `value` is zero.
fn nonzero<T: Default + PartialEq>(name: &'static str, value: T) -> Result<(), ConfigError> {
    if value == T::default() {
        Err(ConfigError::ZeroSized { name })
    } else {
        Ok(())
    }
}

/// Topology, recovery and watchdog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Number of cores
    #[serde(default = "GeneralConfig::default_cores")]
    pub cores: usize,

    /// Hardware threads per core
    #[serde(default = "GeneralConfig::default_threads")]
    pub threads: usize,

    /// Where mispredictions are detected and recovered
    #[serde(default)]
    pub recover_kind: RecoverKind,

    /// Cycles the front end stalls after a recovery
    #[serde(default)]
    pub recover_penalty: u64,

    /// Cycles a running thread may go without committing
    #[serde(default = "GeneralConfig::default_commit_stall_threshold")]
    pub commit_stall_threshold: u64,
}

impl GeneralConfig {
    /// Returns the default number of cores.
    fn default_cores() -> usize {
        defaults::CORES
    }

    /// Returns the default number of threads per core.
    fn default_threads() -> usize {
        defaults::THREADS
    }

    /// Returns the default watchdog threshold.
    fn default_commit_stall_threshold() -> u64 {
        defaults::COMMIT_STALL_THRESHOLD
    }

    fn validate(&self) -> Result<(), ConfigError> {
        nonzero("general.cores", self.cores)?;
        nonzero("general.threads", self.threads)?;
        nonzero("general.commit_stall_threshold", self.commit_stall_threshold)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cores: defaults::CORES,
            threads: defaults::THREADS,
            recover_kind: RecoverKind::default(),
            recover_penalty: 0,
            commit_stall_threshold: defaults::COMMIT_STALL_THRESHOLD,
        }
    }
}

/// Stage widths and thread scheduling kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Uops fetched per thread per cycle
    #[serde(default = "PipelineConfig::default_fetch_width")]
    pub fetch_width: usize,

    /// Dispatch scheduling across threads
    #[serde(default)]
    pub dispatch_kind: StageKind,

    /// Uops dispatched per core per cycle
    #[serde(default = "PipelineConfig::default_dispatch_width")]
    pub dispatch_width: usize,

    /// Issue scheduling across threads
    #[serde(default)]
    pub issue_kind: StageKind,

    /// Uops issued per core per cycle
    #[serde(default = "PipelineConfig::default_issue_width")]
    pub issue_width: usize,

    /// Commit scheduling across threads
    #[serde(default = "PipelineConfig::default_commit_kind")]
    pub commit_kind: StageKind,

    /// Uops committed per core per cycle
    #[serde(default = "PipelineConfig::default_commit_width")]
    pub commit_width: usize,

    /// Sample structure occupancy every cycle
    #[serde(default)]
    pub occupancy_stats: bool,
}

impl PipelineConfig {
    /// Returns the default fetch width.
    fn default_fetch_width() -> usize {
        defaults::FETCH_WIDTH
    }

    /// Returns the default dispatch width.
    fn default_dispatch_width() -> usize {
        defaults::DISPATCH_WIDTH
    }

    /// Returns the default issue width.
    fn default_issue_width() -> usize {
        defaults::ISSUE_WIDTH
    }

    /// Commit defaults to round-robin across threads.
    fn default_commit_kind() -> StageKind {
        StageKind::Shared
    }

    /// Returns the default commit width.
    fn default_commit_width() -> usize {
        defaults::COMMIT_WIDTH
    }

    fn validate(&self) -> Result<(), ConfigError> {
        nonzero("pipeline.fetch_width", self.fetch_width)?;
        nonzero("pipeline.dispatch_width", self.dispatch_width)?;
        nonzero("pipeline.issue_width", self.issue_width)?;
        nonzero("pipeline.commit_width", self.commit_width)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_width: defaults::FETCH_WIDTH,
            dispatch_kind: StageKind::Timeslice,
            dispatch_width: defaults::DISPATCH_WIDTH,
            issue_kind: StageKind::Timeslice,
            issue_width: defaults::ISSUE_WIDTH,
            commit_kind: StageKind::Shared,
            commit_width: defaults::COMMIT_WIDTH,
            occupancy_stats: false,
        }
    }
}

/// Capacities and sharing kinds of the per-thread queues and register file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuesConfig {
    /// Fetch queue capacity in uops
    #[serde(default = "QueuesConfig::default_fetch_queue_size")]
    pub fetch_queue_size: usize,

    /// Reorder buffer sharing
    #[serde(default)]
    pub rob_kind: QueueKind,

    /// Reorder buffer entries per thread
    #[serde(default = "QueuesConfig::default_rob_size")]
    pub rob_size: usize,

    /// Issue queue sharing
    #[serde(default)]
    pub iq_kind: QueueKind,

    /// Issue queue entries per thread
    #[serde(default = "QueuesConfig::default_iq_size")]
    pub iq_size: usize,

    /// Load and store queue sharing
    #[serde(default)]
    pub lsq_kind: QueueKind,

    /// Load queue entries per thread
    #[serde(default = "QueuesConfig::default_lq_size")]
    pub lq_size: usize,

    /// Store queue entries per thread
    #[serde(default = "QueuesConfig::default_sq_size")]
    pub sq_size: usize,

    /// Physical register file sharing
    #[serde(default)]
    pub rf_kind: QueueKind,

    /// Integer physical registers per thread
    #[serde(default = "QueuesConfig::default_rf_int_size")]
    pub rf_int_size: usize,

    /// Floating-point physical registers per thread
    #[serde(default = "QueuesConfig::default_rf_fp_size")]
    pub rf_fp_size: usize,

    /// Flag physical registers per thread
    #[serde(default = "QueuesConfig::default_rf_flag_size")]
    pub rf_flag_size: usize,

    /// Vector physical registers per thread
    #[serde(default = "QueuesConfig::default_rf_vector_size")]
    pub rf_vector_size: usize,
}

impl QueuesConfig {
    /// Returns the default fetch queue size.
    fn default_fetch_queue_size() -> usize {
        defaults::FETCH_QUEUE_SIZE
    }

    /// Returns the default ROB size.
    fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }

    /// Returns the default IQ size.
    fn default_iq_size() -> usize {
        defaults::IQ_SIZE
    }

    /// Returns the default LQ size.
    fn default_lq_size() -> usize {
        defaults::LQ_SIZE
    }

    /// Returns the default SQ size.
    fn default_sq_size() -> usize {
        defaults::SQ_SIZE
    }

    /// Returns the default integer register file size.
    fn default_rf_int_size() -> usize {
        defaults::RF_INT_SIZE
    }

    /// Returns the default floating-point register file size.
    fn default_rf_fp_size() -> usize {
        defaults::RF_FP_SIZE
    }

    /// Returns the default flag register file size.
    fn default_rf_flag_size() -> usize {
        defaults::RF_FLAG_SIZE
    }

    /// Returns the default vector register file size.
    fn default_rf_vector_size() -> usize {
        defaults::RF_VECTOR_SIZE
    }

    /// Physical register pool size of `class`, per thread.
    pub const fn rf_size(&self, class: RegClass) -> usize {
        match class {
            RegClass::Int => self.rf_int_size,
            RegClass::Fp => self.rf_fp_size,
            RegClass::Flag => self.rf_flag_size,
            RegClass::Vector => self.rf_vector_size,
        }
    }

    fn validate(&self, threads: usize) -> Result<(), ConfigError> {
        nonzero("queues.fetch_queue_size", self.fetch_queue_size)?;
        nonzero("queues.rob_size", self.rob_size)?;
        nonzero("queues.iq_size", self.iq_size)?;
        nonzero("queues.lq_size", self.lq_size)?;
        nonzero("queues.sq_size", self.sq_size)?;

        // Every logical register holds one mapping, and one more uop must be renamable.
        for class in RegClass::ALL {
            let min = class.logical_count() + ODEP_COUNT;
            let size = self.rf_size(class);
            if size < min {
                return Err(ConfigError::RegisterFileTooSmall { class, size, min });
            }
            // A shared file holds every thread's registers in one pool.
            let pooled = match self.rf_kind {
                QueueKind::Private => Some(size),
                QueueKind::Shared => size.checked_mul(threads),
            };
            if pooled.is_none_or(|n| n > MAX_PHYS_REGS) {
                return Err(ConfigError::RegisterFileTooLarge {
                    class,
                    size,
                    max: MAX_PHYS_REGS,
                });
            }
        }
        Ok(())
    }
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            fetch_queue_size: defaults::FETCH_QUEUE_SIZE,
            rob_kind: QueueKind::Private,
            rob_size: defaults::ROB_SIZE,
            iq_kind: QueueKind::Private,
            iq_size: defaults::IQ_SIZE,
            lsq_kind: QueueKind::Private,
            lq_size: defaults::LQ_SIZE,
            sq_size: defaults::SQ_SIZE,
            rf_kind: QueueKind::Private,
            rf_int_size: defaults::RF_INT_SIZE,
            rf_fp_size: defaults::RF_FP_SIZE,
            rf_flag_size: defaults::RF_FLAG_SIZE,
            rf_vector_size: defaults::RF_VECTOR_SIZE,
        }
    }
}

/// Reservation parameters of one functional unit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuUnitConfig {
    /// Number of parallel units
    pub count: usize,
    /// Cycles until the result is available
    pub op_lat: u64,
    /// Cycles until the unit accepts another operation
    pub issue_lat: u64,
}

impl FuUnitConfig {
    /// Creates a reservation entry.
    pub const fn new(count: usize, op_lat: u64, issue_lat: u64) -> Self {
        Self {
            count,
            op_lat,
            issue_lat,
        }
    }
}

/// Functional unit reservation table, one entry per [`FuClass`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionalUnitsConfig {
    /// Integer adders
    #[serde(default = "FunctionalUnitsConfig::default_int_add")]
    pub int_add: FuUnitConfig,
    /// Integer subtractors
    #[serde(default = "FunctionalUnitsConfig::default_int_sub")]
    pub int_sub: FuUnitConfig,
    /// Integer multipliers
    #[serde(default = "FunctionalUnitsConfig::default_int_mult")]
    pub int_mult: FuUnitConfig,
    /// Integer dividers
    #[serde(default = "FunctionalUnitsConfig::default_int_div")]
    pub int_div: FuUnitConfig,
    /// Effective address units
    #[serde(default = "FunctionalUnitsConfig::default_eff_addr")]
    pub eff_addr: FuUnitConfig,
    /// Logical units
    #[serde(default = "FunctionalUnitsConfig::default_logical")]
    pub logical: FuUnitConfig,
    /// Simple floating-point units
    #[serde(default = "FunctionalUnitsConfig::default_fp_simple")]
    pub fp_simple: FuUnitConfig,
    /// Floating-point adders
    #[serde(default = "FunctionalUnitsConfig::default_fp_add")]
    pub fp_add: FuUnitConfig,
    /// Floating-point comparators
    #[serde(default = "FunctionalUnitsConfig::default_fp_comp")]
    pub fp_comp: FuUnitConfig,
    /// Floating-point multipliers
    #[serde(default = "FunctionalUnitsConfig::default_fp_mult")]
    pub fp_mult: FuUnitConfig,
    /// Floating-point dividers
    #[serde(default = "FunctionalUnitsConfig::default_fp_div")]
    pub fp_div: FuUnitConfig,
    /// Complex floating-point units
    #[serde(default = "FunctionalUnitsConfig::default_fp_complex")]
    pub fp_complex: FuUnitConfig,
}

impl FunctionalUnitsConfig {
    fn default_int_add() -> FuUnitConfig {
        FuUnitConfig::new(4, 2, 1)
    }

    fn default_int_sub() -> FuUnitConfig {
        FuUnitConfig::new(4, 2, 1)
    }

    fn default_int_mult() -> FuUnitConfig {
        FuUnitConfig::new(1, 3, 3)
    }

    fn default_int_div() -> FuUnitConfig {
        FuUnitConfig::new(1, 20, 20)
    }

    fn default_eff_addr() -> FuUnitConfig {
        FuUnitConfig::new(4, 2, 1)
    }

    fn default_logical() -> FuUnitConfig {
        FuUnitConfig::new(4, 1, 1)
    }

    fn default_fp_simple() -> FuUnitConfig {
        FuUnitConfig::new(2, 2, 2)
    }

    fn default_fp_add() -> FuUnitConfig {
        FuUnitConfig::new(2, 5, 5)
    }

    fn default_fp_comp() -> FuUnitConfig {
        FuUnitConfig::new(2, 5, 5)
    }

    fn default_fp_mult() -> FuUnitConfig {
        FuUnitConfig::new(1, 10, 10)
    }

    fn default_fp_div() -> FuUnitConfig {
        FuUnitConfig::new(1, 20, 20)
    }

    fn default_fp_complex() -> FuUnitConfig {
        FuUnitConfig::new(1, 40, 40)
    }

    /// Returns the reservation parameters of `class`.
    pub const fn unit(&self, class: FuClass) -> FuUnitConfig {
        match class {
            FuClass::IntAdd => self.int_add,
            FuClass::IntSub => self.int_sub,
            FuClass::IntMult => self.int_mult,
            FuClass::IntDiv => self.int_div,
            FuClass::EffAddr => self.eff_addr,
            FuClass::Logical => self.logical,
            FuClass::FpSimple => self.fp_simple,
            FuClass::FpAdd => self.fp_add,
            FuClass::FpComp => self.fp_comp,
            FuClass::FpMult => self.fp_mult,
            FuClass::FpDiv => self.fp_div,
            FuClass::FpComplex => self.fp_complex,
        }
    }

    /// Returns a mutable reference to the reservation parameters of `class`.
    pub fn unit_mut(&mut self, class: FuClass) -> &mut FuUnitConfig {
        match class {
            FuClass::IntAdd => &mut self.int_add,
            FuClass::IntSub => &mut self.int_sub,
            FuClass::IntMult => &mut self.int_mult,
            FuClass::IntDiv => &mut self.int_div,
            FuClass::EffAddr => &mut self.eff_addr,
            FuClass::Logical => &mut self.logical,
            FuClass::FpSimple => &mut self.fp_simple,
            FuClass::FpAdd => &mut self.fp_add,
            FuClass::FpComp => &mut self.fp_comp,
            FuClass::FpMult => &mut self.fp_mult,
            FuClass::FpDiv => &mut self.fp_div,
            FuClass::FpComplex => &mut self.fp_complex,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for class in FuClass::ALL {
            let unit = self.unit(class);
            if unit.count == 0 || unit.count > FU_RES_MAX {
                return Err(ConfigError::FuCount {
                    class,
                    count: unit.count,
                    max: FU_RES_MAX,
                });
            }
            if unit.op_lat == 0 || unit.issue_lat == 0 {
                return Err(ConfigError::FuLatency { class });
            }
        }
        Ok(())
    }
}

impl Default for FunctionalUnitsConfig {
    fn default() -> Self {
        Self {
            int_add: Self::default_int_add(),
            int_sub: Self::default_int_sub(),
            int_mult: Self::default_int_mult(),
            int_div: Self::default_int_div(),
            eff_addr: Self::default_eff_addr(),
            logical: Self::default_logical(),
            fp_simple: Self::default_fp_simple(),
            fp_add: Self::default_fp_add(),
            fp_comp: Self::default_fp_comp(),
            fp_mult: Self::default_fp_mult(),
            fp_div: Self::default_fp_div(),
            fp_complex: Self::default_fp_complex(),
        }
    }
}

/// Branch predictor kind and table geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchPredictorConfig {
    /// Direction predictor algorithm
    #[serde(default)]
    pub kind: PredictorKind,

    /// BTB sets
    #[serde(default = "BranchPredictorConfig::default_btb_sets")]
    pub btb_sets: usize,

    /// BTB associativity
    #[serde(default = "BranchPredictorConfig::default_btb_assoc")]
    pub btb_assoc: usize,

    /// Bimodal counter table entries
    #[serde(default = "BranchPredictorConfig::default_bimod_size")]
    pub bimod_size: usize,

    /// Choice table entries of the combined predictor
    #[serde(default = "BranchPredictorConfig::default_choice_size")]
    pub choice_size: usize,

    /// Return address stack entries
    #[serde(default = "BranchPredictorConfig::default_ras_size")]
    pub ras_size: usize,

    /// Branch history register width in bits
    #[serde(default = "BranchPredictorConfig::default_history_size")]
    pub history_size: u32,
}

impl BranchPredictorConfig {
    /// Returns the default BTB set count.
    fn default_btb_sets() -> usize {
        defaults::BTB_SETS
    }

    /// Returns the default BTB associativity.
    fn default_btb_assoc() -> usize {
        defaults::BTB_ASSOC
    }

    /// Returns the default bimodal table size.
    fn default_bimod_size() -> usize {
        defaults::BIMOD_SIZE
    }

    /// Returns the default choice table size.
    fn default_choice_size() -> usize {
        defaults::CHOICE_SIZE
    }

    /// Returns the default RAS size.
    fn default_ras_size() -> usize {
        defaults::RAS_SIZE
    }

    /// Returns the default history width.
    fn default_history_size() -> u32 {
        defaults::HISTORY_SIZE
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.btb_sets == 0 || self.btb_assoc == 0 {
            return Err(ConfigError::EmptyBtb {
                sets: self.btb_sets,
                assoc: self.btb_assoc,
            });
        }
        nonzero("branch_predictor.bimod_size", self.bimod_size)?;
        nonzero("branch_predictor.choice_size", self.choice_size)?;
        nonzero("branch_predictor.ras_size", self.ras_size)?;
        nonzero("branch_predictor.history_size", self.history_size)?;
        if self.history_size > MAX_HISTORY_BITS {
            return Err(ConfigError::HistoryTooLong {
                size: self.history_size,
                max: MAX_HISTORY_BITS,
            });
        }
        Ok(())
    }
}

impl Default for BranchPredictorConfig {
    fn default() -> Self {
        Self {
            kind: PredictorKind::default(),
            btb_sets: defaults::BTB_SETS,
            btb_assoc: defaults::BTB_ASSOC,
            bimod_size: defaults::BIMOD_SIZE,
            choice_size: defaults::CHOICE_SIZE,
            ras_size: defaults::RAS_SIZE,
            history_size: defaults::HISTORY_SIZE,
        }
    }
}

/// Fixed-latency memory system parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Instruction fetch latency in cycles
    #[serde(default = "MemoryConfig::default_fetch_latency")]
    pub fetch_latency: u64,

    /// Load latency in cycles
    #[serde(default = "MemoryConfig::default_load_latency")]
    pub load_latency: u64,

    /// Store latency in cycles
    #[serde(default = "MemoryConfig::default_store_latency")]
    pub store_latency: u64,

    /// Data accesses accepted per cycle; unlimited when absent
    #[serde(default)]
    pub ports: Option<usize>,
}

impl MemoryConfig {
    /// Returns the default fetch latency.
    fn default_fetch_latency() -> u64 {
        defaults::FETCH_LATENCY
    }

    /// Returns the default load latency.
    fn default_load_latency() -> u64 {
        defaults::LOAD_LATENCY
    }

    /// Returns the default store latency.
    fn default_store_latency() -> u64 {
        defaults::STORE_LATENCY
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ports) = self.ports {
            nonzero("memory.ports", ports)?;
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            fetch_latency: defaults::FETCH_LATENCY,
            load_latency: defaults::LOAD_LATENCY,
            store_latency: defaults::STORE_LATENCY,
            ports: None,
        }
    }
}
