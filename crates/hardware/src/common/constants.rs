//! Global Pipeline Constants.
//!
//! This module defines model-wide constants used across the simulator. It includes:
//! 1. **Uop Shape:** Maximum number of logical input and output dependencies per uop.
//! 2. **Logical Registers:** Number of architectural registers in each register class.
//! 3. **Resource Limits:** Upper bounds on functional unit counts and register pools.
//! 4. **Front End:** Geometry of synthesized wrong-path uops.

/// Maximum number of logical input dependencies carried by a uop.
pub const IDEP_COUNT: usize = 3;

/// Maximum number of logical output dependencies carried by a uop.
pub const ODEP_COUNT: usize = 4;

/// Number of architectural integer registers visible to rename.
pub const INT_LOGICAL_REGS: usize = 32;

/// Number of architectural floating-point registers visible to rename.
pub const FP_LOGICAL_REGS: usize = 32;

/// Number of architectural flag registers visible to rename.
pub const FLAG_LOGICAL_REGS: usize = 4;

/// Number of architectural vector registers visible to rename.
pub const VECTOR_LOGICAL_REGS: usize = 16;

/// Largest physical register pool of one class; indices must fit a `u16`.
pub const MAX_PHYS_REGS: usize = u16::MAX as usize + 1;

/// Maximum number of parallel units of a single functional unit class.
pub const FU_RES_MAX: usize = 10;

/// Size in bytes assigned to each wrong-path uop synthesized after a misprediction.
pub const WRONG_PATH_UOP_SIZE: u32 = 4;

/// Widest branch history register supported by the two-level predictor.
///
/// The pattern history table has `2^history_size` entries, so this also bounds
/// the table footprint.
pub const MAX_HISTORY_BITS: u32 = 24;
