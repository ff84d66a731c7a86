//! Common utilities and types used throughout the pipeline simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Constants:** Uop shape, logical register counts and resource limits.
//! 2. **Error Handling:** Configuration and fatal simulation errors.
//! 3. **Register Naming:** Register classes, logical and physical register identifiers.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for configuration and simulation.
pub mod error;

/// Register class, logical register and physical register identifiers.
pub mod reg;

/// Simulation cycle count.
pub type Cycle = u64;

pub use error::{ConfigError, SimError};
pub use reg::{LogicalReg, PhysReg, RegClass};
