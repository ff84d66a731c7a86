//! Core processor implementation.
//!
//! This module contains the out-of-order processor model: the uop representation,
//! the pipeline structures and stages, the functional and branch prediction units,
//! and the `Cpu`/`Core`/`Thread` hierarchy that owns them.

/// Processor, core and hardware thread ownership and the cycle driver.
pub mod cpu;

/// Pipeline structures and stages (front end, rename, queues, stages, recovery).
pub mod pipeline;

/// Execution units (functional unit pool, branch predictor).
pub mod units;

/// Micro-operation model and per-core uop arena.
pub mod uop;

pub use self::cpu::{Core, Cpu, Thread};
