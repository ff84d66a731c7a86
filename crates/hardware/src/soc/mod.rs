//! Memory-System Collaborators.
//!
//! The pipeline never reads or writes data. It asks a [`MemorySystem`] whether an
//! instruction fetch is still outstanding, starts loads and stores, and collects
//! their completions each cycle. This module organizes:
//! 1. **Traits:** The `MemorySystem` interface and its request and completion records.
//! 2. **Memory:** `FixedLatencyMemory`, a configurable fixed-latency implementation.

/// Fixed-latency memory system.
pub mod memory;

/// Memory-system trait definitions.
pub mod traits;

pub use memory::FixedLatencyMemory;
pub use traits::{AccessId, AccessKind, MemCompletion, MemRequest, MemorySystem};
