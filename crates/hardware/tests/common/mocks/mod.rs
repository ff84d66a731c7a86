//! Mock collaborators.

/// Mock memory system.
pub mod memory;

pub use memory::{MockMemory, instant_fetch_memory};
