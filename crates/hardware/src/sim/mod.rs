//! Simulation driver and trace input.
//!
//! Provides the [`Simulator`](simulator::Simulator), which owns a processor and
//! its memory system and runs them until every trace is drained, and the JSON
//! trace loader.

pub mod simulator;
pub mod trace;

pub use simulator::Simulator;
pub use trace::{load_trace, parse_trace};
