//! # Unit Components
//!
//! This module mirrors the library source tree. Each submodule exercises the
//! structures and stages of the matching library module through the public API.



/// Simulation driver and trace loading.
pub mod sim;


/// Statistics snapshot and export.
pub mod stats;
