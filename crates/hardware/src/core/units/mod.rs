//! Execution units and functional components.
//!
//! This module contains the units the pipeline stages consult: the functional
//! unit pool that times execution and the branch prediction unit.

/// Branch Resolution Unit including direction predictors, BTB and RAS.
pub mod bru;

/// Functional unit pool with per-class reservation tables.
pub mod fu;
