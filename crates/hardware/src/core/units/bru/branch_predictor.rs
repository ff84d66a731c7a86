//! Direction Predictor Interface.
//!
//! This module defines the `DirectionPredictor` trait implemented by every
//! taken/not-taken algorithm. Targets, the return address stack and the branch
//! history register belong to the enclosing [`BranchPredictor`](super::BranchPredictor);
//! a direction predictor only sees the uop address and the snapshot taken when
//! the uop was predicted.

use super::{ComponentPredictions, PredictionSnapshot};

/// Trait for branch direction prediction algorithms.
pub trait DirectionPredictor {
    /// Predicts whether the control uop at `eip` is taken.
    ///
    /// # Arguments
    ///
    /// * `eip` - Address of the control uop
    /// * `bhr` - Branch history register at prediction time
    fn predict(&self, eip: u64, bhr: u32) -> bool;

    /// Per-component directions to keep in the uop's snapshot, for predictors
    /// built from several components.
    fn components(&self, _eip: u64, _bhr: u32) -> Option<ComponentPredictions> {
        None
    }

    /// Trains the predictor with the resolved outcome.
    ///
    /// `snapshot` is the state recorded when the same uop was predicted, so
    /// training touches exactly the counters the prediction read.
    fn update(&mut self, eip: u64, snapshot: &PredictionSnapshot, taken: bool);
}
