//! Static Direction Predictor.
//!
//! Predicts every control uop the same way. Used for the always-taken and
//! never-taken predictor kinds, and as the inert direction source of the
//! perfect predictor, which bypasses direction prediction entirely.

use super::{DirectionPredictor, PredictionSnapshot};

/// Static direction predictor.
#[derive(Clone, Copy, Debug)]
pub struct StaticPredictor {
    /// Fixed prediction.
    taken: bool,
}

impl StaticPredictor {
    /// Creates a predictor that always answers `taken`.
    pub const fn new(taken: bool) -> Self {
        Self { taken }
    }
}

impl DirectionPredictor for StaticPredictor {
    fn predict(&self, _eip: u64, _bhr: u32) -> bool {
        self.taken
    }

    fn update(&mut self, _eip: u64, _snapshot: &PredictionSnapshot, _taken: bool) {}
}
