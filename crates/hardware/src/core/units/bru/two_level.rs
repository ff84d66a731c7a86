//! Two-Level Adaptive Direction Predictor.
//!
//! The first level is the branch history register owned by the enclosing
//! predictor. The second level is a pattern history table (PHT) of
//! `2^history_size` two-bit counters indexed directly by the history value.
//!
//! # Performance
//!
//! - **Time Complexity:** O(1) for both prediction and training
//! - **Space Complexity:** O(2^N) counters for an N-bit history
//! - **Best Case:** Branches whose outcome is determined by recent global history
//! - **Worst Case:** Unrelated branches aliasing on the same history pattern

use super::{DirectionPredictor, PredictionSnapshot, counter::CounterTable};

/// Two-level predictor structure.
#[derive(Clone, Debug)]
pub struct TwoLevelPredictor {
    /// Pattern history table.
    pht: CounterTable,
}

impl TwoLevelPredictor {
    /// Creates a PHT sized for a `history_size`-bit history register.
    pub fn new(history_size: u32) -> Self {
        Self {
            pht: CounterTable::new(1 << history_size),
        }
    }

    /// Pattern history table, for inspection.
    pub const fn pht(&self) -> &CounterTable {
        &self.pht
    }
}

impl DirectionPredictor for TwoLevelPredictor {
    fn predict(&self, _eip: u64, bhr: u32) -> bool {
        self.pht.predicts_taken(self.pht.index(u64::from(bhr)))
    }

    fn update(&mut self, _eip: u64, snapshot: &PredictionSnapshot, taken: bool) {
        let idx = self.pht.index(u64::from(snapshot.bhr));
        self.pht.train(idx, taken);
    }
}
