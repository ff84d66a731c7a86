//! Bimodal Direction Predictor.
//!
//! A table of two-bit counters indexed by the uop address modulo the table size.
//! Ignores branch history.

use super::{DirectionPredictor, PredictionSnapshot, counter::CounterTable};

/// Bimodal predictor structure.
#[derive(Clone, Debug)]
pub struct BimodalPredictor {
    /// Address-indexed counters.
    table: CounterTable,
}

impl BimodalPredictor {
    /// Creates a bimodal predictor with `size` counters.
    pub fn new(size: usize) -> Self {
        Self {
            table: CounterTable::new(size),
        }
    }

    /// Counter table, for inspection.
    pub const fn table(&self) -> &CounterTable {
        &self.table
    }
}

impl DirectionPredictor for BimodalPredictor {
    fn predict(&self, eip: u64, _bhr: u32) -> bool {
        self.table.predicts_taken(self.table.index(eip))
    }

    fn update(&mut self, eip: u64, _snapshot: &PredictionSnapshot, taken: bool) {
        let idx = self.table.index(eip);
        self.table.train(idx, taken);
    }
}
