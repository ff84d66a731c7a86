//! Combined Direction Predictor.
//!
//! Runs a bimodal and a two-level predictor side by side. A third table of
//! two-bit counters, indexed by uop address, chooses between them: values 2 and 3
//! select the two-level prediction. The choice counter is trained only when the
//! two components disagreed at lookup, toward whichever one was right. The
//! lookup-time directions travel in the uop's snapshot because younger uops at
//! the same address may retrain the components before this one commits.

use super::{
    ComponentPredictions, DirectionPredictor, PredictionSnapshot, bimodal::BimodalPredictor,
    counter::CounterTable, two_level::TwoLevelPredictor,
};

/// Combined predictor structure.
#[derive(Clone, Debug)]
pub struct CombinedPredictor {
    bimodal: BimodalPredictor,
    two_level: TwoLevelPredictor,
    /// Component selector, trusts the two-level side when taken.
    choice: CounterTable,
}

impl CombinedPredictor {
    /// Creates a combined predictor from its three table sizes.
    pub fn new(bimod_size: usize, history_size: u32, choice_size: usize) -> Self {
        Self {
            bimodal: BimodalPredictor::new(bimod_size),
            two_level: TwoLevelPredictor::new(history_size),
            choice: CounterTable::new(choice_size),
        }
    }

    /// Two-level component, for inspection.
    pub const fn two_level(&self) -> &TwoLevelPredictor {
        &self.two_level
    }

    /// Choice table, for inspection.
    pub const fn choice(&self) -> &CounterTable {
        &self.choice
    }
}

impl DirectionPredictor for CombinedPredictor {
    fn predict(&self, eip: u64, bhr: u32) -> bool {
        if self.choice.predicts_taken(self.choice.index(eip)) {
            self.two_level.predict(eip, bhr)
        } else {
            self.bimodal.predict(eip, bhr)
        }
    }

    fn components(&self, eip: u64, bhr: u32) -> Option<ComponentPredictions> {
        Some(ComponentPredictions {
            bimodal: self.bimodal.predict(eip, bhr),
            two_level: self.two_level.predict(eip, bhr),
        })
    }

    fn update(&mut self, eip: u64, snapshot: &PredictionSnapshot, taken: bool) {
        // Snapshots built outside lookup carry no components; read them now.
        let seen = snapshot
            .components
            .unwrap_or_else(|| ComponentPredictions {
                bimodal: self.bimodal.predict(eip, snapshot.bhr),
                two_level: self.two_level.predict(eip, snapshot.bhr),
            });
        let bimodal_right = seen.bimodal == taken;
        let two_level_right = seen.two_level == taken;
        if bimodal_right != two_level_right {
            let idx = self.choice.index(eip);
            self.choice.train(idx, two_level_right);
        }
        self.bimodal.update(eip, snapshot, taken);
        self.two_level.update(eip, snapshot, taken);
    }
}
