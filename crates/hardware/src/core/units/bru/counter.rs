//! Two-bit Saturating Counter Tables.
//!
//! Every direction predictor stores its state as a table of two-bit counters.
//! Values 0 and 1 predict not taken, 2 and 3 predict taken. Tables start at the
//! weakly-taken value so a fresh predictor is fully deterministic.

/// Initial value of every counter.
pub const WEAKLY_TAKEN: u8 = 2;

/// Saturation ceiling.
pub const STRONGLY_TAKEN: u8 = 3;

/// Table of two-bit saturating counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterTable {
    counters: Vec<u8>,
}

impl CounterTable {
    /// Creates a table of `size` weakly-taken counters.
    pub fn new(size: usize) -> Self {
        Self {
            counters: vec![WEAKLY_TAKEN; size],
        }
    }

    /// Number of counters.
    #[inline]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Returns true if the table has no counters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Folds `key` onto a table slot.
    #[inline]
    pub fn index(&self, key: u64) -> usize {
        (key % self.counters.len() as u64) as usize
    }

    /// Current value of the counter at `idx`.
    #[inline]
    pub fn get(&self, idx: usize) -> u8 {
        self.counters[idx]
    }

    /// Returns true if the counter at `idx` predicts taken.
    #[inline]
    pub fn predicts_taken(&self, idx: usize) -> bool {
        self.counters[idx] > 1
    }

    /// Moves the counter at `idx` one step toward the outcome.
    pub fn train(&mut self, idx: usize, taken: bool) {
        let counter = &mut self.counters[idx];
        if taken {
            *counter = (*counter + 1).min(STRONGLY_TAKEN);
        } else {
            *counter = counter.saturating_sub(1);
        }
    }
}
