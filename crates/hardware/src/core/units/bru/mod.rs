//! Branch prediction unit (BRU).
//!
//! Each hardware thread owns one [`BranchPredictor`], composed of:
//! 1. **Direction:** A taken/not-taken algorithm (static, bimodal, two-level or combined).
//! 2. **History:** The branch history register (BHR), shifted on every prediction.
//! 3. **Targets:** A branch target buffer (BTB) and a return address stack (RAS).
//!
//! Prediction happens at fetch and records a [`PredictionSnapshot`] in the uop.
//! Training happens at commit using that snapshot, and misprediction recovery
//! restores the snapshot of the mispredicted uop.

pub use self::branch_predictor::DirectionPredictor;

/// Bimodal direction predictor.
pub mod bimodal;

/// Direction predictor trait.
pub mod branch_predictor;

/// Branch Target Buffer for storing resolved targets and control kinds.
pub mod btb;

/// Combined predictor selecting between bimodal and two-level.
pub mod combined;

/// Two-bit saturating counter tables.
pub mod counter;

/// Return Address Stack for predicting return addresses.
pub mod ras;

/// Static direction predictor (always taken or never taken).
pub mod static_bp;

/// Two-level adaptive direction predictor.
pub mod two_level;

use tracing::trace;

use self::{
    bimodal::BimodalPredictor,
    btb::{Btb, BtbEntry},
    combined::CombinedPredictor,
    ras::Ras,
    static_bp::StaticPredictor,
    two_level::TwoLevelPredictor,
};
use crate::config::{BranchPredictorConfig, PredictorKind};
use crate::core::uop::Uop;

/// Predictor state recorded in a control uop at lookup time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PredictionSnapshot {
    /// Branch history register before the uop shifted its prediction in.
    pub bhr: u32,
    /// Return address stack index before the uop pushed or popped.
    pub ras_idx: usize,
    /// Component directions read by a combined predictor.
    pub components: Option<ComponentPredictions>,
}

/// Directions of the two components of a combined predictor at lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentPredictions {
    /// Bimodal component.
    pub bimodal: bool,
    /// Two-level component.
    pub two_level: bool,
}

/// Enum wrapper for static dispatch of direction predictors.
#[derive(Clone, Debug)]
pub enum DirectionPredictorWrapper {
    /// Fixed prediction.
    Static(StaticPredictor),
    /// Address-indexed counters.
    Bimodal(BimodalPredictor),
    /// History-indexed counters.
    TwoLevel(TwoLevelPredictor),
    /// Bimodal and two-level with a choice table.
    Combined(CombinedPredictor),
}

impl DirectionPredictorWrapper {
    /// Creates the direction predictor selected by the configuration.
    pub fn new(config: &BranchPredictorConfig) -> Self {
        match config.kind {
            PredictorKind::Perfect | PredictorKind::NotTaken => {
                Self::Static(StaticPredictor::new(false))
            }
            PredictorKind::Taken => Self::Static(StaticPredictor::new(true)),
            PredictorKind::Bimodal => Self::Bimodal(BimodalPredictor::new(config.bimod_size)),
            PredictorKind::TwoLevel => Self::TwoLevel(TwoLevelPredictor::new(config.history_size)),
            PredictorKind::Combined => Self::Combined(CombinedPredictor::new(
                config.bimod_size,
                config.history_size,
                config.choice_size,
            )),
        }
    }

    /// Pattern history table of the two-level component, if there is one.
    pub const fn pht(&self) -> Option<&counter::CounterTable> {
        match self {
            Self::TwoLevel(bp) => Some(bp.pht()),
            Self::Combined(bp) => Some(bp.two_level().pht()),
            Self::Static(_) | Self::Bimodal(_) => None,
        }
    }
}

impl DirectionPredictor for DirectionPredictorWrapper {
    #[inline(always)]
    fn predict(&self, eip: u64, bhr: u32) -> bool {
        match self {
            Self::Static(bp) => bp.predict(eip, bhr),
            Self::Bimodal(bp) => bp.predict(eip, bhr),
            Self::TwoLevel(bp) => bp.predict(eip, bhr),
            Self::Combined(bp) => bp.predict(eip, bhr),
        }
    }

    fn components(&self, eip: u64, bhr: u32) -> Option<ComponentPredictions> {
        match self {
            Self::Combined(bp) => bp.components(eip, bhr),
            Self::Static(_) | Self::Bimodal(_) | Self::TwoLevel(_) => None,
        }
    }

    #[inline(always)]
    fn update(&mut self, eip: u64, snapshot: &PredictionSnapshot, taken: bool) {
        match self {
            Self::Static(bp) => bp.update(eip, snapshot, taken),
            Self::Bimodal(bp) => bp.update(eip, snapshot, taken),
            Self::TwoLevel(bp) => bp.update(eip, snapshot, taken),
            Self::Combined(bp) => bp.update(eip, snapshot, taken),
        }
    }
}

/// Per-thread branch predictor.
#[derive(Clone, Debug)]
pub struct BranchPredictor {
    kind: PredictorKind,
    direction: DirectionPredictorWrapper,
    btb: Btb,
    ras: Ras,
    /// Branch history register.
    bhr: u32,
    /// `2^history_size - 1`.
    bhr_mask: u32,
}

impl BranchPredictor {
    /// Creates a predictor from a validated configuration.
    pub fn new(config: &BranchPredictorConfig) -> Self {
        Self {
            kind: config.kind,
            direction: DirectionPredictorWrapper::new(config),
            btb: Btb::new(config.btb_sets, config.btb_assoc),
            ras: Ras::new(config.ras_size),
            bhr: 0,
            bhr_mask: (1u32 << config.history_size) - 1,
        }
    }

    /// Predicts the next address of the control uop and records it in `pred_neip`.
    ///
    /// The uop receives a snapshot of the history register and RAS index first,
    /// then the history register shifts in the predicted direction. A BTB hit
    /// recorded as a call pushes the fall-through address; one recorded as a
    /// return pops the RAS. A BTB miss always predicts fall-through.
    pub fn lookup(&mut self, uop: &mut Uop) -> u64 {
        uop.prediction = PredictionSnapshot {
            bhr: self.bhr,
            ras_idx: self.ras.index(),
            components: None,
        };

        if self.kind == PredictorKind::Perfect {
            uop.pred_neip = uop.neip;
            return uop.pred_neip;
        }

        uop.prediction.components = self.direction.components(uop.eip, self.bhr);
        let taken = self.direction.predict(uop.eip, self.bhr);
        self.bhr = ((self.bhr << 1) | u32::from(taken)) & self.bhr_mask;

        let fallthrough = uop.fallthrough();
        let target = match self.btb.lookup(uop.eip).copied() {
            Some(entry) if entry.kind.is_call() => {
                self.ras.push(fallthrough);
                entry.dest
            }
            Some(entry) if entry.kind.is_return() => self.ras.pop(),
            Some(entry) if taken => entry.dest,
            Some(_) | None => fallthrough,
        };

        trace!(
            target: "o3sim::bpred",
            uop = %uop.id,
            eip = uop.eip,
            taken,
            target,
            "lookup"
        );
        uop.pred_neip = target;
        target
    }

    /// Trains the predictor with a committed control uop.
    ///
    /// The direction predictor is trained with the snapshot recorded by
    /// [`lookup`](Self::lookup), and the BTB slot of `eip` is overwritten with the
    /// resolved destination.
    pub fn update(&mut self, uop: &Uop) {
        let taken = uop.neip != uop.fallthrough();
        self.direction.update(uop.eip, &uop.prediction, taken);
        self.btb.update(BtbEntry {
            source: uop.eip,
            dest: uop.neip,
            size: uop.size,
            kind: uop.kind,
        });
    }

    /// Restores the history register and RAS index recorded in a snapshot.
    pub const fn recover(&mut self, snapshot: &PredictionSnapshot) {
        self.bhr = snapshot.bhr;
        self.ras.restore(snapshot.ras_idx);
    }

    /// Current branch history register.
    #[inline]
    pub const fn bhr(&self) -> u32 {
        self.bhr
    }

    /// Current RAS index.
    #[inline]
    pub const fn ras_index(&self) -> usize {
        self.ras.index()
    }

    /// Configured predictor kind.
    pub const fn kind(&self) -> PredictorKind {
        self.kind
    }

    /// Branch target buffer.
    pub const fn btb(&self) -> &Btb {
        &self.btb
    }

    /// Direction predictor.
    pub const fn direction(&self) -> &DirectionPredictorWrapper {
        &self.direction
    }
}
