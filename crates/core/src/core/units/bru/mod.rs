//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the prediction policies selectable through
//! `Execution.branch_prediction`: never-taken, static
//! (backward-taken/forward-not-taken), and the per-PC dynamic 1-bit and
//! 2-bit history predictors, together with the branch history table they
//! share.

pub use self::branch_predictor::BranchPredictor;

/// Branch predictor trait.
pub mod branch_predictor;

/// Branch History Table shared by the dynamic predictors.
pub mod bht;

/// Dynamic per-PC single-bit predictor.
pub mod one_bit;

/// Static backward-taken / forward-not-taken predictor.
pub mod static_bp;

/// Dynamic per-PC 2-bit saturating-counter predictor.
pub mod two_bit;

use self::{
    one_bit::OneBitPredictor, static_bp::StaticPredictor, two_bit::TwoBitPredictor,
};
use crate::config::PredictorMode;

/// Enum wrapper for static dispatch of branch predictors.
/// This avoids vtable lookups in the fetch loop.
pub enum PredictorWrapper {
    /// Never predict taken; branches resolve late in Execute.
    None,
    Static(StaticPredictor),
    OneBit(OneBitPredictor),
    TwoBit(TwoBitPredictor),
}

impl PredictorWrapper {
    /// Creates the predictor selected by the configuration.
    pub fn new(mode: PredictorMode) -> Self {
        match mode {
            PredictorMode::None => Self::None,
            PredictorMode::Static => Self::Static(StaticPredictor),
            PredictorMode::Dynamic1Bit => Self::OneBit(OneBitPredictor::new()),
            PredictorMode::Dynamic2Bit => Self::TwoBit(TwoBitPredictor::new()),
        }
    }
}

impl BranchPredictor for PredictorWrapper {
    /// Predicts the direction and target for the instruction at `pc`.
    #[inline(always)]
    fn predict(&self, pc: u64, inst: u32) -> (bool, u64) {
        match self {
            Self::None => (false, 0),
            Self::Static(bp) => bp.predict(pc, inst),
            Self::OneBit(bp) => bp.predict(pc, inst),
            Self::TwoBit(bp) => bp.predict(pc, inst),
        }
    }

    /// Trains the predictor with the resolved outcome of the branch at `pc`.
    #[inline(always)]
    fn update(&mut self, pc: u64, taken: bool) {
        match self {
            Self::None => {}
            Self::Static(bp) => bp.update(pc, taken),
            Self::OneBit(bp) => bp.update(pc, taken),
            Self::TwoBit(bp) => bp.update(pc, taken),
        }
    }

    /// Clears all prediction state.
    #[inline(always)]
    fn reset(&mut self) {
        match self {
            Self::None => {}
            Self::Static(bp) => bp.reset(),
            Self::OneBit(bp) => bp.reset(),
            Self::TwoBit(bp) => bp.reset(),
        }
    }
}
