//! Dynamic 2-bit Branch Predictor.
//!
//! Per-PC saturating counter with the classic four states:
//!
//! | Value | State            | Prediction |
//! |-------|------------------|------------|
//! |   0   | Strongly not-taken (SN) | not taken |
//! |   1   | Weakly not-taken (WN)   | not taken |
//! |   2   | Weakly taken (WT)       | taken     |
//! |   3   | Strongly taken (ST)     | taken     |
//!
//! The counter shifts one step toward the actual outcome on every update, so
//! a single anomalous outcome in a biased branch costs one misprediction
//! instead of two.

use super::bht::Bht;
use super::branch_predictor::{backward_taken, BranchPredictor};
use crate::isa::decode;
use crate::isa::opcodes::rv64i;

/// Counter value for "weakly not-taken", the cold-entry state after a
/// not-taken first outcome.
const WEAK_NOT_TAKEN: u8 = 1;

/// Counter value for "weakly taken", the cold-entry state after a taken
/// first outcome.
const WEAK_TAKEN: u8 = 2;

/// Saturation limit ("strongly taken").
const STRONG_TAKEN: u8 = 3;

/// 2-bit dynamic predictor backed by the BHT.
pub struct TwoBitPredictor {
    bht: Bht,
}

impl TwoBitPredictor {
    /// Creates a predictor with an empty history table.
    pub fn new() -> Self {
        Self { bht: Bht::new() }
    }
}

impl Default for TwoBitPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchPredictor for TwoBitPredictor {
    /// Predicts taken iff the counter's high bit is set; unseen branches use
    /// the static heuristic. `JAL` is always taken.
    fn predict(&self, pc: u64, inst: u32) -> (bool, u64) {
        let Ok(d) = decode(inst) else {
            return (false, 0);
        };
        match d.opcode {
            rv64i::OP_BRANCH => {
                let taken = match self.bht.lookup(pc) {
                    Some(counter) => counter >= WEAK_TAKEN,
                    None => backward_taken(d.imm),
                };
                if taken {
                    (true, pc.wrapping_add(d.imm as i64 as u64))
                } else {
                    (false, 0)
                }
            }
            rv64i::OP_JAL => (true, pc.wrapping_add(d.imm as i64 as u64)),
            _ => (false, 0),
        }
    }

    /// Shifts the counter one step toward the actual outcome.
    fn update(&mut self, pc: u64, taken: bool) {
        let counter = match self.bht.lookup(pc) {
            Some(counter) => {
                if taken {
                    (counter + 1).min(STRONG_TAKEN)
                } else {
                    counter.saturating_sub(1)
                }
            }
            None => {
                if taken {
                    WEAK_TAKEN
                } else {
                    WEAK_NOT_TAKEN
                }
            }
        };
        self.bht.store(pc, counter);
    }

    /// Empties the history table.
    fn reset(&mut self) {
        self.bht.clear();
    }
}
