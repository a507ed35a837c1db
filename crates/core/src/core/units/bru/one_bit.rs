//! Dynamic 1-bit Branch Predictor.
//!
//! Remembers the last outcome of each conditional branch. A branch not yet
//! in the table falls back to the static backward-taken heuristic. Always
//! mispredicts twice on each direction change of a biased branch, which is
//! what the 2-bit counter variant fixes.

use super::bht::Bht;
use super::branch_predictor::{backward_taken, BranchPredictor};
use crate::isa::decode;
use crate::isa::opcodes::rv64i;

/// 1-bit dynamic predictor backed by the BHT.
pub struct OneBitPredictor {
    bht: Bht,
}

impl OneBitPredictor {
    /// Creates a predictor with an empty history table.
    pub fn new() -> Self {
        Self { bht: Bht::new() }
    }
}

impl Default for OneBitPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchPredictor for OneBitPredictor {
    /// Predicts the last observed direction, or the static heuristic for an
    /// unseen branch. `JAL` is always taken.
    fn predict(&self, pc: u64, inst: u32) -> (bool, u64) {
        let Ok(d) = decode(inst) else {
            return (false, 0);
        };
        match d.opcode {
            rv64i::OP_BRANCH => {
                let taken = match self.bht.lookup(pc) {
                    Some(state) => state != 0,
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

    /// Records the actual outcome as the new prediction.
    fn update(&mut self, pc: u64, taken: bool) {
        self.bht.store(pc, taken as u8);
    }

    /// Empties the history table.
    fn reset(&mut self) {
        self.bht.clear();
    }
}
