//! Static Branch Predictor.
//!
//! Backward conditional branches (negative offset) are predicted taken,
//! forward branches not taken. `JAL` is always taken with its exact target
//! known from PC + immediate; `JALR` is never predicted because the target
//! depends on a register value.

use super::branch_predictor::{backward_taken, BranchPredictor};
use crate::isa::decode;
use crate::isa::opcodes::rv64i;

/// Static predictor. Stateless.
pub struct StaticPredictor;

impl BranchPredictor for StaticPredictor {
    /// Predicts backward branches taken and `JAL` always taken.
    fn predict(&self, pc: u64, inst: u32) -> (bool, u64) {
        let Ok(d) = decode(inst) else {
            return (false, 0);
        };
        match d.opcode {
            rv64i::OP_BRANCH if backward_taken(d.imm) => (true, pc.wrapping_add(d.imm as i64 as u64)),
            rv64i::OP_JAL => (true, pc.wrapping_add(d.imm as i64 as u64)),
            _ => (false, 0),
        }
    }

    /// No state to train.
    fn update(&mut self, _pc: u64, _taken: bool) {}

    /// No state to clear.
    fn reset(&mut self) {}
}
