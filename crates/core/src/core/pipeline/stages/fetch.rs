//! Instruction Fetch (IF) stage.
//!
//! Reads the instruction word at the PC, consults the branch predictor, and
//! chooses the next PC. Fetching past the end of the text section, or a
//! memory fault, produces a bubble.

use log::warn;

use crate::core::pipeline::latches::IfId;
use crate::core::units::bru::{BranchPredictor, PredictorWrapper};
use crate::core::Machine;

/// Result of one fetch: the next IF/ID latch and the PC it leaves behind.
pub struct FetchOutcome {
    /// Latch to commit into IF/ID.
    pub latch: IfId,
    /// PC for the next cycle (predicted target or fall-through).
    pub next_pc: u64,
}

/// Executes the fetch stage at `pc`.
///
/// Assigns the next fetch sequence id on success; a bubble consumes no id and
/// leaves the PC where it was.
pub fn fetch_stage(
    machine: &Machine,
    predictor: &PredictorWrapper,
    seq: &mut u64,
    pc: u64,
) -> FetchOutcome {
    if pc >= machine.program_size {
        return FetchOutcome {
            latch: IfId::default(),
            next_pc: pc,
        };
    }

    let inst = match machine.mem.read_u32(pc) {
        Ok(word) => word,
        Err(fault) => {
            warn!("fetch at pc={:#x} failed: {}", pc, fault);
            return FetchOutcome {
                latch: IfId::default(),
                next_pc: pc,
            };
        }
    };

    let (pred_taken, pred_target) = predictor.predict(pc, inst);
    let next_pc = if pred_taken {
        pred_target
    } else {
        pc.wrapping_add(4)
    };

    let id = *seq;
    *seq += 1;

    FetchOutcome {
        latch: IfId {
            valid: true,
            inst,
            pc,
            seq: id,
            pred_taken,
            pred_target,
        },
        next_pc,
    }
}
