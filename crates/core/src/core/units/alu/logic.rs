//! Bitwise logic, set-less-than, and branch comparators.
//!
//! The branch comparators encode their decision in the result value. The
//! convention follows the comparator hardware: `BEQ`/`BGE`/`BGEU` produce 0
//! when the branch is taken (the compare "succeeded"), while
//! `BNE`/`BLT`/`BLTU` produce 1 when taken. The Execute and Decode stages
//! interpret the value per operation.

use crate::core::pipeline::signals::AluOp;

/// Executes a logic or comparison operation. The overflow flag is never set.
pub fn execute(op: AluOp, a: u64, b: u64) -> (u64, bool) {
    let res = match op {
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => ((a as i64) < (b as i64)) as u64,
        AluOp::Sltu => (a < b) as u64,

        // 0 when taken.
        AluOp::Beq => (a != b) as u64,
        AluOp::Bge => ((a as i64) < (b as i64)) as u64,
        AluOp::Bgeu => (a < b) as u64,

        // 1 when taken.
        AluOp::Bne => (a != b) as u64,
        AluOp::Blt => ((a as i64) < (b as i64)) as u64,
        AluOp::Bltu => (a < b) as u64,

        _ => 0,
    };
    (res, false)
}

/// Interprets a comparator result as the branch-taken decision.
pub fn branch_taken(op: AluOp, result: u64) -> bool {
    match op {
        AluOp::Beq | AluOp::Bge | AluOp::Bgeu => result == 0,
        AluOp::Bne | AluOp::Blt | AluOp::Bltu => result == 1,
        _ => false,
    }
}
