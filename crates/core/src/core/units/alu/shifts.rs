//! Shift operations.
//!
//! Shift amounts are taken modulo 64 (modulo 32 for the `W` variants), and
//! `W` results are sign-extended to 64 bits.

use crate::core::pipeline::signals::AluOp;

/// Executes a shift operation. The overflow flag is never set.
pub fn execute(op: AluOp, a: u64, b: u64) -> (u64, bool) {
    let res = match op {
        AluOp::Sll => a.wrapping_shl(b as u32 & 0x3F),
        AluOp::Srl => a.wrapping_shr(b as u32 & 0x3F),
        AluOp::Sra => ((a as i64).wrapping_shr(b as u32 & 0x3F)) as u64,
        AluOp::Sllw => ((a as u32).wrapping_shl(b as u32 & 0x1F)) as i32 as i64 as u64,
        AluOp::Srlw => ((a as u32).wrapping_shr(b as u32 & 0x1F)) as i32 as i64 as u64,
        AluOp::Sraw => ((a as i32).wrapping_shr(b as u32 & 0x1F)) as i64 as u64,
        _ => 0,
    };
    (res, false)
}
