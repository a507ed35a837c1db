//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer ALU used in the Execute stage. It
//! handles arithmetic, logical operations, shifts, and the branch
//! comparators, for both 64-bit and 32-bit (`W`) operand widths, including
//! the Multiply/Divide (M) extension.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Mul*, Div*, Rem* and their `W` variants
//! - [`logic`]:      And, Or, Xor, Slt, Sltu, and the branch comparators
//! - [`shifts`]:     Sll, Srl, Sra and their `W` variants

/// Integer arithmetic operations (add, subtract, multiply, divide).
pub mod arithmetic;

/// Bitwise logic, set-less-than, and branch comparators.
pub mod logic;

/// Shift operations with masked shift amounts.
pub mod shifts;

use crate::core::pipeline::signals::AluOp;

/// Arithmetic Logic Unit for integer operations.
///
/// Pure: a function from `(op, a, b)` to `(result, overflow)`. The branch
/// comparators report the taken decision through the result value - the
/// equal/greater class (`BEQ`/`BGE`/`BGEU`) yields 0 when taken, the
/// not-equal/less class (`BNE`/`BLT`/`BLTU`) yields 1 when taken - and the
/// Execute stage interprets that per operation.
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// Returns the 64-bit result and the signed-overflow flag (meaningful for
    /// `Add`/`Sub` only). `W` variants operate on the low 32 bits and
    /// sign-extend the result. Division by zero follows the RISC-V rules:
    /// all-ones for `DIV`/`DIVU`, the dividend for `REM`/`REMU`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rv5s_core::core::units::alu::Alu;
    /// use rv5s_core::core::pipeline::signals::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 42, 8), (50, false));
    /// assert_eq!(Alu::execute(AluOp::Divu, 100, 7), (14, false));
    /// // BEQ reports 0 when the branch is taken.
    /// assert_eq!(Alu::execute(AluOp::Beq, 5, 5).0, 0);
    /// ```
    pub fn execute(op: AluOp, a: u64, b: u64) -> (u64, bool) {
        match op {
            AluOp::None => (0, false),

            // LUI passes the U-immediate through; AUIPC adds it to the PC
            // supplied as operand A.
            AluOp::Lui => (b, false),
            AluOp::Auipc => (a.wrapping_add(b), false),

            AluOp::Add
            | AluOp::Sub
            | AluOp::Addw
            | AluOp::Subw
            | AluOp::Mul
            | AluOp::Mulh
            | AluOp::Mulhsu
            | AluOp::Mulhu
            | AluOp::Mulw
            | AluOp::Div
            | AluOp::Divu
            | AluOp::Divw
            | AluOp::Divuw
            | AluOp::Rem
            | AluOp::Remu
            | AluOp::Remw
            | AluOp::Remuw => arithmetic::execute(op, a, b),

            AluOp::And
            | AluOp::Or
            | AluOp::Xor
            | AluOp::Slt
            | AluOp::Sltu
            | AluOp::Beq
            | AluOp::Bne
            | AluOp::Blt
            | AluOp::Bge
            | AluOp::Bltu
            | AluOp::Bgeu => logic::execute(op, a, b),

            AluOp::Sll | AluOp::Srl | AluOp::Sra | AluOp::Sllw | AluOp::Srlw | AluOp::Sraw => {
                shifts::execute(op, a, b)
            }

            // Floating-point operations are evaluated by the FPU.
            _ => (0, false),
        }
    }
}
