//! Pipeline control signals and operation types.
//!
//! This module defines the signals generated in Decode and carried through the
//! latches. It performs:
//! 1. **Operation Classification:** The full ALU/FPU operation tag set.
//! 2. **Operand Selection:** The `alu_src` mux select (register vs. immediate).
//! 3. **Register-File Routing:** GPR/FPR classification per operand.

/// ALU operation selector.
///
/// Integer operations return a 64-bit result; `W`-suffixed variants operate on
/// the low 32 bits and sign-extend. The branch comparators report the taken
/// decision through the result value (see [`crate::core::units::alu::Alu`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluOp {
    /// No operation (bubbles, pass-through).
    #[default]
    None,
    Add,
    Sub,
    And,
    Or,
    Xor,
    Sll,
    Srl,
    Sra,
    Slt,
    Sltu,
    Mul,
    Mulh,
    Mulhu,
    Mulhsu,
    Div,
    Divu,
    Rem,
    Remu,
    /// 32-bit add, result sign-extended.
    Addw,
    Subw,
    Sllw,
    Srlw,
    Sraw,
    Mulw,
    Divw,
    Divuw,
    Remw,
    Remuw,
    /// Pass the U-immediate through (operand B).
    Lui,
    /// PC-relative upper immediate (operand A carries the PC).
    Auipc,
    /// Branch comparators. Equal/greater classes report 0 when taken,
    /// less/not-equal classes report 1 when taken.
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    // Floating point. Precision is selected by `ControlSignals::is_double`.
    FAdd,
    FSub,
    FMul,
    FDiv,
    FSqrt,
    FMin,
    FMax,
    FSgnJ,
    FSgnJN,
    FSgnJX,
    /// Float to 32-bit signed integer.
    FCvtWF,
    /// Float to 64-bit signed integer.
    FCvtLF,
    /// 32-bit signed integer to float.
    FCvtFW,
    /// 64-bit signed integer to float.
    FCvtFL,
    /// Double to single.
    FCvtSD,
    /// Single to double.
    FCvtDS,
    /// Raw bit move FPR -> GPR.
    FMvXF,
    /// Raw bit move GPR -> FPR.
    FMvFX,
    FEq,
    FLt,
    FLe,
    FClass,
}

impl AluOp {
    /// Returns true for operations evaluated by the FPU.
    pub fn is_fp(self) -> bool {
        matches!(
            self,
            AluOp::FAdd
                | AluOp::FSub
                | AluOp::FMul
                | AluOp::FDiv
                | AluOp::FSqrt
                | AluOp::FMin
                | AluOp::FMax
                | AluOp::FSgnJ
                | AluOp::FSgnJN
                | AluOp::FSgnJX
                | AluOp::FCvtWF
                | AluOp::FCvtLF
                | AluOp::FCvtFW
                | AluOp::FCvtFL
                | AluOp::FCvtSD
                | AluOp::FCvtDS
                | AluOp::FMvXF
                | AluOp::FMvFX
                | AluOp::FEq
                | AluOp::FLt
                | AluOp::FLe
                | AluOp::FClass
        )
    }

}

/// Control signals generated in Decode and carried through the latches.
///
/// A bubble carries the default value, which is architecturally a
/// `addi x0, x0, 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// Write the destination register at Writeback.
    pub reg_write: bool,
    /// Load from memory at the Memory stage.
    pub mem_read: bool,
    /// Store to memory at the Memory stage.
    pub mem_write: bool,
    /// Writeback mux: memory data (true) vs. ALU result (false).
    pub mem_to_reg: bool,
    /// ALU operand B mux: immediate (true) vs. rs2 value (false).
    pub alu_src: bool,
    /// ALU/FPU operation.
    pub alu_op: AluOp,
    /// Destination register lives in the FPR file.
    pub rd_fp: bool,
    /// rs1 is read from the FPR file.
    pub rs1_fp: bool,
    /// rs2 is read from the FPR file.
    pub rs2_fp: bool,
    /// Instruction is a conditional branch.
    pub branch: bool,
    /// Instruction is an unconditional jump (`JAL`/`JALR`).
    pub jump: bool,
    /// Distinguishes `JAL` (true) from `JALR` (false) when `jump` is set.
    pub is_jal: bool,
    /// FP operation width: double (true) vs. NaN-boxed single (false).
    pub is_double: bool,
}
