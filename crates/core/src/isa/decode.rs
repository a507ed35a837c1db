//! Instruction decoder.
//!
//! Expands a raw 32-bit instruction word into its bit fields and computes the
//! sign-extended immediate for the format the opcode selects. Decoding has no
//! side effects; unrecognized opcodes fail with
//! [`Fault::IllegalInstruction`](crate::common::Fault::IllegalInstruction).

use crate::common::Fault;
use crate::isa::opcodes::{fp, rv64i};

/// Instruction encoding format selected by the major opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstFormat {
    /// Register-register (OP, OP-32).
    R,
    /// Register-immediate, loads, JALR (OP-IMM, OP-IMM-32, LOAD, JALR).
    I,
    /// Stores.
    S,
    /// Conditional branches.
    B,
    /// Upper-immediate (LUI, AUIPC).
    U,
    /// JAL.
    J,
    /// Floating-point register-register (OP-FP).
    FpR,
    /// Floating-point load (LOAD-FP).
    FpLoad,
    /// Floating-point store (STORE-FP).
    FpStore,
}

/// Product of decoding one instruction word.
///
/// Field extraction is unconditional; the immediate is sign-extended according
/// to the format. A `Decoded` value carries everything Decode and the control
/// generator need, so the raw word never has to be re-parsed downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// 7-bit major opcode.
    pub opcode: u32,
    /// Destination register index.
    pub rd: u8,
    /// `funct3` field.
    pub funct3: u8,
    /// First source register index.
    pub rs1: u8,
    /// Second source register index.
    pub rs2: u8,
    /// `funct7` field.
    pub funct7: u8,
    /// Sign-extended immediate for the instruction's format.
    pub imm: i32,
    /// Encoding format tag.
    pub format: InstFormat,
}

/// I-type immediate: bits 31:20, sign-extended.
fn imm_i(inst: u32) -> i32 {
    (inst as i32) >> 20
}

/// S-type immediate: bits 31:25 and 11:7, sign-extended.
fn imm_s(inst: u32) -> i32 {
    ((inst & 0xFE00_0000) as i32 >> 20) | ((inst >> 7) & 0x1F) as i32
}

/// B-type immediate: bits 31|7|30:25|11:8, scaled by 2, sign-extended.
fn imm_b(inst: u32) -> i32 {
    ((inst & 0x8000_0000) as i32 >> 19)
        | (((inst >> 7) & 0x1) as i32) << 11
        | (((inst >> 25) & 0x3F) as i32) << 5
        | (((inst >> 8) & 0xF) as i32) << 1
}

/// U-type immediate: bits 31:12, already in position.
fn imm_u(inst: u32) -> i32 {
    (inst & 0xFFFF_F000) as i32
}

/// J-type immediate: bits 31|19:12|20|30:21, scaled by 2, sign-extended.
fn imm_j(inst: u32) -> i32 {
    ((inst & 0x8000_0000) as i32 >> 11)
        | (inst & 0x000F_F000) as i32
        | (((inst >> 20) & 0x1) as i32) << 11
        | (((inst >> 21) & 0x3FF) as i32) << 1
}

/// Decodes one 32-bit instruction word.
///
/// Returns the extracted fields, the format tag, and the sign-extended
/// immediate. Fails with [`Fault::IllegalInstruction`] if the major opcode is
/// not one of the recognized encodings.
pub fn decode(inst: u32) -> Result<Decoded, Fault> {
    let opcode = inst & 0x7F;

    let format = match opcode {
        rv64i::OP_REG | rv64i::OP_REG_32 => InstFormat::R,
        rv64i::OP_IMM | rv64i::OP_IMM_32 | rv64i::OP_LOAD | rv64i::OP_JALR => InstFormat::I,
        rv64i::OP_STORE => InstFormat::S,
        rv64i::OP_SYSTEM => InstFormat::I,
        rv64i::OP_BRANCH => InstFormat::B,
        rv64i::OP_LUI | rv64i::OP_AUIPC => InstFormat::U,
        rv64i::OP_JAL => InstFormat::J,
        fp::OP_FP => InstFormat::FpR,
        fp::OP_LOAD_FP => InstFormat::FpLoad,
        fp::OP_STORE_FP => InstFormat::FpStore,
        _ => return Err(Fault::IllegalInstruction(inst)),
    };

    let imm = match format {
        InstFormat::R | InstFormat::FpR => 0,
        InstFormat::I | InstFormat::FpLoad => imm_i(inst),
        InstFormat::S | InstFormat::FpStore => imm_s(inst),
        InstFormat::B => imm_b(inst),
        InstFormat::U => imm_u(inst),
        InstFormat::J => imm_j(inst),
    };

    Ok(Decoded {
        opcode,
        rd: ((inst >> 7) & 0x1F) as u8,
        funct3: ((inst >> 12) & 0x7) as u8,
        rs1: ((inst >> 15) & 0x1F) as u8,
        rs2: ((inst >> 20) & 0x1F) as u8,
        funct7: ((inst >> 25) & 0x7F) as u8,
        imm,
        format,
    })
}
