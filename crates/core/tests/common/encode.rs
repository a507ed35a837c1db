//! RISC-V instruction word encoders for inline test programs.
//!
//! Only the forms the tests use; offsets are signed byte offsets relative to
//! the instruction's own address.

/// Encodes an R-type word.
pub fn encode_r(opcode: u32, rd: u32, funct3: u32, rs1: u32, rs2: u32, funct7: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

/// Encodes an I-type word.
pub fn encode_i(opcode: u32, rd: u32, funct3: u32, rs1: u32, imm: i32) -> u32 {
    ((imm as u32 & 0xFFF) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

/// Encodes an S-type word.
pub fn encode_s(opcode: u32, funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    let imm = imm as u32;
    ((imm >> 5 & 0x7F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | ((imm & 0x1F) << 7)
        | opcode
}

/// Encodes a B-type word from a signed byte offset.
pub fn encode_b(funct3: u32, rs1: u32, rs2: u32, offset: i32) -> u32 {
    let imm = offset as u32;
    ((imm >> 12 & 0x1) << 31)
        | ((imm >> 5 & 0x3F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | ((imm >> 1 & 0xF) << 8)
        | ((imm >> 11 & 0x1) << 7)
        | 0x63
}

/// Encodes a U-type word; `imm` is the value for bits 31:12.
pub fn encode_u(opcode: u32, rd: u32, imm: u32) -> u32 {
    (imm << 12) | (rd << 7) | opcode
}

/// Encodes a J-type word from a signed byte offset.
pub fn encode_j(rd: u32, offset: i32) -> u32 {
    let imm = offset as u32;
    ((imm >> 20 & 0x1) << 31)
        | ((imm >> 1 & 0x3FF) << 21)
        | ((imm >> 11 & 0x1) << 20)
        | ((imm >> 12 & 0xFF) << 12)
        | (rd << 7)
        | 0x6F
}

pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    encode_i(0x13, rd, 0b000, rs1, imm)
}

pub fn add(rd: u32, rs1: u32, rs2: u32) -> u32 {
    encode_r(0x33, rd, 0b000, rs1, rs2, 0b0000000)
}

pub fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 {
    encode_r(0x33, rd, 0b000, rs1, rs2, 0b0100000)
}

pub fn mul(rd: u32, rs1: u32, rs2: u32) -> u32 {
    encode_r(0x33, rd, 0b000, rs1, rs2, 0b0000001)
}

pub fn lui(rd: u32, imm: u32) -> u32 {
    encode_u(0x37, rd, imm)
}

pub fn auipc(rd: u32, imm: u32) -> u32 {
    encode_u(0x17, rd, imm)
}

pub fn lw(rd: u32, rs1: u32, offset: i32) -> u32 {
    encode_i(0x03, rd, 0b010, rs1, offset)
}

pub fn ld(rd: u32, rs1: u32, offset: i32) -> u32 {
    encode_i(0x03, rd, 0b011, rs1, offset)
}

pub fn sb(rs2: u32, rs1: u32, offset: i32) -> u32 {
    encode_s(0x23, 0b000, rs1, rs2, offset)
}

pub fn sw(rs2: u32, rs1: u32, offset: i32) -> u32 {
    encode_s(0x23, 0b010, rs1, rs2, offset)
}

pub fn sd(rs2: u32, rs1: u32, offset: i32) -> u32 {
    encode_s(0x23, 0b011, rs1, rs2, offset)
}

pub fn beq(rs1: u32, rs2: u32, offset: i32) -> u32 {
    encode_b(0b000, rs1, rs2, offset)
}

pub fn bne(rs1: u32, rs2: u32, offset: i32) -> u32 {
    encode_b(0b001, rs1, rs2, offset)
}

pub fn blt(rs1: u32, rs2: u32, offset: i32) -> u32 {
    encode_b(0b100, rs1, rs2, offset)
}

pub fn jal(rd: u32, offset: i32) -> u32 {
    encode_j(rd, offset)
}

pub fn jalr(rd: u32, rs1: u32, offset: i32) -> u32 {
    encode_i(0x67, rd, 0b000, rs1, offset)
}

pub fn ebreak() -> u32 {
    0x00100073
}
