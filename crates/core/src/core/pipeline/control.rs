//! Control-signal generation.
//!
//! Deterministic mapping from a decoded instruction to the pipeline control
//! bits. This is the single place that knows which operands live in which
//! register file: FP loads and stores read their base address from a GPR,
//! `FCVT`/`FMV` int-to-float forms read a GPR source, and `FCVT`/`FMV`/`FCMP`
//! float-to-int forms write a GPR destination.

use crate::common::Fault;
use crate::isa::opcodes::{
    alu_funct3, alu_funct7, branch_funct3, fp, fp_funct3, fp_funct7, fp_width, load_funct3,
    m_funct3, rv64i, store_funct3,
};
use crate::isa::Decoded;
use crate::core::pipeline::signals::{AluOp, ControlSignals};

/// Selects the integer ALU operation for OP / OP-IMM encodings.
///
/// `reg_reg` enables the funct7-distinguished forms (SUB, SRA, M extension);
/// `word` selects the 32-bit `W` variants.
fn int_alu_op(d: &Decoded, reg_reg: bool, word: bool) -> Result<AluOp, Fault> {
    if reg_reg && d.funct7 == alu_funct7::MULDIV {
        let op = match d.funct3 {
            m_funct3::MUL => {
                if word {
                    AluOp::Mulw
                } else {
                    AluOp::Mul
                }
            }
            m_funct3::MULH if !word => AluOp::Mulh,
            m_funct3::MULHSU if !word => AluOp::Mulhsu,
            m_funct3::MULHU if !word => AluOp::Mulhu,
            m_funct3::DIV => {
                if word {
                    AluOp::Divw
                } else {
                    AluOp::Div
                }
            }
            m_funct3::DIVU => {
                if word {
                    AluOp::Divuw
                } else {
                    AluOp::Divu
                }
            }
            m_funct3::REM => {
                if word {
                    AluOp::Remw
                } else {
                    AluOp::Rem
                }
            }
            m_funct3::REMU => {
                if word {
                    AluOp::Remuw
                } else {
                    AluOp::Remu
                }
            }
            _ => return Err(Fault::IllegalInstruction(0)),
        };
        return Ok(op);
    }

    // Bit 5 of funct7 selects the alternate encoding (SUB, SRA). For
    // immediate shifts on RV64 the low funct7 bit is part of the shamt, so
    // only that bit is tested.
    let alt = d.funct7 & alu_funct7::ALT != 0;

    let op = match d.funct3 {
        alu_funct3::ADD_SUB => {
            if reg_reg && alt {
                if word {
                    AluOp::Subw
                } else {
                    AluOp::Sub
                }
            } else if word {
                AluOp::Addw
            } else {
                AluOp::Add
            }
        }
        alu_funct3::SLL => {
            if word {
                AluOp::Sllw
            } else {
                AluOp::Sll
            }
        }
        alu_funct3::SLT if !word => AluOp::Slt,
        alu_funct3::SLTU if !word => AluOp::Sltu,
        alu_funct3::XOR if !word => AluOp::Xor,
        alu_funct3::SRL_SRA => {
            if alt {
                if word {
                    AluOp::Sraw
                } else {
                    AluOp::Sra
                }
            } else if word {
                AluOp::Srlw
            } else {
                AluOp::Srl
            }
        }
        alu_funct3::OR if !word => AluOp::Or,
        alu_funct3::AND if !word => AluOp::And,
        _ => return Err(Fault::IllegalInstruction(0)),
    };
    Ok(op)
}

/// Selects the operation and register-file routing for OP-FP encodings.
fn fp_alu_op(d: &Decoded, c: &mut ControlSignals) -> Result<AluOp, Fault> {
    // Both source operands default to the FPR file; the conversion and move
    // groups below override the side that crosses into the GPR file.
    c.rs1_fp = true;
    c.rs2_fp = true;
    c.rd_fp = true;
    c.reg_write = true;

    let group = d.funct7 & !1;
    let op = match group {
        fp_funct7::FADD => AluOp::FAdd,
        fp_funct7::FSUB => AluOp::FSub,
        fp_funct7::FMUL => AluOp::FMul,
        fp_funct7::FDIV => AluOp::FDiv,
        fp_funct7::FSQRT => AluOp::FSqrt,
        fp_funct7::FSGNJ => match d.funct3 {
            fp_funct3::FSGNJ => AluOp::FSgnJ,
            fp_funct3::FSGNJN => AluOp::FSgnJN,
            fp_funct3::FSGNJX => AluOp::FSgnJX,
            _ => return Err(Fault::IllegalInstruction(0)),
        },
        fp_funct7::FMIN_MAX => match d.funct3 {
            fp_funct3::FMIN => AluOp::FMin,
            fp_funct3::FMAX => AluOp::FMax,
            _ => return Err(Fault::IllegalInstruction(0)),
        },
        fp_funct7::FCMP => {
            c.rd_fp = false;
            match d.funct3 {
                fp_funct3::FEQ => AluOp::FEq,
                fp_funct3::FLT => AluOp::FLt,
                fp_funct3::FLE => AluOp::FLe,
                _ => return Err(Fault::IllegalInstruction(0)),
            }
        }
        fp_funct7::FCVT_FMT => {
            // Destination format is in funct7; source format is in rs2.
            if d.funct7 & 1 == 0 {
                AluOp::FCvtSD
            } else {
                AluOp::FCvtDS
            }
        }
        fp_funct7::FCVT_INT_FP => {
            c.rd_fp = false;
            if d.rs2 < 2 {
                AluOp::FCvtWF
            } else {
                AluOp::FCvtLF
            }
        }
        fp_funct7::FCVT_FP_INT => {
            c.rs1_fp = false;
            if d.rs2 < 2 {
                AluOp::FCvtFW
            } else {
                AluOp::FCvtFL
            }
        }
        fp_funct7::FMV_X_FCLASS => {
            c.rd_fp = false;
            match d.funct3 {
                fp_funct3::FMV => AluOp::FMvXF,
                fp_funct3::FCLASS => AluOp::FClass,
                _ => return Err(Fault::IllegalInstruction(0)),
            }
        }
        fp_funct7::FMV_F_X => {
            c.rs1_fp = false;
            AluOp::FMvFX
        }
        _ => return Err(Fault::IllegalInstruction(0)),
    };
    Ok(op)
}

/// Generates the control signals for one decoded instruction.
///
/// Fails with [`Fault::IllegalInstruction`] on an unrecognized funct-field
/// combination; Decode converts that into a bubble.
pub fn generate(inst: u32, d: &Decoded) -> Result<ControlSignals, Fault> {
    let mut c = ControlSignals::default();

    match d.opcode {
        rv64i::OP_LUI => {
            c.reg_write = true;
            c.alu_src = true;
            c.alu_op = AluOp::Lui;
        }
        rv64i::OP_AUIPC => {
            c.reg_write = true;
            c.alu_src = true;
            c.alu_op = AluOp::Auipc;
        }
        rv64i::OP_JAL => {
            c.reg_write = true;
            c.jump = true;
            c.is_jal = true;
        }
        rv64i::OP_JALR => {
            c.reg_write = true;
            c.jump = true;
        }
        rv64i::OP_BRANCH => {
            c.branch = true;
            c.alu_op = match d.funct3 {
                branch_funct3::BEQ => AluOp::Beq,
                branch_funct3::BNE => AluOp::Bne,
                branch_funct3::BLT => AluOp::Blt,
                branch_funct3::BGE => AluOp::Bge,
                branch_funct3::BLTU => AluOp::Bltu,
                branch_funct3::BGEU => AluOp::Bgeu,
                _ => return Err(Fault::IllegalInstruction(inst)),
            };
        }
        rv64i::OP_LOAD => {
            c.reg_write = true;
            c.mem_read = true;
            c.mem_to_reg = true;
            c.alu_src = true;
            c.alu_op = AluOp::Add;
            if d.funct3 > load_funct3::LWU {
                return Err(Fault::IllegalInstruction(inst));
            }
        }
        rv64i::OP_STORE => {
            c.mem_write = true;
            c.alu_src = true;
            c.alu_op = AluOp::Add;
            if d.funct3 > store_funct3::SD {
                return Err(Fault::IllegalInstruction(inst));
            }
        }
        rv64i::OP_IMM => {
            c.reg_write = true;
            c.alu_src = true;
            c.alu_op = int_alu_op(d, false, false).map_err(|_| Fault::IllegalInstruction(inst))?;
        }
        rv64i::OP_IMM_32 => {
            c.reg_write = true;
            c.alu_src = true;
            c.alu_op = int_alu_op(d, false, true).map_err(|_| Fault::IllegalInstruction(inst))?;
        }
        rv64i::OP_REG => {
            c.reg_write = true;
            c.alu_op = int_alu_op(d, true, false).map_err(|_| Fault::IllegalInstruction(inst))?;
        }
        rv64i::OP_REG_32 => {
            c.reg_write = true;
            c.alu_op = int_alu_op(d, true, true).map_err(|_| Fault::IllegalInstruction(inst))?;
        }
        fp::OP_LOAD_FP => {
            c.reg_write = true;
            c.rd_fp = true;
            c.mem_read = true;
            c.mem_to_reg = true;
            c.alu_src = true;
            c.alu_op = AluOp::Add;
            c.is_double = match d.funct3 {
                fp_width::WORD => false,
                fp_width::DOUBLE => true,
                _ => return Err(Fault::IllegalInstruction(inst)),
            };
        }
        fp::OP_STORE_FP => {
            c.mem_write = true;
            c.rs2_fp = true;
            c.alu_src = true;
            c.alu_op = AluOp::Add;
            c.is_double = match d.funct3 {
                fp_width::WORD => false,
                fp_width::DOUBLE => true,
                _ => return Err(Fault::IllegalInstruction(inst)),
            };
        }
        fp::OP_FP => {
            c.is_double = d.funct7 & 1 == 1;
            c.alu_op = fp_alu_op(d, &mut c).map_err(|_| Fault::IllegalInstruction(inst))?;
        }
        rv64i::OP_SYSTEM => {
            // ECALL/EBREAK retire with no architectural effect.
        }
        _ => return Err(Fault::IllegalInstruction(inst)),
    }

    Ok(c)
}
