//! Single-cycle simulator variant.
//!
//! The trivial case of the pipeline: all four latches are bypassed and every
//! instruction fetches, decodes, executes, accesses memory, and writes back
//! within one cycle. The Memory and Writeback stage functions are reused by
//! feeding them transient latch values; the persistent latches stay bubbles.

use log::warn;

use crate::config::Config;
use crate::core::pipeline::control;
use crate::core::pipeline::engine::CycleEffects;
use crate::core::pipeline::latches::ExMem;
use crate::core::pipeline::signals::AluOp;
use crate::core::pipeline::stages::{memory_stage, writeback_stage};
use crate::core::units::alu::{logic, Alu};
use crate::core::units::fpu::Fpu;
use crate::core::Machine;
use crate::isa::decode;

/// Mask clearing bit 0 of a `JALR` target.
const JALR_ALIGN_MASK: u64 = !1;

/// Single-cycle execution state: just the display sequence counter.
pub struct SingleCycle {
    /// Next instruction sequence id.
    pub seq: u64,
}

impl SingleCycle {
    /// Creates the variant state.
    pub fn new() -> Self {
        Self { seq: 0 }
    }

    /// Executes one complete instruction.
    ///
    /// A fault anywhere turns the instruction into a no-op that still
    /// advances the PC and consumes a cycle, mirroring the pipeline's
    /// bubble-and-continue policy.
    pub fn step(&mut self, machine: &mut Machine, _config: &Config) -> CycleEffects {
        let no_effects = CycleEffects {
            wb_write: None,
            mem_write: None,
            instruction_retired: false,
        };

        let pc = machine.pc;
        machine.stats.cycles += 1;

        let inst = match machine.mem.read_u32(pc) {
            Ok(word) => word,
            Err(fault) => {
                warn!("fetch at pc={:#x} failed: {}", pc, fault);
                machine.pc = pc.wrapping_add(4);
                return no_effects;
            }
        };

        let seq = self.seq;
        self.seq += 1;

        let (d, ctrl) = match decode(inst).and_then(|d| control::generate(inst, &d).map(|c| (d, c)))
        {
            Ok(pair) => pair,
            Err(fault) => {
                warn!("decode at pc={:#x}: {}", pc, fault);
                machine.pc = pc.wrapping_add(4);
                return no_effects;
            }
        };

        let rv1 = if ctrl.rs1_fp {
            machine.regs.fpr.read(d.rs1 as usize)
        } else {
            machine.regs.gpr.read(d.rs1 as usize)
        };
        let rv2 = if ctrl.rs2_fp {
            machine.regs.fpr.read(d.rs2 as usize)
        } else {
            machine.regs.gpr.read(d.rs2 as usize)
        };

        let imm64 = d.imm as i64 as u64;
        let operand_a = match ctrl.alu_op {
            AluOp::Auipc => pc,
            AluOp::Lui => 0,
            _ => rv1,
        };
        let operand_b = if ctrl.alu_src { imm64 } else { rv2 };

        let mut fp_flags = 0u8;
        let alu_result = if ctrl.jump {
            pc.wrapping_add(4)
        } else if ctrl.alu_op.is_fp() {
            let (res, flags) = Fpu::execute(ctrl.alu_op, operand_a, operand_b, ctrl.is_double);
            fp_flags = flags.bits();
            res
        } else {
            Alu::execute(ctrl.alu_op, operand_a, operand_b).0
        };

        // Control flow resolves immediately; there is nothing to predict.
        let mut next_pc = pc.wrapping_add(4);
        if ctrl.branch {
            let taken = logic::branch_taken(ctrl.alu_op, alu_result);
            if taken {
                next_pc = pc.wrapping_add(imm64);
            }
        } else if ctrl.jump {
            next_pc = if ctrl.is_jal {
                pc.wrapping_add(imm64)
            } else {
                rv1.wrapping_add(imm64) & JALR_ALIGN_MASK
            };
        }

        // Feed the shared Memory and Writeback stages a transient latch.
        let ex_mem = ExMem {
            valid: true,
            inst,
            pc,
            seq,
            ctrl,
            rd: d.rd,
            funct3: d.funct3,
            alu_result,
            store_data: rv2,
            fp_flags,
            control_hazard: false,
            target_pc: 0,
        };
        let (mem_wb, mem_write) = memory_stage(&ex_mem, machine);
        let (wb_write, retired) = writeback_stage(&mem_wb, machine);

        if retired {
            machine.stats.instructions_retired += 1;
        }
        machine.pc = next_pc;

        CycleEffects {
            wb_write,
            mem_write,
            instruction_retired: retired,
        }
    }
}

impl Default for SingleCycle {
    fn default() -> Self {
        Self::new()
    }
}
