//! Execute (EX) stage.
//!
//! This stage performs the following:
//! 1. **Operand Resolution:** Applies the forwarding selections Decode made.
//! 2. **Arithmetic Execution:** Runs the ALU or FPU.
//! 3. **Jump Targets:** `PC + imm` for `JAL`, `(rs1 + imm) & !1` for `JALR`;
//!    the link value `PC + 4` becomes the writeback result.
//! 4. **Late Control Resolution:** Under predictor mode NONE every taken
//!    branch or jump raises a control hazard here; under the early-resolution
//!    modes only jumps whose predicted target was wrong (`JALR`, which is
//!    never predicted) do.

use log::trace;

use crate::config::Config;
use crate::core::pipeline::hazards::ForwardSource;
use crate::core::pipeline::latches::{ExMem, IdEx, MemWb};
use crate::core::units::alu::{logic, Alu};
use crate::core::units::fpu::Fpu;
use crate::core::pipeline::signals::AluOp;
use crate::stats::SimStats;

/// Mask clearing bit 0 of a `JALR` target.
const JALR_ALIGN_MASK: u64 = !1;

/// Resolves one operand through the forward mux.
///
/// `ExMem` selects the ALU result one stage ahead; `MemWb` selects the
/// writeback value two stages ahead (load data or ALU result).
fn forwarded(source: ForwardSource, regfile_value: u64, ex_mem: &ExMem, mem_wb: &MemWb) -> u64 {
    match source {
        ForwardSource::None => regfile_value,
        ForwardSource::ExMem => ex_mem.alu_result,
        ForwardSource::MemWb => {
            if mem_wb.ctrl.mem_to_reg {
                mem_wb.load_data
            } else {
                mem_wb.alu_result
            }
        }
    }
}

/// Executes the execute stage on the current ID/EX latch.
///
/// Reads the pre-commit EX/MEM and MEM/WB latches for forwarding.
pub fn execute_stage(
    id_ex: &IdEx,
    ex_mem: &ExMem,
    mem_wb: &MemWb,
    config: &Config,
    stats: &mut SimStats,
) -> ExMem {
    if !id_ex.valid {
        return ExMem::default();
    }

    let fwd1 = forwarded(id_ex.forward_a, id_ex.rv1, ex_mem, mem_wb);
    let fwd2 = forwarded(id_ex.forward_b, id_ex.rv2, ex_mem, mem_wb);
    stats.num_forwards += (id_ex.forward_a != ForwardSource::None) as u64
        + (id_ex.forward_b != ForwardSource::None) as u64;

    let ctrl = id_ex.ctrl;
    let imm64 = id_ex.imm as i64 as u64;

    let operand_a = match ctrl.alu_op {
        AluOp::Auipc => id_ex.pc,
        AluOp::Lui => 0,
        _ => fwd1,
    };
    let operand_b = if ctrl.alu_src { imm64 } else { fwd2 };

    let mut fp_flags = 0u8;
    let alu_result = if ctrl.jump {
        // Link value; the target is computed below.
        id_ex.pc.wrapping_add(4)
    } else if ctrl.alu_op.is_fp() {
        let (res, flags) = Fpu::execute(ctrl.alu_op, operand_a, operand_b, ctrl.is_double);
        fp_flags = flags.bits();
        res
    } else {
        let (res, _overflow) = Alu::execute(ctrl.alu_op, operand_a, operand_b);
        res
    };

    let mut result = ExMem {
        valid: true,
        inst: id_ex.inst,
        pc: id_ex.pc,
        seq: id_ex.seq,
        ctrl,
        rd: id_ex.rd,
        funct3: id_ex.funct3,
        alu_result: 0,
        store_data: fwd2,
        fp_flags,
        control_hazard: false,
        target_pc: 0,
    };

    let early = config.execution.branch_prediction.resolves_early();

    if ctrl.branch && !early {
        // Late resolution: the comparator output is the ALU result and the
        // fetch never predicted taken, so any taken branch flushes.
        let taken = logic::branch_taken(ctrl.alu_op, alu_result);
        if taken {
            stats.branch_mispredictions += 1;
            result.control_hazard = true;
            result.target_pc = id_ex.pc.wrapping_add(imm64);
            trace!(
                "EX  pc={:#x} branch taken, redirect to {:#x}",
                id_ex.pc,
                result.target_pc
            );
        } else {
            stats.branch_predictions += 1;
        }
    }

    if ctrl.jump {
        let actual_target = if ctrl.is_jal {
            id_ex.pc.wrapping_add(imm64)
        } else {
            fwd1.wrapping_add(imm64) & JALR_ALIGN_MASK
        };
        // Under the early-resolution modes JAL is predicted taken with the
        // exact target at Fetch, so it never redirects. JALR is never
        // predicted, and under mode NONE nothing is.
        let predicted_next = if early && ctrl.is_jal {
            actual_target
        } else {
            id_ex.pc.wrapping_add(4)
        };

        if actual_target != predicted_next {
            result.control_hazard = true;
            result.target_pc = actual_target;
            trace!(
                "EX  pc={:#x} jump redirect to {:#x}",
                id_ex.pc,
                actual_target
            );
        }
    }

    result.alu_result = alu_result;
    result
}
