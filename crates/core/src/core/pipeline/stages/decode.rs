//! Instruction Decode (ID) stage.
//!
//! This stage performs the following:
//! 1. **Decoding:** Expands the raw word (decoder + control generator).
//! 2. **Hazard Detection:** Load-use always stalls; with forwarding disabled
//!    any in-flight writer stalls.
//! 3. **Register Read:** Reads rs1/rs2, observing the same-cycle Writeback
//!    update (the engine runs WB before ID).
//! 4. **Forward Selection:** Chooses the Execute bypass source per operand.
//! 5. **Early Branch Resolution:** Under non-NONE prediction modes the
//!    conditional-branch comparator runs here against forwarded operands and
//!    the Fetch-time prediction is verified.
//!
//! Hazard checks read the *pre-commit* ID/EX and EX/MEM values, i.e. the
//! latches as they stood at cycle entry.

use log::{trace, warn};

use crate::config::Config;
use crate::core::pipeline::control;
use crate::core::pipeline::hazards::{
    self, branch_operand, need_stall_branch, need_stall_load_use, need_stall_raw, ForwardSource,
};
use crate::core::pipeline::latches::{ExMem, IdEx, IfId};
use crate::core::pipeline::signals::{AluOp, ControlSignals};
use crate::core::units::alu::{logic, Alu};
use crate::core::units::bru::{BranchPredictor, PredictorWrapper};
use crate::core::Machine;
use crate::isa::{decode, InstFormat};

/// Decision of one Decode cycle.
pub enum DecodeOutcome {
    /// Hold IF/ID, inject a bubble into ID/EX, repeat next cycle.
    Stall,
    /// Commit this latch into ID/EX and let Fetch proceed.
    Advance(IdEx),
}

/// True when the instruction actually reads rs1 as a register operand.
fn reads_rs1(format: InstFormat) -> bool {
    !matches!(format, InstFormat::U | InstFormat::J)
}

/// True when the instruction actually reads rs2 as a register operand.
///
/// For I-type encodings the rs2 bits belong to the immediate, and for the
/// one-operand OP-FP forms (sqrt, conversions, moves, classify) the rs2
/// field selects the operation, so treating it as a source would fabricate
/// hazards.
fn reads_rs2(format: InstFormat, ctrl: &ControlSignals) -> bool {
    match format {
        InstFormat::R | InstFormat::S | InstFormat::B | InstFormat::FpStore => true,
        InstFormat::FpR => matches!(
            ctrl.alu_op,
            AluOp::FAdd
                | AluOp::FSub
                | AluOp::FMul
                | AluOp::FDiv
                | AluOp::FMin
                | AluOp::FMax
                | AluOp::FSgnJ
                | AluOp::FSgnJN
                | AluOp::FSgnJX
                | AluOp::FEq
                | AluOp::FLt
                | AluOp::FLe
        ),
        _ => false,
    }
}

/// Executes the decode stage on the current IF/ID latch.
///
/// Takes the machine mutably only for the prediction counters; architectural
/// state is read-only here.
pub fn decode_stage(
    if_id: &IfId,
    id_ex: &IdEx,
    ex_mem: &ExMem,
    machine: &mut Machine,
    predictor: &mut PredictorWrapper,
    config: &Config,
) -> DecodeOutcome {
    if !if_id.valid {
        return DecodeOutcome::Advance(IdEx::default());
    }

    let d = match decode(if_id.inst) {
        Ok(d) => d,
        Err(fault) => {
            warn!("decode at pc={:#x}: {}", if_id.pc, fault);
            return DecodeOutcome::Advance(IdEx::default());
        }
    };

    let ctrl = match control::generate(if_id.inst, &d) {
        Ok(c) => c,
        Err(fault) => {
            warn!("control at pc={:#x}: {}", if_id.pc, fault);
            return DecodeOutcome::Advance(IdEx::default());
        }
    };

    let uses_rs1 = reads_rs1(d.format);
    let uses_rs2 = reads_rs2(d.format, &ctrl);
    let early = config.execution.branch_prediction.resolves_early();

    if config.execution.hazard_detection {
        if need_stall_load_use(
            id_ex,
            d.rs1,
            d.rs2,
            ctrl.rs1_fp,
            ctrl.rs2_fp,
            uses_rs1,
            uses_rs2,
        ) {
            trace!("ID  pc={:#x} load-use stall", if_id.pc);
            return DecodeOutcome::Stall;
        }

        if !config.execution.forwarding
            && need_stall_raw(
                id_ex,
                ex_mem,
                d.rs1,
                d.rs2,
                ctrl.rs1_fp,
                ctrl.rs2_fp,
                uses_rs1,
                uses_rs2,
            )
        {
            trace!("ID  pc={:#x} RAW stall (forwarding off)", if_id.pc);
            return DecodeOutcome::Stall;
        }

        // Early branch resolution is conservative: any in-flight ID/EX
        // writer of a branch operand stalls, even when an EX/MEM ALU result
        // could have satisfied the subcase.
        if ctrl.branch && early && need_stall_branch(id_ex, ex_mem, d.rs1, d.rs2, uses_rs2) {
            trace!("ID  pc={:#x} branch operand stall", if_id.pc);
            return DecodeOutcome::Stall;
        }
    }

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

    let (forward_a, forward_b) = if config.execution.forwarding {
        let a = if uses_rs1 {
            hazards::forward_source(id_ex, ex_mem, d.rs1, ctrl.rs1_fp)
        } else {
            ForwardSource::None
        };
        let b = if uses_rs2 {
            hazards::forward_source(id_ex, ex_mem, d.rs2, ctrl.rs2_fp)
        } else {
            ForwardSource::None
        };
        (a, b)
    } else {
        (ForwardSource::None, ForwardSource::None)
    };

    let mut latch = IdEx {
        valid: true,
        inst: if_id.inst,
        pc: if_id.pc,
        seq: if_id.seq,
        ctrl,
        rd: d.rd,
        rs1: d.rs1,
        rs2: d.rs2,
        funct3: d.funct3,
        imm: d.imm,
        rv1,
        rv2,
        forward_a,
        forward_b,
        mispredicted: false,
        actual_target: 0,
    };

    if ctrl.branch && early {
        let (v1, fwd1) = if config.execution.forwarding {
            branch_operand(ex_mem, d.rs1, rv1)
        } else {
            (rv1, false)
        };
        let (v2, fwd2) = if config.execution.forwarding {
            branch_operand(ex_mem, d.rs2, rv2)
        } else {
            (rv2, false)
        };
        machine.stats.num_forwards += fwd1 as u64 + fwd2 as u64;

        let (cmp, _) = Alu::execute(ctrl.alu_op, v1, v2);
        let taken = logic::branch_taken(ctrl.alu_op, cmp);

        predictor.update(if_id.pc, taken);

        let fallthrough = if_id.pc.wrapping_add(4);
        let actual_next = if taken {
            if_id.pc.wrapping_add(d.imm as i64 as u64)
        } else {
            fallthrough
        };
        let predicted_next = if if_id.pred_taken {
            if_id.pred_target
        } else {
            fallthrough
        };

        if actual_next != predicted_next {
            machine.stats.branch_mispredictions += 1;
            latch.mispredicted = true;
            latch.actual_target = actual_next;
        } else {
            machine.stats.branch_predictions += 1;
        }
    }

    DecodeOutcome::Advance(latch)
}
