//! Data hazard detection and forwarding.
//!
//! This module implements the logic for maintaining pipeline consistency when
//! data dependencies exist between in-flight instructions. It provides:
//! 1. **Load-Use Detection:** Stalls the one case forwarding cannot fix.
//! 2. **Forward Selection:** Chooses the bypass source for each Execute operand.
//! 3. **RAW Stalls:** Full stalling when forwarding is disabled.
//! 4. **Branch Operand Checks:** Conservative stalls for early branch resolution.
//!
//! All checks compare the register index *and* the register file: a
//! floating-point consumer never hazards on an integer producer with the same
//! index. Checks run in Decode against the pre-commit (current-cycle) latch
//! values.

use crate::core::pipeline::latches::{ExMem, IdEx};

/// Bypass source for one Execute operand, selected in Decode.
///
/// Names follow where the producing result will sit when the consumer reaches
/// Execute one cycle later: a producer currently in ID/EX will then be in
/// EX/MEM, and a producer currently in EX/MEM will be in MEM/WB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ForwardSource {
    /// No bypass; the register-file value is current.
    #[default]
    None,
    /// Use `EX/MEM.alu_result` next cycle.
    ExMem,
    /// Use the MEM/WB writeback value next cycle.
    MemWb,
}

/// Stall and forward decisions made for one Decode cycle.
///
/// Captured into the cycle journal so a rewound cycle restores the exact
/// hazard picture the display showed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardState {
    /// Decode held IF/ID and injected a bubble this cycle.
    pub stall: bool,
    /// Bypass selection for operand A.
    pub forward_a: ForwardSource,
    /// Bypass selection for operand B.
    pub forward_b: ForwardSource,
}

/// True when the instruction in `id_ex` will write `reg` in file `fp`.
///
/// `x0` is never a hazard source; `f0` is an ordinary register.
fn id_ex_writes(id_ex: &IdEx, reg: u8, fp: bool) -> bool {
    id_ex.valid
        && id_ex.ctrl.reg_write
        && id_ex.ctrl.rd_fp == fp
        && id_ex.rd == reg
        && (fp || reg != 0)
}

/// True when the instruction in `ex_mem` will write `reg` in file `fp`.
fn ex_mem_writes(ex_mem: &ExMem, reg: u8, fp: bool) -> bool {
    ex_mem.valid
        && ex_mem.ctrl.reg_write
        && ex_mem.ctrl.rd_fp == fp
        && ex_mem.rd == reg
        && (fp || reg != 0)
}

/// Checks for a load-use hazard against the instruction being decoded.
///
/// A load in ID/EX whose destination matches one of the decoded source
/// operands (same register file) cannot be bypassed: its data only exists
/// after the Memory stage. The pipeline must stall one cycle; forwarding then
/// satisfies the dependency from MEM/WB.
pub fn need_stall_load_use(
    id_ex: &IdEx,
    rs1: u8,
    rs2: u8,
    rs1_fp: bool,
    rs2_fp: bool,
    uses_rs1: bool,
    uses_rs2: bool,
) -> bool {
    if !id_ex.valid || !id_ex.ctrl.mem_read {
        return false;
    }
    (uses_rs1 && id_ex_writes(id_ex, rs1, rs1_fp))
        || (uses_rs2 && id_ex_writes(id_ex, rs2, rs2_fp))
}

/// Checks for any read-after-write hazard when forwarding is disabled.
///
/// With the bypass network off, a matching writer in ID/EX or EX/MEM forces a
/// stall; Decode repeats the check each cycle until the writer has passed
/// Writeback (whose result is visible to Decode within the same cycle).
pub fn need_stall_raw(
    id_ex: &IdEx,
    ex_mem: &ExMem,
    rs1: u8,
    rs2: u8,
    rs1_fp: bool,
    rs2_fp: bool,
    uses_rs1: bool,
    uses_rs2: bool,
) -> bool {
    (uses_rs1 && (id_ex_writes(id_ex, rs1, rs1_fp) || ex_mem_writes(ex_mem, rs1, rs1_fp)))
        || (uses_rs2 && (id_ex_writes(id_ex, rs2, rs2_fp) || ex_mem_writes(ex_mem, rs2, rs2_fp)))
}

/// Selects the bypass source for one operand.
///
/// The nearest producer wins: a non-load writer currently in ID/EX (its
/// result will be in EX/MEM when consumed), else any writer currently in
/// EX/MEM (its result will be in MEM/WB when consumed, loads included).
/// A load currently in ID/EX is *not* a bypass source; callers must check
/// [`need_stall_load_use`] first.
pub fn forward_source(id_ex: &IdEx, ex_mem: &ExMem, reg: u8, fp: bool) -> ForwardSource {
    if id_ex_writes(id_ex, reg, fp) && !id_ex.ctrl.mem_read {
        ForwardSource::ExMem
    } else if ex_mem_writes(ex_mem, reg, fp) {
        ForwardSource::MemWb
    } else {
        ForwardSource::None
    }
}

/// Checks whether early branch resolution must wait for its operands.
///
/// Conservative by design: any in-flight writer in ID/EX (ALU result not yet
/// computed when Decode runs) and any load in EX/MEM (data not yet read)
/// stall the resolution. Only a completed ALU result sitting in EX/MEM can be
/// consumed, via [`branch_operand`].
pub fn need_stall_branch(
    id_ex: &IdEx,
    ex_mem: &ExMem,
    rs1: u8,
    rs2: u8,
    uses_rs2: bool,
) -> bool {
    let blocked = |reg: u8| -> bool {
        id_ex_writes(id_ex, reg, false)
            || (ex_mem_writes(ex_mem, reg, false) && ex_mem.ctrl.mem_read)
    };
    blocked(rs1) || (uses_rs2 && blocked(rs2))
}

/// Resolves one branch operand in Decode, bypassing from EX/MEM when its ALU
/// result satisfies the dependency.
///
/// Returns the value and whether a bypass was used (for the forward counter).
pub fn branch_operand(ex_mem: &ExMem, reg: u8, regfile_value: u64) -> (u64, bool) {
    if ex_mem_writes(ex_mem, reg, false) && !ex_mem.ctrl.mem_read {
        (ex_mem.alu_result, true)
    } else {
        (regfile_value, false)
    }
}
