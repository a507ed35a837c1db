//! Writeback (WB) stage.
//!
//! Commits the MEM/WB latch to the register file, accrues FP exception flags
//! into `fcsr`, and reports whether an instruction retired. The write is
//! recorded with its pre-write value so the journal can reverse it.

use crate::core::Machine;
use crate::journal::{RegKind, WbWrite};
use crate::core::pipeline::latches::MemWb;

/// Executes the writeback stage on the current MEM/WB latch.
///
/// Returns the reversible record of the register write, and whether the latch
/// held a real instruction (the retire signal).
pub fn writeback_stage(mem_wb: &MemWb, machine: &mut Machine) -> (Option<WbWrite>, bool) {
    if !mem_wb.valid {
        return (None, false);
    }

    if mem_wb.fp_flags != 0 {
        machine.regs.csr.accrue_fflags(mem_wb.fp_flags);
    }

    let mut wb_write = None;
    if mem_wb.ctrl.reg_write {
        let value = if mem_wb.ctrl.mem_to_reg {
            mem_wb.load_data
        } else {
            mem_wb.alu_result
        };

        if mem_wb.ctrl.rd_fp {
            let old_value = machine.regs.fpr.read(mem_wb.rd as usize);
            machine.regs.fpr.write(mem_wb.rd as usize, value);
            wb_write = Some(WbWrite {
                kind: RegKind::Fpr,
                index: mem_wb.rd,
                old_value,
                new_value: value,
            });
        } else if mem_wb.rd != 0 {
            // Writes to x0 are dropped and leave no record.
            let old_value = machine.regs.gpr.read(mem_wb.rd as usize);
            machine.regs.gpr.write(mem_wb.rd as usize, value);
            wb_write = Some(WbWrite {
                kind: RegKind::Gpr,
                index: mem_wb.rd,
                old_value,
                new_value: value,
            });
        }
    }

    (wb_write, true)
}
