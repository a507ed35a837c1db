//! Memory (MEM) stage.
//!
//! Performs the load or store the EX/MEM latch requests. A memory fault
//! invalidates the output latch (the instruction becomes a bubble) and the
//! cycle continues. Stores record their pre-write bytes so the journal can
//! reverse them.

use log::error;

use crate::common::Fault;
use crate::core::pipeline::latches::{ExMem, MemWb};
use crate::core::units::fpu::nan_handling::box_f32;
use crate::core::Machine;
use crate::isa::opcodes::load_funct3;
use crate::journal::MemWrite;

/// Executes the memory stage on the current EX/MEM latch.
///
/// Returns the next MEM/WB latch and the reversible record of the store this
/// cycle performed, if any.
pub fn memory_stage(ex_mem: &ExMem, machine: &mut Machine) -> (MemWb, Option<MemWrite>) {
    let mut result = MemWb {
        valid: ex_mem.valid,
        inst: ex_mem.inst,
        pc: ex_mem.pc,
        seq: ex_mem.seq,
        ctrl: ex_mem.ctrl,
        rd: ex_mem.rd,
        alu_result: ex_mem.alu_result,
        load_data: 0,
        fp_flags: ex_mem.fp_flags,
    };

    if !ex_mem.valid {
        return (result, None);
    }

    let addr = ex_mem.alu_result;

    if ex_mem.ctrl.mem_read {
        let loaded = if ex_mem.ctrl.rd_fp {
            // FP loads: FLW NaN-boxes the 32-bit pattern, FLD is raw.
            if ex_mem.ctrl.is_double {
                machine.mem.read_u64(addr)
            } else {
                machine
                    .mem
                    .read_u32(addr)
                    .map(|w| box_f32(f32::from_bits(w)))
            }
        } else {
            match ex_mem.funct3 {
                load_funct3::LB => machine.mem.read_u8(addr).map(|v| v as i8 as i64 as u64),
                load_funct3::LH => machine.mem.read_u16(addr).map(|v| v as i16 as i64 as u64),
                load_funct3::LW => machine.mem.read_u32(addr).map(|v| v as i32 as i64 as u64),
                load_funct3::LD => machine.mem.read_u64(addr),
                load_funct3::LBU => machine.mem.read_u8(addr).map(u64::from),
                load_funct3::LHU => machine.mem.read_u16(addr).map(u64::from),
                load_funct3::LWU => machine.mem.read_u32(addr).map(u64::from),
                _ => Err(Fault::IllegalInstruction(ex_mem.inst)),
            }
        };

        match loaded {
            Ok(value) => result.load_data = value,
            Err(fault) => {
                error!("memory read at {:#x} failed: {}", addr, fault);
                result.valid = false;
                result.ctrl.reg_write = false;
                return (result, None);
            }
        }
    }

    let mut mem_write = None;
    if ex_mem.ctrl.mem_write {
        let width = 1usize << (ex_mem.funct3 & 0x3);
        let bytes = ex_mem.store_data.to_le_bytes();
        let new_bytes = bytes[..width].to_vec();

        let stored = match machine.mem.peek_bytes(addr, width) {
            Ok(old_bytes) => machine
                .mem
                .write_bytes(addr, &new_bytes)
                .map(|()| old_bytes),
            Err(fault) => Err(fault),
        };

        match stored {
            Ok(old_bytes) => {
                mem_write = Some(MemWrite {
                    address: addr,
                    old_bytes,
                    new_bytes,
                });
            }
            Err(fault) => {
                error!("memory write at {:#x} failed: {}", addr, fault);
                result.valid = false;
                result.ctrl.reg_write = false;
                return (result, None);
            }
        }
    }

    (result, mem_write)
}
