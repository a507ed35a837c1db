//! Pipeline engine: cycle orchestration, latching discipline, steering.
//!
//! Each cycle computes the next value of every latch from the current values
//! and the architectural state, then commits all four latches
//! simultaneously. The stages run in the order WB, MEM, EX, ID, IF so that
//! Writeback's register update is observable to Decode of the same cycle;
//! stages that inspect downstream latches (hazard detection, forwarding
//! selection) read the pre-commit values.
//!
//! After the next latches are computed, the steering policy resolves the
//! final PC and IF/ID in priority order:
//! 1. Late control hazard from Execute - redirect, flush two slots
//!    (the older instruction's resolution is authoritative).
//! 2. Early misprediction from Decode - redirect, flush one slot, refetch.
//! 3. Stall from Decode - hold PC and IF/ID, bubble into ID/EX.

use crate::config::Config;
use crate::core::pipeline::hazards::HazardState;
use crate::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb};
use crate::core::pipeline::stages::{
    decode_stage, execute_stage, fetch_stage, memory_stage, writeback_stage, DecodeOutcome,
};
use crate::core::units::bru::PredictorWrapper;
use crate::core::Machine;
use crate::journal::{MemWrite, WbWrite};

/// Externally visible side effects of one cycle, for the journal.
pub struct CycleEffects {
    /// The register write the cycle performed, if any.
    pub wb_write: Option<WbWrite>,
    /// The memory write the cycle performed, if any.
    pub mem_write: Option<MemWrite>,
    /// MEM/WB held a real instruction at cycle entry.
    pub instruction_retired: bool,
}

/// The 5-stage pipeline: four latches, the predictor, and the fetch
/// sequence counter.
pub struct Pipeline {
    /// IF/ID latch.
    pub if_id: IfId,
    /// ID/EX latch.
    pub id_ex: IdEx,
    /// EX/MEM latch.
    pub ex_mem: ExMem,
    /// MEM/WB latch.
    pub mem_wb: MemWb,
    /// Branch predictor selected by the configuration.
    pub predictor: PredictorWrapper,
    /// Next fetch sequence id. Monotonic for the lifetime of the simulator;
    /// only `Reset` rewinds it.
    pub seq: u64,
    /// Stall/forward picture of the last completed cycle.
    pub hazard: HazardState,
}

impl Pipeline {
    /// Creates an empty pipeline for the configured prediction mode.
    pub fn new(config: &Config) -> Self {
        Self {
            if_id: IfId::default(),
            id_ex: IdEx::default(),
            ex_mem: ExMem::default(),
            mem_wb: MemWb::default(),
            predictor: PredictorWrapper::new(config.execution.branch_prediction),
            seq: 0,
            hazard: HazardState::default(),
        }
    }

    /// True when no latch carries a real instruction.
    pub fn drained(&self) -> bool {
        !self.if_id.valid && !self.id_ex.valid && !self.ex_mem.valid && !self.mem_wb.valid
    }

    /// Advances the machine by one cycle.
    ///
    /// Configuration takes effect here, at the cycle boundary: the value
    /// passed in governs the whole cycle.
    pub fn step(&mut self, machine: &mut Machine, config: &Config) -> CycleEffects {
        // 1. Writeback, on the current MEM/WB latch.
        let (wb_write, instruction_retired) = writeback_stage(&self.mem_wb, machine);

        // 2. Memory, on the current EX/MEM latch.
        let (next_mem_wb, mem_write) = memory_stage(&self.ex_mem, machine);

        // 3. Execute, on the current ID/EX latch; forwards from the
        //    pre-commit EX/MEM and MEM/WB latches.
        let next_ex_mem = execute_stage(
            &self.id_ex,
            &self.ex_mem,
            &self.mem_wb,
            config,
            &mut machine.stats,
        );

        // 4. Decode, on the current IF/ID latch; hazard checks read the
        //    pre-commit ID/EX and EX/MEM latches.
        let decode_out = decode_stage(
            &self.if_id,
            &self.id_ex,
            &self.ex_mem,
            machine,
            &mut self.predictor,
            config,
        );

        // 5. Fetch, unless Decode held IF/ID this cycle.
        let stalled = matches!(decode_out, DecodeOutcome::Stall);
        let (mut next_id_ex, mut next_if_id, mut next_pc) = match decode_out {
            DecodeOutcome::Stall => {
                machine.stats.stall_cycles += 1;
                (IdEx::default(), self.if_id.clone(), machine.pc)
            }
            DecodeOutcome::Advance(latch) => {
                let fetched = fetch_stage(machine, &self.predictor, &mut self.seq, machine.pc);
                (latch, fetched.latch, fetched.next_pc)
            }
        };

        // Steering. A late control hazard outranks an early misprediction
        // and a stall: the instruction in Execute is the oldest.
        if next_ex_mem.control_hazard {
            next_pc = next_ex_mem.target_pc;
            next_id_ex = IdEx::default();
            next_if_id = IfId::default();
            machine.stats.stall_cycles += 2;
        } else if next_id_ex.mispredicted {
            let target = next_id_ex.actual_target;
            next_id_ex = IdEx::default();
            let refetched = fetch_stage(machine, &self.predictor, &mut self.seq, target);
            next_if_id = refetched.latch;
            next_pc = refetched.next_pc;
            machine.stats.stall_cycles += 1;
        }

        self.hazard = HazardState {
            stall: stalled,
            forward_a: next_id_ex.forward_a,
            forward_b: next_id_ex.forward_b,
        };

        // Commit all four latches simultaneously.
        self.if_id = next_if_id;
        self.id_ex = next_id_ex;
        self.ex_mem = next_ex_mem;
        self.mem_wb = next_mem_wb;
        machine.pc = next_pc;

        machine.stats.cycles += 1;
        if instruction_retired {
            machine.stats.instructions_retired += 1;
        }

        CycleEffects {
            wb_write,
            mem_write,
            instruction_retired,
        }
    }
}
