//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the four registers carried between the 5-stage
//! pipeline: Fetch → Decode → Execute → Memory → Writeback.
//!
//! Each latch carries a `valid` bit (false = bubble), the original
//! instruction word and its fetch-order sequence id (display/tracing only),
//! the propagated control signals, and the data the downstream stage needs.
//! The default value of every latch is a bubble.

use crate::core::pipeline::hazards::ForwardSource;
use crate::core::pipeline::signals::ControlSignals;

/// The IF/ID pipeline latch (Fetch to Decode).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IfId {
    /// False marks a bubble; bubbles have no architectural effect.
    pub valid: bool,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Fetch-order sequence id, strictly monotonic across the run.
    pub seq: u64,
    /// Whether the predictor claimed this instruction taken at Fetch.
    pub pred_taken: bool,
    /// Predicted target address when `pred_taken` is set.
    pub pred_target: u64,
}

/// The ID/EX pipeline latch (Decode to Execute).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdEx {
    /// False marks a bubble.
    pub valid: bool,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Fetch-order sequence id.
    pub seq: u64,
    /// Control signals for the downstream stages.
    pub ctrl: ControlSignals,
    /// Destination register index.
    pub rd: u8,
    /// First source register index (kept for forwarding decisions).
    pub rs1: u8,
    /// Second source register index.
    pub rs2: u8,
    /// `funct3` field (memory access width, branch kind).
    pub funct3: u8,
    /// Sign-extended immediate.
    pub imm: i32,
    /// rs1 value read in Decode.
    pub rv1: u64,
    /// rs2 value read in Decode.
    pub rv2: u64,
    /// Forward mux selection for operand A, applied in Execute.
    pub forward_a: ForwardSource,
    /// Forward mux selection for operand B, applied in Execute.
    pub forward_b: ForwardSource,
    /// Early resolution found the Fetch-time prediction wrong.
    pub mispredicted: bool,
    /// Correct next PC when `mispredicted` is set.
    pub actual_target: u64,
}

/// The EX/MEM pipeline latch (Execute to Memory).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExMem {
    /// False marks a bubble.
    pub valid: bool,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Fetch-order sequence id.
    pub seq: u64,
    /// Control signals still relevant downstream.
    pub ctrl: ControlSignals,
    /// Destination register index.
    pub rd: u8,
    /// `funct3` field (memory access width).
    pub funct3: u8,
    /// ALU result, memory address, or link value.
    pub alu_result: u64,
    /// rs2 value carried for stores.
    pub store_data: u64,
    /// FP exception flags raised in Execute, accrued at Writeback.
    pub fp_flags: u8,
    /// Late branch/jump resolution demands a flush (predictor mode NONE,
    /// and JALR under every mode).
    pub control_hazard: bool,
    /// Redirect target when `control_hazard` is set.
    pub target_pc: u64,
}

/// The MEM/WB pipeline latch (Memory to Writeback).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemWb {
    /// False marks a bubble.
    pub valid: bool,
    /// Raw 32-bit instruction encoding.
    pub inst: u32,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Fetch-order sequence id.
    pub seq: u64,
    /// Control signals for the writeback mux.
    pub ctrl: ControlSignals,
    /// Destination register index.
    pub rd: u8,
    /// ALU result carried through.
    pub alu_result: u64,
    /// Data returned by a load.
    pub load_data: u64,
    /// FP exception flags to accrue into `fcsr`.
    pub fp_flags: u8,
}
