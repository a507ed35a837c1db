//! Reversible-execution journal.
//!
//! This module records one [`CycleDelta`] per completed cycle so execution
//! can be rewound and replayed at cycle granularity. It provides:
//! 1. **Snapshots:** Old and new values of the PC, all four latches, the
//!    hazard/forward state, the sequence counter, and the cycle counters.
//! 2. **Side-Effect Records:** At most one register write and one memory
//!    write per cycle, with their pre-write values, so the cycle's effect on
//!    the observable machine is fully reversible.
//! 3. **Two Stacks:** Executed cycles on the undo stack, rewound cycles on
//!    the redo stack. Any forward cycle clears the redo stack
//!    (single-timeline divergence rule).
//!
//! The undo stack may be bounded as a sliding window, trading memory for a
//! horizon on reversibility.

use std::collections::VecDeque;

use thiserror::Error;

use crate::core::pipeline::hazards::HazardState;
use crate::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb};
use crate::stats::SimStats;

/// Which register file a writeback touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegKind {
    /// Integer register file.
    Gpr,
    /// Floating-point register file.
    Fpr,
}

/// Record of the single register-file write a cycle performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WbWrite {
    /// Register file written.
    pub kind: RegKind,
    /// Register index.
    pub index: u8,
    /// Value the slot held before the write.
    pub old_value: u64,
    /// Value the write installed.
    pub new_value: u64,
}

/// Record of the single memory write a cycle performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemWrite {
    /// Byte address of the store.
    pub address: u64,
    /// Bytes the location held before the store.
    pub old_bytes: Vec<u8>,
    /// Bytes the store installed.
    pub new_bytes: Vec<u8>,
}

/// Everything outside the register file and memory that a cycle can change.
///
/// Captured twice per cycle (entry and exit); restoring one of the two makes
/// the non-array machine state bitwise identical to that instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineSnapshot {
    /// Architectural program counter.
    pub pc: u64,
    /// IF/ID latch.
    pub if_id: IfId,
    /// ID/EX latch.
    pub id_ex: IdEx,
    /// EX/MEM latch.
    pub ex_mem: ExMem,
    /// MEM/WB latch.
    pub mem_wb: MemWb,
    /// Stall and forward decisions of the cycle.
    pub hazard: HazardState,
    /// Fetch sequence counter.
    pub seq: u64,
    /// `fcsr` contents (FP flags accrue at Writeback).
    pub fcsr: u64,
    /// All performance counters.
    pub stats: SimStats,
}

/// One completed cycle, reversibly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleDelta {
    /// State at cycle entry.
    pub old: MachineSnapshot,
    /// State at cycle exit.
    pub new: MachineSnapshot,
    /// The register write the cycle performed, if any.
    pub wb_write: Option<WbWrite>,
    /// The memory write the cycle performed, if any.
    pub mem_write: Option<MemWrite>,
    /// Whether MEM/WB held a real instruction at cycle entry (the cycle
    /// retired an instruction).
    pub instruction_retired: bool,
}

/// Benign history-navigation failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The undo stack is empty.
    #[error("no more undo")]
    NoMoreUndo,
    /// The redo stack is empty.
    #[error("no more redo")]
    NoMoreRedo,
}

/// The two LIFO stacks of cycle deltas.
///
/// `undo_stack` holds executed cycles in reverse chronological order;
/// `redo_stack` holds cycles reachable by future redo.
pub struct Journal {
    undo_stack: VecDeque<CycleDelta>,
    redo_stack: Vec<CycleDelta>,
    limit: usize,
}

impl Journal {
    /// Creates an empty journal. `limit` bounds the undo stack (oldest
    /// entries evicted); 0 means unbounded.
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Records a freshly executed cycle.
    ///
    /// Executing any forward cycle discards the redo timeline.
    pub fn record(&mut self, delta: CycleDelta) {
        self.redo_stack.clear();
        self.undo_stack.push_back(delta);
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// Takes the most recent executed cycle for rewinding.
    pub fn pop_undo(&mut self) -> Result<CycleDelta, HistoryError> {
        self.undo_stack.pop_back().ok_or(HistoryError::NoMoreUndo)
    }

    /// Parks a rewound cycle on the redo stack.
    pub fn push_redo(&mut self, delta: CycleDelta) {
        self.redo_stack.push(delta);
    }

    /// Takes the next rewound cycle for replay.
    pub fn pop_redo(&mut self) -> Result<CycleDelta, HistoryError> {
        self.redo_stack.pop().ok_or(HistoryError::NoMoreRedo)
    }

    /// Returns a replayed cycle to the undo stack without touching the redo
    /// stack (redo must not discard the remaining timeline).
    pub fn push_undo(&mut self, delta: CycleDelta) {
        self.undo_stack.push_back(delta);
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// Number of rewindable cycles.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of replayable cycles.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drops both stacks (simulator reset).
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
