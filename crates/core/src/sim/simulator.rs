//! Simulator facade.
//!
//! Owns the architectural machine, the variant-specific execution state, the
//! breakpoint set, and the cycle journal, and exposes the control surface the
//! front end drives: load, run, debug-run, step, stop, undo, redo, reset,
//! breakpoints, and register/memory inspection.
//!
//! The core is single-threaded cooperative: the thread calling a step method
//! is the only mutable owner of the state. A host thread may drive `stop()`
//! concurrently through the shared atomic flag; the run loops poll it at the
//! top of every cycle, so cancellation costs at most one extra cycle.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::common::Fault;
use crate::config::{Config, ProcessorType};
use crate::core::arch::csr::FCSR;
use crate::core::pipeline::Pipeline;
use crate::core::Machine;
use crate::journal::{CycleDelta, Journal, MachineSnapshot, RegKind};
use crate::sim::loader::ProgramImage;
use crate::sim::single_cycle::SingleCycle;

/// Status codes the run loop reports.
///
/// The `Display` form is the exact line the front end prints to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The program ran off the end of the text section and the pipeline
    /// drained.
    ProgramEnd,
    /// One step completed with work remaining.
    StepCompleted,
    /// `DebugRun` stopped at a breakpoint; the PC is attached.
    BreakpointHit(u64),
    /// Undo applied.
    UndoCompleted,
    /// The undo stack was empty; nothing changed.
    NoMoreUndo,
    /// Redo applied.
    RedoCompleted,
    /// The redo stack was empty; nothing changed.
    NoMoreRedo,
    /// A run loop observed the stop request.
    Stopped,
    /// The retired-instruction safety cap was reached.
    InstructionLimit,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::ProgramEnd => write!(f, "VM_PROGRAM_END"),
            Status::StepCompleted => write!(f, "VM_STEP_COMPLETED"),
            Status::BreakpointHit(pc) => write!(f, "VM_BREAKPOINT_HIT: {:#x}", pc),
            Status::UndoCompleted => write!(f, "VM_UNDO_COMPLETED"),
            Status::NoMoreUndo => write!(f, "VM_NO_MORE_UNDO"),
            Status::RedoCompleted => write!(f, "VM_REDO_COMPLETED"),
            Status::NoMoreRedo => write!(f, "VM_NO_MORE_REDO"),
            Status::Stopped => write!(f, "VM_STOPPED"),
            Status::InstructionLimit => write!(f, "VM_INSTRUCTION_LIMIT_REACHED"),
        }
    }
}

/// Variant-specific execution state; dispatch is by enum, not virtual calls.
enum Variant {
    /// Latches bypassed, one instruction per cycle.
    SingleStage(SingleCycle),
    /// The 5-stage pipeline.
    MultiStage(Box<Pipeline>),
}

/// The simulator: shared core plus a per-variant step function.
pub struct Simulator {
    config: Config,
    /// Architectural machine state (registers, memory, PC, counters).
    pub machine: Machine,
    variant: Variant,
    journal: Journal,
    breakpoints: HashSet<u64>,
    stop_requested: Arc<AtomicBool>,
    program: Option<ProgramImage>,
}

impl Simulator {
    /// Creates a simulator for the given configuration with nothing loaded.
    pub fn new(config: Config) -> Self {
        let machine = Machine::new(&config);
        let variant = Self::make_variant(&config);
        let journal = Journal::new(config.execution.journal_limit as usize);
        info!(
            "simulator initialized ({:?}, prediction {:?})",
            config.execution.processor_type, config.execution.branch_prediction
        );
        Self {
            config,
            machine,
            variant,
            journal,
            breakpoints: HashSet::new(),
            stop_requested: Arc::new(AtomicBool::new(false)),
            program: None,
        }
    }

    fn make_variant(config: &Config) -> Variant {
        match config.execution.processor_type {
            ProcessorType::SingleStage => Variant::SingleStage(SingleCycle::new()),
            ProcessorType::MultiStage => Variant::MultiStage(Box::new(Pipeline::new(config))),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration; the new value governs the next cycle.
    ///
    /// Changing the processor type rebuilds the variant and reloads the
    /// current program (in-flight pipeline state cannot survive a variant
    /// change). Changing the prediction mode swaps the predictor, losing its
    /// training.
    pub fn set_config(&mut self, config: Config) {
        let variant_changed =
            config.execution.processor_type != self.config.execution.processor_type;
        let predictor_changed =
            config.execution.branch_prediction != self.config.execution.branch_prediction;

        self.config = config;

        if variant_changed {
            self.reset();
        } else if predictor_changed {
            if let Variant::MultiStage(pipeline) = &mut self.variant {
                pipeline.predictor =
                    crate::core::units::bru::PredictorWrapper::new(
                        self.config.execution.branch_prediction,
                    );
            }
        }
    }

    /// Applies one `Section.Key = value` configuration change, with the same
    /// variant/predictor rebuild rules as [`set_config`](Self::set_config).
    pub fn apply_config(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), crate::config::ConfigError> {
        let mut next = self.config.clone();
        next.apply(section, key, value)?;
        self.set_config(next);
        Ok(())
    }

    /// Loads a program image: text words at `text_section_start`, the data
    /// blob at `data_section_start`. Keeps a copy for `Reset`.
    pub fn load_program(&mut self, image: &ProgramImage) {
        self.program = Some(image.clone());
        self.reset();
    }

    /// Copies the stored image into memory and sizes the text section.
    fn install_program(&mut self) {
        let Some(image) = &self.program else {
            return;
        };
        let text_start = self.config.memory.text_section_start;
        for (i, word) in image.text.iter().enumerate() {
            let addr = text_start + i as u64 * 4;
            if let Err(fault) = self.machine.mem.write_u32(addr, *word) {
                warn!("program load at {:#x} failed: {}", addr, fault);
                return;
            }
        }
        if !image.data.is_empty() {
            let data_start = self.config.memory.data_section_start;
            if let Err(fault) = self.machine.mem.write_bytes(data_start, &image.data) {
                warn!("data load at {:#x} failed: {}", data_start, fault);
            }
        }
        self.machine.program_size = text_start + image.size_bytes();
        self.machine.pc = text_start;
    }

    /// True when the PC has run past the text section and the pipeline
    /// holds no work.
    pub fn finished(&self) -> bool {
        let drained = match &self.variant {
            Variant::SingleStage(_) => true,
            Variant::MultiStage(pipeline) => pipeline.drained(),
        };
        self.machine.pc >= self.machine.program_size && drained
    }

    /// Snapshot of everything outside the register file and memory.
    fn snapshot(&self) -> MachineSnapshot {
        let (if_id, id_ex, ex_mem, mem_wb, hazard, seq) = match &self.variant {
            Variant::MultiStage(p) => (
                p.if_id.clone(),
                p.id_ex.clone(),
                p.ex_mem.clone(),
                p.mem_wb.clone(),
                p.hazard,
                p.seq,
            ),
            Variant::SingleStage(s) => (
                Default::default(),
                Default::default(),
                Default::default(),
                Default::default(),
                Default::default(),
                s.seq,
            ),
        };
        MachineSnapshot {
            pc: self.machine.pc,
            if_id,
            id_ex,
            ex_mem,
            mem_wb,
            hazard,
            seq,
            fcsr: self.machine.regs.read_csr(FCSR),
            stats: self.machine.stats.clone(),
        }
    }

    /// Restores a snapshot taken by [`snapshot`](Self::snapshot).
    fn restore(&mut self, snap: &MachineSnapshot) {
        self.machine.pc = snap.pc;
        self.machine.stats = snap.stats.clone();
        self.machine.regs.write_csr(FCSR, snap.fcsr);
        match &mut self.variant {
            Variant::MultiStage(p) => {
                p.if_id = snap.if_id.clone();
                p.id_ex = snap.id_ex.clone();
                p.ex_mem = snap.ex_mem.clone();
                p.mem_wb = snap.mem_wb.clone();
                p.hazard = snap.hazard;
                p.seq = snap.seq;
            }
            Variant::SingleStage(s) => {
                s.seq = snap.seq;
            }
        }
    }

    /// Executes one cycle and journals it.
    fn cycle(&mut self) {
        let old = self.snapshot();
        let effects = match &mut self.variant {
            Variant::MultiStage(pipeline) => pipeline.step(&mut self.machine, &self.config),
            Variant::SingleStage(single) => single.step(&mut self.machine, &self.config),
        };
        let new = self.snapshot();
        self.journal.record(CycleDelta {
            old,
            new,
            wb_write: effects.wb_write,
            mem_write: effects.mem_write,
            instruction_retired: effects.instruction_retired,
        });
    }

    /// Runs until the program ends, the instruction cap trips, or a stop is
    /// requested.
    pub fn run(&mut self) -> Status {
        self.stop_requested.store(false, Ordering::Relaxed);
        while !self.finished() {
            if self.stop_requested.load(Ordering::Relaxed) {
                return Status::Stopped;
            }
            if self.machine.stats.instructions_retired
                >= self.config.execution.instruction_execution_limit
            {
                return Status::InstructionLimit;
            }
            self.cycle();
        }
        Status::ProgramEnd
    }

    /// Like [`run`](Self::run), but pauses when the PC lands on a
    /// breakpoint. The match is checked after the cycle in which the PC
    /// transitions to the breakpoint address.
    pub fn debug_run(&mut self) -> Status {
        self.stop_requested.store(false, Ordering::Relaxed);
        while !self.finished() {
            if self.stop_requested.load(Ordering::Relaxed) {
                return Status::Stopped;
            }
            if self.machine.stats.instructions_retired
                >= self.config.execution.instruction_execution_limit
            {
                return Status::InstructionLimit;
            }
            self.cycle();
            if self.breakpoints.contains(&self.machine.pc) {
                return Status::BreakpointHit(self.machine.pc);
            }
        }
        Status::ProgramEnd
    }

    /// Executes a single cycle.
    pub fn step(&mut self) -> Status {
        if self.finished() {
            return Status::ProgramEnd;
        }
        self.cycle();
        if self.finished() {
            Status::ProgramEnd
        } else {
            Status::StepCompleted
        }
    }

    /// Requests that an in-progress run loop stop at the next cycle
    /// boundary. Callable from another thread via the shared flag.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    /// The shared stop flag, for host threads that drive a worker.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_requested)
    }

    /// Rewinds the most recent cycle.
    pub fn undo(&mut self) -> Status {
        let Ok(delta) = self.journal.pop_undo() else {
            return Status::NoMoreUndo;
        };

        if let Some(wb) = &delta.wb_write {
            match wb.kind {
                RegKind::Gpr => self.machine.regs.gpr.write(wb.index as usize, wb.old_value),
                RegKind::Fpr => self.machine.regs.fpr.write(wb.index as usize, wb.old_value),
            }
        }
        if let Some(mw) = &delta.mem_write {
            if let Err(fault) = self.machine.mem.write_bytes(mw.address, &mw.old_bytes) {
                warn!("undo of store at {:#x} failed: {}", mw.address, fault);
            }
        }
        self.restore(&delta.old);
        self.journal.push_redo(delta);
        Status::UndoCompleted
    }

    /// Replays the most recently rewound cycle.
    pub fn redo(&mut self) -> Status {
        let Ok(delta) = self.journal.pop_redo() else {
            return Status::NoMoreRedo;
        };

        if let Some(wb) = &delta.wb_write {
            match wb.kind {
                RegKind::Gpr => self.machine.regs.gpr.write(wb.index as usize, wb.new_value),
                RegKind::Fpr => self.machine.regs.fpr.write(wb.index as usize, wb.new_value),
            }
        }
        if let Some(mw) = &delta.mem_write {
            if let Err(fault) = self.machine.mem.write_bytes(mw.address, &mw.new_bytes) {
                warn!("redo of store at {:#x} failed: {}", mw.address, fault);
            }
        }
        self.restore(&delta.new);
        self.journal.push_undo(delta);
        Status::RedoCompleted
    }

    /// Clears all machine and history state and reloads the stored program.
    /// Breakpoints survive a reset.
    pub fn reset(&mut self) {
        self.machine.reset(&self.config);
        self.variant = Self::make_variant(&self.config);
        self.journal = Journal::new(self.config.execution.journal_limit as usize);
        self.stop_requested.store(false, Ordering::Relaxed);
        self.install_program();
        info!("simulator reset");
    }

    /// Registers a breakpoint at `pc`. Returns false if it already existed.
    pub fn add_breakpoint(&mut self, pc: u64) -> bool {
        self.breakpoints.insert(pc)
    }

    /// Removes the breakpoint at `pc`. Returns false if none existed.
    pub fn remove_breakpoint(&mut self, pc: u64) -> bool {
        self.breakpoints.remove(&pc)
    }

    /// The registered breakpoints.
    pub fn breakpoints(&self) -> &HashSet<u64> {
        &self.breakpoints
    }

    /// Number of rewindable cycles.
    pub fn undo_depth(&self) -> usize {
        self.journal.undo_depth()
    }

    /// Number of replayable cycles.
    pub fn redo_depth(&self) -> usize {
        self.journal.redo_depth()
    }

    /// Parses a register name of the form `x<N>` or `f<N>`.
    fn parse_register(name: &str) -> Result<(RegKind, u8), Fault> {
        let (kind, digits) = if let Some(rest) = name.strip_prefix('x') {
            (RegKind::Gpr, rest)
        } else if let Some(rest) = name.strip_prefix('f') {
            (RegKind::Fpr, rest)
        } else {
            return Err(Fault::RegisterOutOfRange(u8::MAX));
        };
        let index: u8 = digits
            .parse()
            .map_err(|_| Fault::RegisterOutOfRange(u8::MAX))?;
        if index >= 32 {
            return Err(Fault::RegisterOutOfRange(index));
        }
        Ok((kind, index))
    }

    /// Writes a register by name (`x5`, `f3`).
    pub fn modify_register(&mut self, name: &str, value: u64) -> Result<(), Fault> {
        let (kind, index) = Self::parse_register(name)?;
        match kind {
            RegKind::Gpr => self.machine.regs.write_gpr(index, value),
            RegKind::Fpr => self.machine.regs.write_fpr(index, value),
        }
    }

    /// Reads a register by name (`x5`, `f3`).
    pub fn read_register(&self, name: &str) -> Result<u64, Fault> {
        let (kind, index) = Self::parse_register(name)?;
        match kind {
            RegKind::Gpr => self.machine.regs.read_gpr(index),
            RegKind::Fpr => self.machine.regs.read_fpr(index),
        }
    }

    /// Reads `len` bytes of memory starting at `addr`.
    pub fn read_memory(&self, addr: u64, len: usize) -> Result<Vec<u8>, Fault> {
        self.machine.mem.peek_bytes(addr, len)
    }

    /// Writes a value of `size` bytes (1, 2, 4, or 8) at `addr`.
    pub fn modify_memory(&mut self, addr: u64, size: u8, value: u64) -> Result<(), Fault> {
        match size {
            1 => self.machine.mem.write_u8(addr, value as u8),
            2 => self.machine.mem.write_u16(addr, value as u16),
            4 => self.machine.mem.write_u32(addr, value as u32),
            8 => self.machine.mem.write_u64(addr, value),
            _ => Err(Fault::MemoryOutOfRange(addr)),
        }
    }
}
