//! CPU core: architectural state, pipeline, and functional units.

/// Architectural register state (GPR, FPR, CSR).
pub mod arch;

/// Pipeline latches, control, hazards, stages, and engine.
pub mod pipeline;

/// Functional units (ALU, FPU, branch prediction).
pub mod units;

use crate::config::Config;
use crate::mem::MemoryController;
use crate::stats::SimStats;

pub use arch::RegisterFile;

/// Architectural machine state shared by every simulator variant.
///
/// There is exactly one owner of this state at any time: the thread executing
/// the step function. The pipeline engine reads and writes it; the facade
/// owns it between steps.
pub struct Machine {
    /// Register files.
    pub regs: RegisterFile,
    /// Byte-addressable memory.
    pub mem: MemoryController,
    /// Architectural program counter.
    pub pc: u64,
    /// Size of the loaded text section in bytes; fetches at or past this
    /// address produce bubbles.
    pub program_size: u64,
    /// Performance counters.
    pub stats: SimStats,
}

impl Machine {
    /// Creates a machine with the configured memory layout and zeroed state.
    pub fn new(config: &Config) -> Self {
        Self {
            regs: RegisterFile::new(),
            mem: MemoryController::new(config.memory.memory_size, config.memory.block_size),
            pc: config.memory.text_section_start,
            program_size: 0,
            stats: SimStats::new(),
        }
    }

    /// Clears registers, memory, counters, and the PC (back to the text
    /// start). The loaded program is gone after this; the facade reloads it.
    pub fn reset(&mut self, config: &Config) {
        self.regs.reset();
        self.mem.reset();
        self.pc = config.memory.text_section_start;
        self.program_size = 0;
        self.stats = SimStats::new();
    }
}
