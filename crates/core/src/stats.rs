//! Simulation statistics collection and reporting.
//!
//! This module tracks the performance counters the pipeline maintains:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, derived CPI.
//! 2. **Hazards:** Stall cycles and operand-forward counts.
//! 3. **Branch prediction:** Correct predictions and mispredictions.

/// Performance counters for one simulator instance.
///
/// `cycles` advances once per `PipelinedStep`; `instructions_retired` counts
/// instructions leaving Writeback. Undo rewinds all counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,
    /// Cycles lost to stalls and flushes.
    pub stall_cycles: u64,
    /// Operand-mux selections that bypassed the register file.
    pub num_forwards: u64,
    /// Resolved branches whose prediction was correct.
    pub branch_predictions: u64,
    /// Resolved branches whose prediction was wrong.
    pub branch_mispredictions: u64,
}

impl SimStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cycles per retired instruction, or 0.0 before anything retires.
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Fraction of resolved branches predicted correctly, or 1.0 when no
    /// branch has resolved.
    pub fn branch_accuracy(&self) -> f64 {
        let total = self.branch_predictions + self.branch_mispredictions;
        if total == 0 {
            1.0
        } else {
            self.branch_predictions as f64 / total as f64
        }
    }

    /// Prints a human-readable counter report to stdout.
    pub fn report(&self) {
        println!("--- Simulation Statistics ---");
        println!("Cycles:                {}", self.cycles);
        println!("Instructions retired:  {}", self.instructions_retired);
        println!("CPI:                   {:.3}", self.cpi());
        println!("Stall cycles:          {}", self.stall_cycles);
        println!("Operand forwards:      {}", self.num_forwards);
        println!(
            "Branch prediction:     {} correct, {} wrong ({:.1}%)",
            self.branch_predictions,
            self.branch_mispredictions,
            self.branch_accuracy() * 100.0
        );
    }
}
