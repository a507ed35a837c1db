//! General-Purpose Register file.
//!
//! This module implements the integer register file:
//! 1. **Storage:** 32 registers (`x0`-`x31`).
//! 2. **Invariant Enforcement:** `x0` is hardwired to zero.
//! 3. **Debugging:** a dump utility for the CLI.

/// General-Purpose Register file.
///
/// Register `x0` reads as zero at all times; writes to it are dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Gpr {
    regs: [u64; 32],
}

impl Gpr {
    /// Creates a register file with all registers zeroed.
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads a register. `x0` always returns 0.
    pub fn read(&self, idx: usize) -> u64 {
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a register. Writes to `x0` are dropped.
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Dumps all registers to stdout in pairs, hex formatted.
    pub fn dump(&self) {
        for i in (0..32).step_by(2) {
            println!(
                "x{:<2}={:#018x} x{:<2}={:#018x}",
                i,
                self.read(i),
                i + 1,
                self.read(i + 1)
            );
        }
    }
}

impl Default for Gpr {
    fn default() -> Self {
        Self::new()
    }
}
