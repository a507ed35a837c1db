//! Fault definitions for stage-boundary error handling.
//!
//! This module defines the error kinds that can originate below the pipeline
//! (memory controller, register file) or inside Decode. It provides:
//! 1. **Fault Representation:** A single enum covering decode and access faults.
//! 2. **Bubble Conversion:** Stages catch a `Fault`, log it, and emit an invalid latch.
//! 3. **Error Trait Integration:** `thiserror`-derived `Display`/`Error` impls.

use thiserror::Error;

/// A fault raised by a pipeline stage or one of its collaborators.
///
/// Faults never unwind the simulator. The stage that observes one invalidates
/// its output latch (producing a bubble) and the cycle continues; the journal
/// still records the partial delta for that cycle.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    /// The opcode field of the fetched word is not a recognized encoding.
    #[error("illegal instruction {0:#010x}")]
    IllegalInstruction(u32),

    /// A memory access fell outside the configured address space.
    #[error("memory address {0:#x} out of range")]
    MemoryOutOfRange(u64),

    /// A register index addressed past the end of a register file.
    #[error("register index {0} out of range")]
    RegisterOutOfRange(u8),
}
