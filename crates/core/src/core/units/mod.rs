//! Functional units consumed by the pipeline stages.

/// Integer arithmetic logic unit.
pub mod alu;

/// Branch prediction unit.
pub mod bru;

/// Floating-point unit.
pub mod fpu;
