//! Instruction set definitions and decoding.
//!
//! This module covers the static side of the ISA:
//! 1. **Opcodes:** Major opcode and funct-field constants for RV64 I/M/F/D.
//! 2. **Decoding:** Bit-field extraction and immediate generation per format.

pub mod decode;
pub mod opcodes;

pub use decode::{decode, Decoded, InstFormat};
