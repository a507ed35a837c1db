//! The five pipeline stage functions.
//!
//! Each stage is a pure-ish function from the current latches and
//! architectural state to the next latch value; only Memory and Writeback
//! touch the machine. The engine calls them in the order WB, MEM, EX, ID, IF
//! so that Writeback's register update is observable to Decode of the same
//! cycle (internal register-file forwarding), then commits all four latches
//! simultaneously.

pub mod decode;
pub mod execute;
pub mod fetch;
pub mod memory;
pub mod writeback;

pub use decode::{decode_stage, DecodeOutcome};
pub use execute::execute_stage;
pub use fetch::fetch_stage;
pub use memory::memory_stage;
pub use writeback::writeback_stage;
