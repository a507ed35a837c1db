//! Branch History Table.
//!
//! Per-PC predictor state for the dynamic modes. Keys are instruction
//! addresses; the stored byte is interpreted by the owning predictor (a
//! single taken bit, or a 2-bit saturating counter). Empty at reset.

use std::collections::HashMap;

/// Branch History Table mapping PC to raw predictor state.
#[derive(Clone, Default)]
pub struct Bht {
    entries: HashMap<u64, u8>,
}

impl Bht {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Looks up the state for `pc`, if the branch has been seen.
    pub fn lookup(&self, pc: u64) -> Option<u8> {
        self.entries.get(&pc).copied()
    }

    /// Stores the state for `pc`, inserting on first update.
    pub fn store(&mut self, pc: u64, state: u8) {
        self.entries.insert(pc, state);
    }

    /// Number of tracked branches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no branch has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
