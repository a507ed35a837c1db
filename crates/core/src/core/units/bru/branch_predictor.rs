//! Branch predictor trait.

/// Interface every prediction policy implements.
///
/// `predict` is consulted at Fetch and must not have side effects; `update`
/// is called once per resolved conditional branch, at resolution time.
pub trait BranchPredictor {
    /// Predicts `(taken, target)` for the instruction word at `pc`.
    ///
    /// For a not-taken prediction the target is meaningless and reported
    /// as 0.
    fn predict(&self, pc: u64, inst: u32) -> (bool, u64);

    /// Trains the predictor with the actual outcome of the branch at `pc`.
    fn update(&mut self, pc: u64, taken: bool);

    /// Clears all prediction state (simulator reset).
    fn reset(&mut self);
}

/// Static heuristic shared by the static and dynamic predictors: backward
/// conditional branches (negative offset) are predicted taken, forward ones
/// not taken.
pub fn backward_taken(imm: i32) -> bool {
    imm < 0
}
