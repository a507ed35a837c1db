//! Simulation drivers: program images, the facade, and the single-cycle
//! variant.

pub mod loader;
pub mod simulator;
pub mod single_cycle;

pub use loader::ProgramImage;
pub use simulator::{Simulator, Status};
