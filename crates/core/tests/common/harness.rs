//! Test harness wiring a simulator to an inline program.

use rv5s_core::config::Config;
use rv5s_core::sim::{ProgramImage, Status};
use rv5s_core::Simulator;

pub struct TestContext {
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Default configuration: 5-stage, hazard detection and forwarding on,
    /// predictor mode none, text at 0.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Builds a context after letting the caller adjust the configuration.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut config = Config::default();
        adjust(&mut config);
        Self {
            sim: Simulator::new(config),
        }
    }

    /// Loads a program from instruction words.
    pub fn load(&mut self, words: &[u32]) -> &mut Self {
        self.sim.load_program(&ProgramImage::from_words(words));
        self
    }

    /// Runs to completion.
    pub fn run(&mut self) -> Status {
        self.sim.run()
    }

    /// Steps `n` cycles.
    pub fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.sim.step();
        }
    }

    /// Reads a GPR.
    pub fn reg(&self, idx: u8) -> u64 {
        self.sim.machine.regs.read_gpr(idx).unwrap()
    }

    /// Writes a GPR.
    pub fn set_reg(&mut self, idx: u8, val: u64) {
        self.sim.machine.regs.write_gpr(idx, val).unwrap();
    }

    /// Reads an FPR bit pattern.
    pub fn freg(&self, idx: u8) -> u64 {
        self.sim.machine.regs.read_fpr(idx).unwrap()
    }

    /// Reads one byte of memory.
    pub fn mem_u8(&self, addr: u64) -> u8 {
        self.sim.machine.mem.read_u8(addr).unwrap()
    }

    /// Writes a 32-bit word of memory.
    pub fn poke_u32(&mut self, addr: u64, val: u32) {
        self.sim.machine.mem.write_u32(addr, val).unwrap();
    }

    /// Collects the full register files and a memory window, for whole-state
    /// comparisons.
    pub fn arch_state(&self, mem_window: std::ops::Range<u64>) -> (Vec<u64>, Vec<u64>, Vec<u8>) {
        let gprs = (0..32).map(|i| self.reg(i)).collect();
        let fprs = (0..32).map(|i| self.freg(i)).collect();
        let mem = mem_window.map(|a| self.mem_u8(a)).collect();
        (gprs, fprs, mem)
    }
}
