//! End-to-end pipeline scenarios.
//!
//! Whole-program runs through the facade covering arithmetic, hazards,
//! branches under each predictor mode, jumps, flush costs, breakpoints, the
//! instruction cap, and single-stage/5-stage equivalence.

use rv5s_core::config::{PredictorMode, ProcessorType};
use rv5s_core::core::pipeline::Pipeline;
use rv5s_core::core::Machine;
use rv5s_core::sim::Status;
use rv5s_core::Config;

use crate::common::encode::{
    add, addi, auipc, blt, bne, ebreak, jal, jalr, ld, lui, lw, mul, sd, sub,
};
use crate::common::harness::TestContext;

/// Two immediates feeding an add, then an ebreak.
const ARITH: [u32; 4] = [0x0050_0093, 0x0070_0113, 0x0020_81B3, 0x0010_0073];

// ══════════════════════════════════════════════════════════
// 1. Arithmetic, no hazards
// ══════════════════════════════════════════════════════════

#[test]
fn arithmetic_program_runs_to_end() {
    let mut ctx = TestContext::new();
    ctx.load(&ARITH);
    assert_eq!(ctx.run(), Status::ProgramEnd);

    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.reg(2), 7);
    assert_eq!(ctx.reg(3), 12);
}

#[test]
fn arithmetic_program_cycle_accounting() {
    let mut ctx = TestContext::new();
    ctx.load(&ARITH);
    ctx.run();

    let stats = &ctx.sim.machine.stats;
    assert_eq!(stats.cycles, 8, "4 instructions + 4 fill cycles");
    assert_eq!(stats.instructions_retired, 4);
    assert_eq!(stats.stall_cycles, 0, "forwarding absorbs the RAW hazards");
    assert_eq!(stats.num_forwards, 2, "add consumes x1 and x2 via bypass");
}

// ══════════════════════════════════════════════════════════
// 2. Load-use hazard
// ══════════════════════════════════════════════════════════

fn load_use_program() -> Vec<u32> {
    vec![addi(1, 0, 0x10), lw(2, 1, 0), add(3, 2, 2), ebreak()]
}

#[test]
fn load_use_stalls_one_cycle_with_forwarding() {
    let mut ctx = TestContext::new();
    ctx.load(&load_use_program());
    ctx.poke_u32(0x10, 3);
    ctx.run();

    assert_eq!(ctx.reg(2), 3);
    assert_eq!(ctx.reg(3), 6);
    assert_eq!(ctx.sim.machine.stats.stall_cycles, 1);
}

#[test]
fn load_use_stalls_regardless_of_forwarding() {
    let mut ctx = TestContext::with_config(|c| c.execution.forwarding = false);
    ctx.load(&load_use_program());
    ctx.poke_u32(0x10, 3);
    ctx.run();

    assert_eq!(ctx.reg(2), 3);
    assert_eq!(ctx.reg(3), 6);
    assert!(ctx.sim.machine.stats.stall_cycles >= 1);
}

// ══════════════════════════════════════════════════════════
// 3. Branches per predictor mode
// ══════════════════════════════════════════════════════════

/// Three-iteration countdown loop ending in an ebreak.
fn countdown_loop() -> Vec<u32> {
    vec![
        addi(1, 0, 3),
        addi(1, 1, -1), // L:
        bne(1, 0, -4),
        ebreak(),
    ]
}

#[test]
fn countdown_loop_with_static_predictor() {
    let mut ctx =
        TestContext::with_config(|c| c.execution.branch_prediction = PredictorMode::Static);
    ctx.load(&countdown_loop());
    ctx.run();

    let stats = &ctx.sim.machine.stats;
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(
        stats.branch_mispredictions, 1,
        "only the final fall-through mispredicts"
    );
    assert_eq!(stats.branch_predictions, 2);
    assert_eq!(stats.instructions_retired, 7);
}

#[test]
fn countdown_loop_with_no_prediction() {
    let mut ctx = TestContext::new();
    ctx.load(&countdown_loop());
    ctx.run();

    // Every taken branch flushes two slots under mode NONE.
    let stats = &ctx.sim.machine.stats;
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(stats.branch_mispredictions, 2, "the two taken iterations");
    assert_eq!(stats.branch_predictions, 1, "the final fall-through");
}

#[test]
fn countdown_loop_with_dynamic_predictors() {
    for mode in [PredictorMode::Dynamic1Bit, PredictorMode::Dynamic2Bit] {
        let mut ctx = TestContext::with_config(|c| c.execution.branch_prediction = mode);
        ctx.load(&countdown_loop());
        ctx.run();

        // Cold entries fall back to backward-taken, so the behavior matches
        // the static predictor on this loop.
        assert_eq!(ctx.reg(1), 0);
        assert_eq!(ctx.sim.machine.stats.branch_mispredictions, 1);
    }
}

#[test]
fn predictor_modes_agree_on_architectural_state() {
    let mut final_regs = Vec::new();
    for mode in [
        PredictorMode::None,
        PredictorMode::Static,
        PredictorMode::Dynamic1Bit,
        PredictorMode::Dynamic2Bit,
    ] {
        let mut ctx = TestContext::with_config(|c| c.execution.branch_prediction = mode);
        ctx.load(&countdown_loop());
        ctx.run();
        final_regs.push((0..32).map(|i| ctx.reg(i)).collect::<Vec<_>>());
    }
    for regs in &final_regs[1..] {
        assert_eq!(regs, &final_regs[0], "prediction must never change results");
    }
}

// ══════════════════════════════════════════════════════════
// 4. Jumps
// ══════════════════════════════════════════════════════════

#[test]
fn jal_links_and_skips() {
    let program = vec![
        jal(1, 8),      // 0: jump to 8, link x1 = 4
        addi(2, 0, 1),  // 4: skipped
        addi(3, 0, 2),  // 8:
        ebreak(),       // 12:
    ];

    let mut none_ctx = TestContext::new();
    none_ctx.load(&program);
    none_ctx.run();
    assert_eq!(none_ctx.reg(1), 4);
    assert_eq!(none_ctx.reg(2), 0, "the skipped slot must be flushed");
    assert_eq!(none_ctx.reg(3), 2);

    let mut static_ctx =
        TestContext::with_config(|c| c.execution.branch_prediction = PredictorMode::Static);
    static_ctx.load(&program);
    static_ctx.run();
    assert_eq!(static_ctx.reg(1), 4);
    assert_eq!(static_ctx.reg(2), 0);
    assert_eq!(static_ctx.reg(3), 2);

    assert!(
        static_ctx.sim.machine.stats.stall_cycles < none_ctx.sim.machine.stats.stall_cycles,
        "a predicted JAL avoids the late flush"
    );
}

#[test]
fn jalr_computes_register_target() {
    let program = vec![
        addi(1, 0, 12), // 0:
        jalr(5, 1, 0),  // 4: jump to x1 = 12, link x5 = 8
        addi(2, 0, 1),  // 8: skipped
        ebreak(),       // 12:
    ];
    for mode in [PredictorMode::None, PredictorMode::Static] {
        let mut ctx = TestContext::with_config(|c| c.execution.branch_prediction = mode);
        ctx.load(&program);
        ctx.run();
        assert_eq!(ctx.reg(5), 8);
        assert_eq!(ctx.reg(2), 0);
    }
}

#[test]
fn mixed_alu_and_memory_program() {
    let program = vec![
        lui(1, 0x1),      // 0:  x1 = 0x1000
        auipc(2, 0),      // 4:  x2 = 4
        addi(3, 0, 100),  // 8:
        addi(4, 0, 7),    // 12:
        sub(5, 3, 4),     // 16: x5 = 93
        mul(6, 3, 4),     // 20: x6 = 700
        sd(6, 1, 0),      // 24: mem[0x1000] = 700
        ld(7, 1, 0),      // 28: x7 = 700
        ebreak(),         // 32:
    ];
    let mut ctx = TestContext::new();
    ctx.load(&program);
    assert_eq!(ctx.run(), Status::ProgramEnd);

    assert_eq!(ctx.reg(1), 0x1000);
    assert_eq!(ctx.reg(2), 4);
    assert_eq!(ctx.reg(5), 93);
    assert_eq!(ctx.reg(6), 700);
    assert_eq!(ctx.reg(7), 700);
    assert_eq!(ctx.sim.machine.mem.read_u64(0x1000).unwrap(), 700);
}

#[test]
fn ascending_loop_with_blt() {
    let program = vec![
        addi(2, 0, 5),
        addi(1, 1, 1), // L:
        blt(1, 2, -4),
        ebreak(),
    ];
    let mut ctx =
        TestContext::with_config(|c| c.execution.branch_prediction = PredictorMode::Static);
    ctx.load(&program);
    ctx.run();

    assert_eq!(ctx.reg(1), 5);
    assert_eq!(
        ctx.sim.machine.stats.branch_mispredictions, 1,
        "only the exit fall-through mispredicts"
    );
}

#[test]
fn jalr_reads_a_preset_register() {
    let program = vec![
        jalr(5, 1, 0), // 0: jump to x1, link x5 = 4
        addi(2, 0, 1), // 4: skipped
        ebreak(),      // 8:
    ];
    let mut ctx = TestContext::new();
    ctx.load(&program);
    ctx.set_reg(1, 8);
    ctx.run();

    assert_eq!(ctx.reg(5), 4);
    assert_eq!(ctx.reg(2), 0);
}

// ══════════════════════════════════════════════════════════
// 5. Forwarding-vs-stall equivalence
// ══════════════════════════════════════════════════════════

#[test]
fn forwarding_changes_cycles_not_results() {
    let mut fwd = TestContext::new();
    fwd.load(&ARITH);
    fwd.run();

    let mut stalled = TestContext::with_config(|c| c.execution.forwarding = false);
    stalled.load(&ARITH);
    stalled.run();

    for i in 0..32 {
        assert_eq!(fwd.reg(i), stalled.reg(i), "x{i} differs");
    }
    assert!(
        stalled.sim.machine.stats.cycles > fwd.sim.machine.stats.cycles,
        "stalling must cost cycles"
    );
    assert_eq!(stalled.sim.machine.stats.num_forwards, 0);
}

// ══════════════════════════════════════════════════════════
// 6. Single-stage / 5-stage equivalence
// ══════════════════════════════════════════════════════════

#[test]
fn variants_agree_on_hazard_free_program() {
    // Property: with hazard detection off and a hazard-free program, both
    // models produce identical architectural results.
    let program = vec![addi(1, 0, 5), addi(2, 0, 7), addi(3, 0, 9), ebreak()];

    let mut single = TestContext::with_config(|c| {
        c.execution.processor_type = ProcessorType::SingleStage;
        c.execution.hazard_detection = false;
    });
    single.load(&program);
    assert_eq!(single.run(), Status::ProgramEnd);

    let mut multi = TestContext::with_config(|c| c.execution.hazard_detection = false);
    multi.load(&program);
    assert_eq!(multi.run(), Status::ProgramEnd);

    for i in 0..32 {
        assert_eq!(single.reg(i), multi.reg(i), "x{i} differs");
    }
    assert_eq!(single.sim.machine.stats.cycles, 4, "one cycle per instruction");
}

#[test]
fn single_stage_handles_control_flow() {
    let mut ctx = TestContext::with_config(|c| {
        c.execution.processor_type = ProcessorType::SingleStage;
    });
    ctx.load(&countdown_loop());
    ctx.run();
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.sim.machine.stats.instructions_retired, 8);
}

// ══════════════════════════════════════════════════════════
// 7. Run control
// ══════════════════════════════════════════════════════════

#[test]
fn debug_run_pauses_at_breakpoint() {
    let mut ctx = TestContext::new();
    ctx.load(&ARITH);
    ctx.sim.add_breakpoint(8);

    assert_eq!(ctx.sim.debug_run(), Status::BreakpointHit(8));
    assert_eq!(ctx.sim.machine.pc, 8);

    // Resuming finishes the program.
    assert_eq!(ctx.sim.debug_run(), Status::ProgramEnd);
    assert_eq!(ctx.reg(3), 12);
}

#[test]
fn removed_breakpoint_no_longer_fires() {
    let mut ctx = TestContext::new();
    ctx.load(&ARITH);
    ctx.sim.add_breakpoint(8);
    assert!(ctx.sim.remove_breakpoint(8));
    assert_eq!(ctx.sim.debug_run(), Status::ProgramEnd);
}

#[test]
fn instruction_limit_halts_run() {
    let mut ctx =
        TestContext::with_config(|c| c.execution.instruction_execution_limit = 2);
    ctx.load(&ARITH);
    assert_eq!(ctx.run(), Status::InstructionLimit);
    assert!(ctx.sim.machine.stats.instructions_retired <= 3);
}

#[test]
fn step_reports_progress_then_end() {
    let mut ctx = TestContext::new();
    ctx.load(&[addi(1, 0, 1), ebreak()]);
    // 2 instructions drain after 6 cycles.
    for _ in 0..5 {
        assert_eq!(ctx.sim.step(), Status::StepCompleted);
    }
    assert_eq!(ctx.sim.step(), Status::ProgramEnd);
    assert_eq!(ctx.sim.step(), Status::ProgramEnd, "stepping past the end is benign");
}

#[test]
fn reset_restores_a_runnable_machine() {
    let mut ctx = TestContext::new();
    ctx.load(&ARITH);
    ctx.run();
    assert_eq!(ctx.reg(3), 12);

    ctx.sim.reset();
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.sim.machine.stats.cycles, 0);

    // The program reloads on reset and runs again.
    assert_eq!(ctx.run(), Status::ProgramEnd);
    assert_eq!(ctx.reg(3), 12);
}

// ══════════════════════════════════════════════════════════
// 8. Engine-level properties
// ══════════════════════════════════════════════════════════

#[test]
fn sequence_ids_are_strictly_increasing() {
    let config = Config::default();
    let mut machine = Machine::new(&config);
    let mut pipeline = Pipeline::new(&config);

    let program = countdown_loop();
    for (i, word) in program.iter().enumerate() {
        machine.mem.write_u32(i as u64 * 4, *word).unwrap();
    }
    machine.program_size = program.len() as u64 * 4;

    let mut seen = Vec::new();
    for _ in 0..64 {
        pipeline.step(&mut machine, &config);
        if pipeline.if_id.valid {
            seen.push((pipeline.if_id.seq, pipeline.if_id.pc));
        }
        if machine.pc >= machine.program_size && pipeline.drained() {
            break;
        }
    }

    for pair in seen.windows(2) {
        assert!(
            pair[1].0 >= pair[0].0,
            "sequence ids must not decrease: {:?}",
            pair
        );
    }
    let ids: Vec<u64> = seen.iter().map(|(seq, _)| *seq).collect();
    let mut deduped = ids.clone();
    deduped.dedup();
    let mut sorted = deduped.clone();
    sorted.sort_unstable();
    assert_eq!(deduped, sorted, "fetch order must match id order");
}

#[test]
fn bubbles_have_no_architectural_effect() {
    let config = Config::default();
    let mut machine = Machine::new(&config);
    let mut pipeline = Pipeline::new(&config);
    machine.program_size = 0; // nothing to fetch: the pipeline only carries bubbles

    let before: Vec<u64> = (0..32).map(|i| machine.regs.gpr.read(i)).collect();
    for _ in 0..8 {
        pipeline.step(&mut machine, &config);
    }
    let after: Vec<u64> = (0..32).map(|i| machine.regs.gpr.read(i)).collect();

    assert_eq!(before, after);
    assert_eq!(machine.stats.instructions_retired, 0);
    assert_eq!(machine.stats.cycles, 8, "cycles advance unconditionally");
}
