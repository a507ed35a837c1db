//! Command-line front end for the rv5s simulator.
//!
//! This binary provides the entry points for driving the core:
//! 1. **Run:** Execute an assembled binary to completion and report.
//! 2. **Verify:** Run the same binary on the single-cycle and 5-stage models
//!    and compare the final register files.
//! 3. **Interactive:** A stdin command loop (run / step / undo / redo /
//!    breakpoints / config / register and memory pokes) for front ends that
//!    drive the simulator as a child process.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use clap::{Parser, Subcommand};
use log::warn;

use rv5s_core::config::{Config, ProcessorType};
use rv5s_core::sim::ProgramImage;
use rv5s_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "rv5s",
    author,
    version,
    about = "Cycle-accurate RV64 pipeline simulator",
    long_about = "Run an assembled binary, verify the pipeline against the single-cycle model, \
or start the interactive command loop used by graphical front ends.\n\nExamples:\n  \
rv5s run -f program.bin\n  rv5s verify -f program.bin\n  rv5s --config sim.json"
)]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single binary to completion and print the final state.
    Run {
        /// Assembled binary (little-endian 32-bit instruction words).
        #[arg(short, long)]
        file: String,
    },

    /// Run both simulator variants and compare final register files.
    Verify {
        /// Assembled binary (little-endian 32-bit instruction words).
        #[arg(short, long)]
        file: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    match cli.command {
        Some(Commands::Run { file }) => cmd_run(config, &file),
        Some(Commands::Verify { file }) => cmd_verify(config, &file),
        None => interactive(config),
    }
}

/// Loads the JSON configuration file, if one was given.
fn load_config(path: Option<&str>) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text =
        fs::read_to_string(path).map_err(|e| format!("Error reading config {path}: {e}"))?;
    Config::from_json_str(&text).map_err(|e| format!("Error loading configuration: {e}"))
}

/// Reads an assembled binary into a program image.
fn load_image(path: &str) -> ProgramImage {
    match fs::read(path) {
        Ok(bytes) => ProgramImage::from_le_bytes(&bytes),
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            process::exit(1);
        }
    }
}

/// Loads and runs one binary, then dumps registers and statistics.
fn cmd_run(config: Config, file: &str) {
    let image = load_image(file);
    let mut sim = Simulator::new(config);
    sim.load_program(&image);

    let status = sim.run();
    println!("{status}");

    sim.machine.regs.gpr.dump();
    sim.machine.stats.report();
}

/// Runs the binary on both variants and compares all 64 registers.
fn cmd_verify(config: Config, file: &str) {
    let image = load_image(file);

    let mut single_config = config.clone();
    single_config.execution.processor_type = ProcessorType::SingleStage;
    let mut multi_config = config;
    multi_config.execution.processor_type = ProcessorType::MultiStage;

    let mut single = Simulator::new(single_config);
    let mut multi = Simulator::new(multi_config);
    single.load_program(&image);
    multi.load_program(&image);

    println!("Verifying program: {file}");
    single.run();
    multi.run();

    let mut pass = true;
    println!("--- Verification Results ---");
    for r in 0..32u8 {
        let name = format!("x{r}");
        let val_single = single.read_register(&name).unwrap_or(0);
        let val_multi = multi.read_register(&name).unwrap_or(0);
        if val_single != val_multi {
            pass = false;
            println!("Mismatch in {name}: single={val_single:#x}, multi={val_multi:#x}");
        }
    }
    for r in 0..32u8 {
        let name = format!("f{r}");
        let val_single = single.read_register(&name).unwrap_or(0);
        let val_multi = multi.read_register(&name).unwrap_or(0);
        if val_single != val_multi {
            pass = false;
            println!("Mismatch in {name}: single={val_single:#x}, multi={val_multi:#x}");
        }
    }

    if pass {
        println!("Verification PASSED: All registers match.");
    } else {
        println!("Verification FAILED: See mismatches above.");
        process::exit(1);
    }
}

/// Worker-thread bookkeeping for the interactive loop.
///
/// Run and debug-run execute on a worker thread so the host loop stays
/// responsive to `stop`. The host keeps only the cloned stop flag; the
/// simulator itself is behind the mutex.
struct Worker {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl Worker {
    fn running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops and joins any in-flight run before the next mutating command.
    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
            if handle.join().is_err() {
                warn!("run worker panicked");
            }
        }
    }
}

/// Parses a u64 accepting a `0x` prefix or plain decimal.
fn parse_u64(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// Parses a hex value with or without the `0x` prefix (register and memory
/// pokes are hex by convention).
fn parse_hex(text: &str) -> Option<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).ok()
}

/// The interactive command loop.
fn interactive(config: Config) {
    let sim = Arc::new(Mutex::new(Simulator::new(config)));
    let stop = sim.lock().unwrap().stop_handle();
    let mut worker = Worker { handle: None, stop };

    println!("VM_STARTED");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            continue;
        };

        match command {
            "load" => {
                let Some(path) = args.first() else {
                    println!("VM_PARSE_ERROR");
                    continue;
                };
                worker.join();
                match fs::read(path) {
                    Ok(bytes) => {
                        let image = ProgramImage::from_le_bytes(&bytes);
                        sim.lock().unwrap().load_program(&image);
                        println!("VM_PARSE_SUCCESS");
                        println!("Program loaded: {path}");
                    }
                    Err(e) => {
                        println!("VM_PARSE_ERROR");
                        eprintln!("{e}");
                    }
                }
            }

            "run" | "debug_run" => {
                worker.join();
                let debug = command == "debug_run";
                let sim = Arc::clone(&sim);
                worker.handle = Some(std::thread::spawn(move || {
                    let mut sim = sim.lock().unwrap();
                    let status = if debug { sim.debug_run() } else { sim.run() };
                    println!("{status}");
                }));
            }

            "stop" => {
                // The worker holds the simulator mutex while running; the
                // shared flag is the only safe signal from this thread.
                worker
                    .stop
                    .store(true, std::sync::atomic::Ordering::Relaxed);
                println!("VM_STOPPED");
            }

            "step" => {
                if worker.running() {
                    continue;
                }
                let status = sim.lock().unwrap().step();
                println!("{status}");
            }

            "undo" => {
                if worker.running() {
                    continue;
                }
                let status = sim.lock().unwrap().undo();
                println!("{status}");
            }

            "redo" => {
                if worker.running() {
                    continue;
                }
                let status = sim.lock().unwrap().redo();
                println!("{status}");
            }

            "reset" => {
                worker.join();
                sim.lock().unwrap().reset();
                println!("VM_RESET");
            }

            "add_breakpoint" | "remove_breakpoint" => {
                let Some(pc) = args.first().and_then(|a| parse_u64(a)) else {
                    println!("VM_BREAKPOINT_ERROR");
                    continue;
                };
                let mut sim = sim.lock().unwrap();
                if command == "add_breakpoint" {
                    sim.add_breakpoint(pc);
                } else {
                    sim.remove_breakpoint(pc);
                }
            }

            "modify_config" => {
                let [section, key, value] = args else {
                    println!("VM_MODIFY_CONFIG_ERROR");
                    continue;
                };
                worker.join();
                match sim.lock().unwrap().apply_config(section, key, value) {
                    Ok(()) => println!("VM_MODIFY_CONFIG_SUCCESS"),
                    Err(e) => {
                        println!("VM_MODIFY_CONFIG_ERROR");
                        eprintln!("{e}");
                    }
                }
            }

            "modify_register" => {
                let (Some(reg), Some(value)) =
                    (args.first(), args.get(1).and_then(|a| parse_hex(a)))
                else {
                    println!("VM_MODIFY_REGISTER_ERROR");
                    continue;
                };
                match sim.lock().unwrap().modify_register(reg, value) {
                    Ok(()) => println!("VM_MODIFY_REGISTER_SUCCESS"),
                    Err(_) => println!("VM_MODIFY_REGISTER_ERROR"),
                }
            }

            "get_register" => {
                let Some(reg) = args.first() else {
                    println!("VM_GET_REGISTER_ERROR");
                    continue;
                };
                match sim.lock().unwrap().read_register(reg) {
                    Ok(value) => println!("VM_REGISTER_VAL_START{value:#x}VM_REGISTER_VAL_END"),
                    Err(_) => println!("VM_GET_REGISTER_ERROR"),
                }
            }

            "modify_memory" => {
                let (Some(addr), Some(kind), Some(value)) = (
                    args.first().and_then(|a| parse_hex(a)),
                    args.get(1),
                    args.get(2).and_then(|a| parse_hex(a)),
                ) else {
                    println!("VM_MODIFY_MEMORY_ERROR");
                    continue;
                };
                let size = match *kind {
                    "byte" => 1,
                    "half" => 2,
                    "word" => 4,
                    "double" => 8,
                    _ => {
                        println!("VM_MODIFY_MEMORY_ERROR");
                        continue;
                    }
                };
                match sim.lock().unwrap().modify_memory(addr, size, value) {
                    Ok(()) => println!("VM_MODIFY_MEMORY_SUCCESS"),
                    Err(_) => println!("VM_MODIFY_MEMORY_ERROR"),
                }
            }

            "read_memory" => {
                let (Some(addr), Some(count)) = (
                    args.first().and_then(|a| parse_hex(a)),
                    args.get(1).and_then(|a| parse_u64(a)),
                ) else {
                    println!("VM_MEMORY_READ_ERROR");
                    continue;
                };
                match sim.lock().unwrap().read_memory(addr, count as usize) {
                    Ok(bytes) => {
                        for (i, byte) in bytes.iter().enumerate() {
                            print!("{byte:02x}");
                            if i % 8 == 7 {
                                println!();
                            } else {
                                print!(" ");
                            }
                        }
                        if bytes.len() % 8 != 0 {
                            println!();
                        }
                        let _ = io::stdout().flush();
                    }
                    Err(_) => println!("VM_MEMORY_READ_ERROR"),
                }
            }

            "dump_registers" => {
                let sim = sim.lock().unwrap();
                sim.machine.regs.gpr.dump();
                sim.machine.regs.fpr.dump();
            }

            "stats" => {
                sim.lock().unwrap().machine.stats.report();
            }

            "exit" => {
                worker.join();
                println!("VM_EXITED");
                break;
            }

            _ => {
                println!("Invalid command.");
                println!("{line}");
            }
        }
    }
}
