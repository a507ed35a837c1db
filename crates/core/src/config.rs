//! Configuration system for the simulator.
//!
//! This module defines the configuration structures and enums that
//! parameterize a simulator instance. It provides:
//! 1. **Defaults:** Baseline values matching the stock memory layout.
//! 2. **Structures:** `Execution`, `Memory`, and `Assembler` sections.
//! 3. **Key/Value Modification:** The `Section.Key` surface the front end
//!    exposes (`modify_config Execution forwarding true`).
//!
//! Configuration is an immutable value threaded into each simulator at
//! construction; hot reconfiguration replaces the whole value at the next
//! step boundary. A JSON file deserializes onto [`Config`] via serde;
//! unspecified fields keep their defaults.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants.
mod defaults {
    /// Full 64-bit address space.
    pub const MEMORY_SIZE: u64 = u64::MAX;

    /// Memory allocation block size (1 KiB).
    pub const BLOCK_SIZE: u64 = 1024;

    /// Start address of the text section.
    pub const TEXT_SECTION_START: u64 = 0x0;

    /// Start address of the data section.
    pub const DATA_SECTION_START: u64 = 0x1000_0000;

    /// Start address of the BSS section.
    pub const BSS_SECTION_START: u64 = 0x1100_0000;

    /// Safety cap on retired instructions.
    pub const INSTRUCTION_EXECUTION_LIMIT: u64 = 1_000_000;

    /// Undo-stack sliding-window length (0 = unbounded).
    pub const JOURNAL_LIMIT: u64 = 1024;
}

/// Simulator variant selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorType {
    /// Every instruction completes in one cycle; latches are bypassed.
    SingleStage,
    /// Classical 5-stage in-order pipeline.
    #[default]
    MultiStage,
}

/// Branch prediction policy selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum PredictorMode {
    /// Never predict taken; branches resolve in Execute (2-cycle flush).
    #[default]
    #[serde(rename = "none", alias = "always_not_taken")]
    None,
    /// Backward taken, forward not taken; resolves in Decode.
    #[serde(rename = "static")]
    Static,
    /// Per-PC last-outcome table; resolves in Decode.
    #[serde(rename = "dynamic_1bit")]
    Dynamic1Bit,
    /// Per-PC 2-bit saturating counters; resolves in Decode.
    #[serde(rename = "dynamic_2bit")]
    Dynamic2Bit,
}

impl PredictorMode {
    /// True for the modes that resolve conditional branches in Decode.
    pub fn resolves_early(self) -> bool {
        self != PredictorMode::None
    }
}

/// `[Execution]` section: pipeline behavior switches.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Simulator variant.
    pub processor_type: ProcessorType,
    /// When false no stalls are inserted; the program must be hazard-free.
    pub hazard_detection: bool,
    /// Enables the EX/MEM→EX and MEM/WB→EX bypass muxes.
    pub forwarding: bool,
    /// Branch prediction policy.
    pub branch_prediction: PredictorMode,
    /// Hard cap on retired instructions (runaway-program safety net).
    pub instruction_execution_limit: u64,
    /// Undo-stack sliding-window length; 0 means unbounded.
    pub journal_limit: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            processor_type: ProcessorType::default(),
            hazard_detection: true,
            forwarding: true,
            branch_prediction: PredictorMode::default(),
            instruction_execution_limit: defaults::INSTRUCTION_EXECUTION_LIMIT,
            journal_limit: defaults::JOURNAL_LIMIT,
        }
    }
}

/// `[Memory]` section: address-space layout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Total addressable bytes.
    pub memory_size: u64,
    /// Allocation block size in bytes.
    pub block_size: u64,
    /// Load address of the program text.
    pub text_section_start: u64,
    /// Load address of the program data blob.
    pub data_section_start: u64,
    /// Start of the zero-initialized section.
    pub bss_section_start: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memory_size: defaults::MEMORY_SIZE,
            block_size: defaults::BLOCK_SIZE,
            text_section_start: defaults::TEXT_SECTION_START,
            data_section_start: defaults::DATA_SECTION_START,
            bss_section_start: defaults::BSS_SECTION_START,
        }
    }
}

/// `[Assembler]` section: extension gates for the front end.
///
/// These gate what the assembler accepts; the pipeline engine itself is not
/// affected by them.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Accept M-extension mnemonics.
    pub m_extension_enabled: bool,
    /// Accept F-extension mnemonics.
    pub f_extension_enabled: bool,
    /// Accept D-extension mnemonics.
    pub d_extension_enabled: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            m_extension_enabled: true,
            f_extension_enabled: true,
            d_extension_enabled: true,
        }
    }
}

/// Root configuration value.
///
/// # Examples
///
/// ```
/// use rv5s_core::config::{Config, PredictorMode};
///
/// let json = r#"{
///     "execution": { "branch_prediction": "dynamic_2bit", "forwarding": false },
///     "memory": { "text_section_start": 0 }
/// }"#;
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.execution.branch_prediction, PredictorMode::Dynamic2Bit);
/// assert!(!config.execution.forwarding);
/// assert!(config.execution.hazard_detection);
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline behavior switches.
    pub execution: ExecutionConfig,
    /// Address-space layout.
    pub memory: MemoryConfig,
    /// Assembler extension gates.
    pub assembler: AssemblerConfig,
}

/// Errors raised by configuration parsing or modification.
///
/// A failed modification leaves the in-memory configuration unchanged.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The section name is not one of `Execution`, `Memory`, `Assembler`.
    #[error("unknown config section: {0}")]
    UnknownSection(String),

    /// The key is not recognized inside its section.
    #[error("unknown config key: {0}.{1}")]
    UnknownKey(String, String),

    /// The value does not parse for its key.
    #[error("invalid value for {0}.{1}: {2}")]
    InvalidValue(String, String, String),

    /// The JSON config file failed to deserialize.
    #[error("config parse error: {0}")]
    Parse(String),
}

/// Parses a u64 accepting a `0x` hex prefix or plain decimal.
fn parse_u64(section: &str, key: &str, value: &str) -> Result<u64, ConfigError> {
    let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        value.parse()
    };
    parsed.map_err(|_| {
        ConfigError::InvalidValue(section.to_string(), key.to_string(), value.to_string())
    })
}

/// Parses a boolean spelled `true` or `false`.
fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue(
            section.to_string(),
            key.to_string(),
            value.to_string(),
        )),
    }
}

impl Config {
    /// Deserializes a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies one `Section.Key = value` modification.
    ///
    /// This is the surface the interactive `modify_config` command uses. On
    /// error the configuration is left untouched.
    pub fn apply(&mut self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        match section {
            "Execution" => match key {
                "processor_type" => {
                    self.execution.processor_type = match value {
                        "single_stage" => ProcessorType::SingleStage,
                        "multi_stage" => ProcessorType::MultiStage,
                        _ => {
                            return Err(ConfigError::InvalidValue(
                                section.into(),
                                key.into(),
                                value.into(),
                            ));
                        }
                    };
                }
                "hazard_detection" => {
                    self.execution.hazard_detection = parse_bool(section, key, value)?;
                }
                "forwarding" => {
                    self.execution.forwarding = parse_bool(section, key, value)?;
                }
                "branch_prediction" => {
                    self.execution.branch_prediction = match value {
                        "none" | "always_not_taken" => PredictorMode::None,
                        "static" => PredictorMode::Static,
                        "dynamic_1bit" => PredictorMode::Dynamic1Bit,
                        "dynamic_2bit" => PredictorMode::Dynamic2Bit,
                        _ => {
                            return Err(ConfigError::InvalidValue(
                                section.into(),
                                key.into(),
                                value.into(),
                            ));
                        }
                    };
                }
                "instruction_execution_limit" => {
                    self.execution.instruction_execution_limit = parse_u64(section, key, value)?;
                }
                "journal_limit" => {
                    self.execution.journal_limit = parse_u64(section, key, value)?;
                }
                _ => return Err(ConfigError::UnknownKey(section.into(), key.into())),
            },
            "Memory" => match key {
                "memory_size" => self.memory.memory_size = parse_u64(section, key, value)?,
                "block_size" | "memory_block_size" => {
                    self.memory.block_size = parse_u64(section, key, value)?;
                }
                "text_section_start" => {
                    self.memory.text_section_start = parse_u64(section, key, value)?;
                }
                "data_section_start" => {
                    self.memory.data_section_start = parse_u64(section, key, value)?;
                }
                "bss_section_start" => {
                    self.memory.bss_section_start = parse_u64(section, key, value)?;
                }
                _ => return Err(ConfigError::UnknownKey(section.into(), key.into())),
            },
            "Assembler" => match key {
                "m_extension_enabled" => {
                    self.assembler.m_extension_enabled = parse_bool(section, key, value)?;
                }
                "f_extension_enabled" => {
                    self.assembler.f_extension_enabled = parse_bool(section, key, value)?;
                }
                "d_extension_enabled" => {
                    self.assembler.d_extension_enabled = parse_bool(section, key, value)?;
                }
                _ => return Err(ConfigError::UnknownKey(section.into(), key.into())),
            },
            _ => return Err(ConfigError::UnknownSection(section.into())),
        }
        Ok(())
    }
}
