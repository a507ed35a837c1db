//! Configuration tests.
//!
//! Defaults, JSON deserialization, the `Section.Key` modification surface,
//! and its error handling.

use std::io::Write;

use rv5s_core::config::{Config, ConfigError, PredictorMode, ProcessorType};

#[test]
fn defaults_match_the_stock_layout() {
    let config = Config::default();
    assert_eq!(config.execution.processor_type, ProcessorType::MultiStage);
    assert!(config.execution.hazard_detection);
    assert!(config.execution.forwarding);
    assert_eq!(config.execution.branch_prediction, PredictorMode::None);
    assert_eq!(config.memory.text_section_start, 0x0);
    assert_eq!(config.memory.data_section_start, 0x1000_0000);
    assert_eq!(config.memory.bss_section_start, 0x1100_0000);
    assert_eq!(config.memory.block_size, 1024);
    assert!(config.assembler.m_extension_enabled);
}

#[test]
fn partial_json_keeps_defaults_elsewhere() {
    let json = r#"{ "execution": { "forwarding": false } }"#;
    let config = Config::from_json_str(json).unwrap();
    assert!(!config.execution.forwarding);
    assert!(config.execution.hazard_detection, "untouched key keeps default");
    assert_eq!(config.memory.block_size, 1024);
}

#[test]
fn predictor_names_deserialize() {
    for (name, mode) in [
        ("none", PredictorMode::None),
        ("always_not_taken", PredictorMode::None),
        ("static", PredictorMode::Static),
        ("dynamic_1bit", PredictorMode::Dynamic1Bit),
        ("dynamic_2bit", PredictorMode::Dynamic2Bit),
    ] {
        let json = format!(r#"{{ "execution": {{ "branch_prediction": "{name}" }} }}"#);
        let config = Config::from_json_str(&json).unwrap();
        assert_eq!(config.execution.branch_prediction, mode, "{name}");
    }
}

#[test]
fn malformed_json_reports_parse_error() {
    let result = Config::from_json_str("{ not json");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "execution": {{ "processor_type": "single_stage", "branch_prediction": "dynamic_2bit" }} }}"#
    )
    .unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let config = Config::from_json_str(&text).unwrap();
    assert_eq!(config.execution.processor_type, ProcessorType::SingleStage);
    assert_eq!(config.execution.branch_prediction, PredictorMode::Dynamic2Bit);
}

// ══════════════════════════════════════════════════════════
// Section.Key modification
// ══════════════════════════════════════════════════════════

#[test]
fn apply_updates_execution_keys() {
    let mut config = Config::default();
    config.apply("Execution", "forwarding", "false").unwrap();
    assert!(!config.execution.forwarding);

    config
        .apply("Execution", "branch_prediction", "dynamic_1bit")
        .unwrap();
    assert_eq!(config.execution.branch_prediction, PredictorMode::Dynamic1Bit);

    config
        .apply("Execution", "instruction_execution_limit", "500")
        .unwrap();
    assert_eq!(config.execution.instruction_execution_limit, 500);
}

#[test]
fn apply_parses_hex_memory_values() {
    let mut config = Config::default();
    config
        .apply("Memory", "data_section_start", "0x20000000")
        .unwrap();
    assert_eq!(config.memory.data_section_start, 0x2000_0000);

    config.apply("Memory", "block_size", "4096").unwrap();
    assert_eq!(config.memory.block_size, 4096);
}

#[test]
fn apply_accepts_legacy_block_size_key() {
    let mut config = Config::default();
    config.apply("Memory", "memory_block_size", "2048").unwrap();
    assert_eq!(config.memory.block_size, 2048);
}

#[test]
fn unknown_section_and_key_are_rejected() {
    let mut config = Config::default();
    assert!(matches!(
        config.apply("Bogus", "key", "1"),
        Err(ConfigError::UnknownSection(_))
    ));
    assert!(matches!(
        config.apply("Execution", "bogus_key", "1"),
        Err(ConfigError::UnknownKey(_, _))
    ));
}

#[test]
fn invalid_value_leaves_config_unchanged() {
    let mut config = Config::default();
    let result = config.apply("Execution", "hazard_detection", "maybe");
    assert!(matches!(result, Err(ConfigError::InvalidValue(_, _, _))));
    assert!(config.execution.hazard_detection, "failed apply must not mutate");

    let result = config.apply("Execution", "processor_type", "seven_stage");
    assert!(result.is_err());
    assert_eq!(config.execution.processor_type, ProcessorType::MultiStage);
}
