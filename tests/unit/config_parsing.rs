//! Unit tests for TOML configuration parsing.

use std::io::Write;

use turntable_motion::config::{load_config, parse_config, TurntableConfig};
use turntable_motion::error::{ConfigError, Error};
use turntable_motion::Microsteps;

/// Test parsing a complete configuration.
#[test]
fn test_parse_full_config() {
    let toml_str = r#"
[pan]
name = "turntable"
base_steps_per_revolution = 200
gear_ratio = 4.0

[tilt]
name = "tilt"
base_steps_per_revolution = 100
gear_ratio = 46.5

[motion]
initial_speed = 300.0
initial_acceleration = 120.0
speed_up_factor = 1.25
speed_down_factor = 0.8
microsteps = 4

[protocol]
firmware_version = "2.0.0"
uppercase_x_stops_both = true
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.pan.name.as_str(), "turntable");
    assert_eq!(config.pan.base_steps, 200);
    assert_eq!(config.pan.output_steps_per_revolution(), 800);
    assert_eq!(config.tilt.output_steps_per_revolution(), 4650);
    assert_eq!(config.motion.initial_speed, 300.0);
    assert_eq!(config.motion.initial_acceleration, 120.0);
    assert_eq!(config.motion.speed_up_factor, 1.25);
    assert_eq!(config.motion.microsteps, Microsteps::QUARTER);
    assert_eq!(config.protocol.firmware_version.as_str(), "2.0.0");
    assert!(config.protocol.uppercase_x_stops_both);
}

/// Omitted sections fall back to the reference hardware.
#[test]
fn test_partial_config_uses_defaults() {
    let toml_str = r#"
[motion]
initial_speed = 200.0
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let reference = TurntableConfig::default();

    assert_eq!(config.pan.output_steps_per_revolution(), 1134);
    assert_eq!(config.tilt.output_steps_per_revolution(), 4650);
    assert_eq!(config.motion.initial_speed, 200.0);
    assert_eq!(config.motion.initial_acceleration, 80.0);
    assert_eq!(config.motion.speed_down_factor, 0.9);
    assert!((config.speed_ratio() - reference.speed_ratio()).abs() < 1e-6);
    assert!(!config.protocol.uppercase_x_stops_both);
}

/// A gear ratio may be left out, meaning direct drive.
#[test]
fn test_gear_ratio_defaults_to_direct_drive() {
    let toml_str = r#"
[pan]
name = "direct"
base_steps_per_revolution = 200
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    assert_eq!(config.pan.gear_ratio, 1.0);
    assert_eq!(config.pan.output_steps_per_revolution(), 200);
}

/// Test that unsupported microstep values are rejected while parsing.
#[test]
fn test_invalid_microsteps_rejected() {
    let toml_str = r#"
[motion]
microsteps = 32
"#;

    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// An axis table without its step count is incomplete.
#[test]
fn test_missing_axis_field_rejected() {
    let toml_str = r#"
[tilt]
name = "tilt"
gear_ratio = 46.5
"#;

    assert!(parse_config(toml_str).is_err());
}

/// Test loading configuration from disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!(
        "turntable-motion-{}-load.toml",
        std::process::id()
    ));
    {
        let mut file = std::fs::File::create(&path).expect("create temp file");
        writeln!(file, "[protocol]\nfirmware_version = \"9.9.9\"").expect("write temp file");
    }

    let config = load_config(&path).expect("Failed to load config");
    assert_eq!(config.protocol.firmware_version.as_str(), "9.9.9");

    let _ = std::fs::remove_file(&path);
}

/// TOML spells NaN as `nan`; it must not slip through as a speed.
#[test]
fn test_nan_speed_rejected() {
    let toml_str = r#"
[motion]
initial_speed = nan
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidSpeed(_)))
    ));
}
