//! Unit tests for configuration validation.

use stage_motion::config::{parse_config, validate_config, Axis, PerAxis, StageConfig, StepsPerSecond};
use stage_motion::error::{ConfigError, Error};
use stage_motion::{MotionController, SimulatedIo, SpinDelay};

/// Test validation of the stock configuration.
#[test]
fn test_stock_config_passes_validation() {
    assert!(validate_config(&StageConfig::default()).is_ok());
}

/// Test validation fails for a negative scale.
#[test]
fn test_negative_steps_per_mm() {
    let mut config = StageConfig::default();
    config.axes.x.steps_per_mm = -100.0;

    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidStepsPerMm { axis: Axis::X, .. }))
    ));
}

/// Test validation fails when two lines share a pin.
#[test]
fn test_shared_pin() {
    let mut config = StageConfig::default();
    config.axes.z.enable_pin = config.axes.x.step_pin;

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::DuplicatePin(17)))
    );
}

/// Test validation fails for an unusable default speed.
#[test]
fn test_zero_default_speed() {
    let mut config = StageConfig::default();
    config.motion.default_speed = StepsPerSecond(0.0);

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSpeed(0.0)))
    );
}

/// Test validation fails for a non-finite home offset.
#[test]
fn test_infinite_home_offset() {
    let mut config = StageConfig::default();
    config.motion.home_offset = PerAxis::new(-50.0, f64::NEG_INFINITY, -20.0);

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidHomeOffset(Axis::Y)))
    );
}

/// Test that parsing runs validation.
#[test]
fn test_parse_rejects_invalid_values() {
    let toml_str = r#"
[axes.x]
step_pin = 17
dir_pin = 18
enable_pin = 27
steps_per_mm = 0.0

[axes.y]
step_pin = 22
dir_pin = 23
enable_pin = 24
steps_per_mm = 100.0

[axes.z]
step_pin = 25
dir_pin = 8
enable_pin = 7
steps_per_mm = 200.0
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidStepsPerMm { axis: Axis::X, .. }))
    ));
}

/// Test that a controller refuses an invalid configuration.
#[test]
fn test_controller_validates_config() {
    let mut config = StageConfig::default();
    config.motion.default_acceleration = -1.0;

    let result = MotionController::new(config, SimulatedIo::new(), SpinDelay::new());
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidAcceleration(_)))
    ));
}
