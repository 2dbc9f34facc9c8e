//! Unit tests for TOML configuration parsing.

use stage_motion::config::{load_config, parse_config, Axis, PerAxis, StageConfig, StepsPerSecond};

const AXES: &str = r#"
[axes.x]
step_pin = 17
dir_pin = 18
enable_pin = 27
steps_per_mm = 100.0

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

/// Test parsing the axis wiring.
#[test]
fn test_parse_axes() {
    let config: StageConfig = toml::from_str(AXES).expect("Failed to parse TOML");

    let z = config.axis(Axis::Z);
    assert_eq!(z.step_pin, 25);
    assert_eq!(z.dir_pin, 8);
    assert_eq!(z.enable_pin, 7);
    assert_eq!(z.steps_per_mm, 200.0);
}

/// Test that the motion section falls back to the stock values.
#[test]
fn test_motion_defaults() {
    let config = parse_config(AXES).expect("Failed to parse config");

    assert_eq!(config.motion.default_speed, StepsPerSecond(1000.0));
    assert_eq!(config.motion.default_acceleration, 500.0);
    assert_eq!(config.motion.home_offset, PerAxis::new(-50.0, -50.0, -20.0));
}

/// Test overriding motion settings.
#[test]
fn test_parse_motion_section() {
    let toml_str = format!(
        r#"{AXES}
[motion]
default_speed = 2500.0
default_acceleration = 0.0
home_offset = {{ x = -40.0, y = -45.0, z = -10.0 }}
"#
    );

    let config = parse_config(&toml_str).expect("Failed to parse config");
    assert_eq!(config.motion.default_speed.value(), 2500.0);
    assert_eq!(config.motion.default_acceleration, 0.0);
    assert_eq!(config.motion.home_offset, PerAxis::new(-40.0, -45.0, -10.0));
}

/// Test that samples keep their listed order.
#[test]
fn test_samples_in_listed_order() {
    let toml_str = format!(
        r#"auth_token = "s3cret"
{AXES}
[samples.lpf_1]
x = 2.0
y = 2.0
z = 0.0

[samples.hpf_1]
x = 1.0
y = 1.0
z = 0.0

[samples.lpf_2]
x = 8.0
y = 2.0
z = 0.0
"#
    );

    let config = parse_config(&toml_str).expect("Failed to parse config");
    let names: Vec<_> = config.sample_names().collect();
    assert_eq!(names, ["lpf_1", "hpf_1", "lpf_2"]);
    assert_eq!(config.sample("hpf_1"), Some(&PerAxis::new(1.0, 1.0, 0.0)));
    assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("stage-motion-{}.toml", std::process::id()));
    std::fs::write(&path, AXES).expect("Failed to write temp config");

    let config = load_config(&path).expect("Failed to load config");
    assert_eq!(config.axis(Axis::X).pins(), [17, 18, 27]);

    let _ = std::fs::remove_file(&path);
}

/// Test that a missing axis is rejected.
#[test]
fn test_missing_axis_fails() {
    let toml_str = AXES.replace("[axes.y]", "[axes.u]");
    assert!(parse_config(&toml_str).is_err());
}
