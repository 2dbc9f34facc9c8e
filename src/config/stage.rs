//! Stage configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::axis::{AxisConfig, PerAxis};
use super::units::StepsPerSecond;
use crate::motion::Position;

/// Maximum number of named sample positions.
pub const MAX_SAMPLES: usize = 32;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    /// Wiring and scale of the three axes.
    pub axes: PerAxis<AxisConfig>,

    /// Speed, acceleration and homing settings.
    #[serde(default)]
    pub motion: MotionSettings,

    /// Named stage positions, in tour order.
    #[serde(default)]
    pub samples: FnvIndexMap<String<32>, Position, MAX_SAMPLES>,

    /// Shared secret the command surface requires when set.
    #[serde(default)]
    pub auth_token: Option<String<64>>,
}

impl StageConfig {
    /// Configuration of one axis.
    pub fn axis(&self, axis: super::Axis) -> &AxisConfig {
        &self.axes[axis]
    }

    /// Get a sample position by name.
    pub fn sample(&self, name: &str) -> Option<&Position> {
        self.samples
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all sample names in tour order.
    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(|s| s.as_str())
    }
}

impl Default for StageConfig {
    /// Stock wiring of the stage board (BCM numbering).
    fn default() -> Self {
        Self {
            axes: PerAxis::new(
                AxisConfig::new(17, 18, 27, 100.0),
                AxisConfig::new(22, 23, 24, 100.0),
                AxisConfig::new(25, 8, 7, 200.0),
            ),
            motion: MotionSettings::default(),
            samples: FnvIndexMap::new(),
            auth_token: None,
        }
    }
}

/// Motion parameters shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MotionSettings {
    /// Step rate used when a command does not name one.
    #[serde(default = "default_speed")]
    pub default_speed: StepsPerSecond,

    /// Accepted and reported, never applied: pulses run at a constant rate.
    #[serde(default = "default_acceleration")]
    pub default_acceleration: f64,

    /// Absolute target driven to before the position is reset to the origin.
    #[serde(default = "default_home_offset")]
    pub home_offset: Position,
}

fn default_speed() -> StepsPerSecond {
    StepsPerSecond(1000.0)
}

fn default_acceleration() -> f64 {
    500.0
}

fn default_home_offset() -> Position {
    PerAxis::new(-50.0, -50.0, -20.0)
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
            default_acceleration: default_acceleration(),
            home_offset: default_home_offset(),
        }
    }
}
