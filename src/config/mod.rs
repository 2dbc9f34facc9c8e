//! Configuration module for stage-motion.
//!
//! Provides the axis wiring, motion settings and named sample positions,
//! loaded from TOML files (with `std` feature) or built in code.

mod axis;
mod stage;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{Axis, AxisConfig, PerAxis};
pub use stage::{MotionSettings, StageConfig, MAX_SAMPLES};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, load_config_from_env, parse_config, CONFIG_PATH_ENV};

// Re-export unit types at config level
pub use units::StepsPerSecond;
