//! # stage-motion
//!
//! Three-axis stepper control for a microscope stage, driven through plain
//! digital I/O with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Dead-reckoned position**: millimeter position derived from commanded steps
//! - **Single-flight motion**: one motion command at a time across all axes
//! - **Emergency stop**: halts a running pulse train within one step half-period
//! - **Configuration-driven**: axis wiring, speeds and sample positions from TOML
//! - **no_std compatible**: config, I/O contract, pulse generation and planning
//! - **JSON command surface**: `{ command, params }` in, `{ success, ... }` out
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stage_motion::{Dispatcher, MotionController, SimulatedIo, SpinDelay};
//!
//! let config = stage_motion::load_config("stage.toml")?;
//! let controller = Arc::new(MotionController::new(config, SimulatedIo::new(), SpinDelay::new())?);
//! let dispatcher = Dispatcher::new(controller);
//!
//! let reply = dispatcher.handle_json(r#"{"command":"move_to","params":{"x":1.0,"y":-0.5}}"#);
//! assert!(reply.success);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): controller, command surface, TOML loading, simulated port
//! - `defmt`: derives `defmt::Format` on small value types for embedded logging

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod config;
#[cfg(feature = "std")]
pub mod dispatch;
pub mod error;
pub mod io;
pub mod motion;
pub mod motor;
pub mod samples;

// Re-exports for ergonomic API
pub use config::{validate_config, Axis, AxisConfig, PerAxis, StageConfig};
pub use error::{Error, Result};
pub use io::{DigitalIo, HalPinBank, Level, PinDirection, PinId};
pub use motion::{
    AxisTargets, CommandOutput, ControllerState, FocusDirection, MotionCommand, MotionStatus,
    Position, StopReport,
};
pub use motor::{AxisDriver, PulseGenerator, StepJob};
pub use samples::{SampleRegistry, SampleTour};

// Controller, command surface and host adapters (std only)
#[cfg(feature = "std")]
pub use config::{load_config, load_config_from_env};
#[cfg(feature = "std")]
pub use dispatch::{CommandReply, CommandRequest, Dispatcher};
#[cfg(feature = "std")]
pub use io::{SharedIo, SimulatedIo, SpinDelay};
#[cfg(feature = "std")]
pub use motion::MotionController;

// Unit types
pub use config::units::StepsPerSecond;
