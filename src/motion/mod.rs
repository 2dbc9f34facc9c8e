//! Motion module for stage-motion.
//!
//! Position model, command types, decomposition of commands into per-axis
//! step jobs, and the controller that runs them.

mod command;
#[cfg(feature = "std")]
mod controller;
mod plan;
mod position;

pub use command::{
    CommandOutput, ControllerState, FocusDirection, MotionCommand, MotionStatus, StopReport,
};
#[cfg(feature = "std")]
pub use controller::MotionController;
pub use plan::{plan_absolute, plan_focus, plan_relative, AxisMove, MotionPlan};
pub use position::{AxisTargets, Position, ORIGIN};
