//! Motor module for stage-motion.
//!
//! Pulse generation, per-axis drive sequences and the halt signal that lets
//! an emergency stop cut a running sequence short.

mod axis;
mod halt;
mod pulse;

pub use axis::{AxisDriver, DriveFault, DriveOutcome, StepJob, DISABLED, ENABLED};
pub use halt::{Halt, HaltGuard, HaltTicket};
pub use pulse::{PulseFault, PulseGenerator, PulseOutcome};
