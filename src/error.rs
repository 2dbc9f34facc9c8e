//! Error types for stage-motion.
//!
//! Provides unified error handling across configuration, digital I/O and motion execution.

use core::fmt;

use crate::config::Axis;
use crate::io::PinId;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stage-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Digital I/O port error
    Io(IoError),
    /// Motion command error
    Motion(MotionError),
    /// Sample registry or tour error
    Sample(SampleError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Steps per millimeter must be positive and finite
    InvalidStepsPerMm {
        /// Offending axis
        axis: Axis,
        /// Configured value
        value: f64,
    },
    /// The same pin is wired to two lines
    DuplicatePin(PinId),
    /// Default speed must be positive and finite
    InvalidSpeed(f64),
    /// Default acceleration must be non-negative and finite
    InvalidAcceleration(f64),
    /// Home offset must be finite
    InvalidHomeOffset(Axis),
    /// Sample position must be finite
    InvalidSample(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Which port operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoOperation {
    /// `configure(pin, direction)`
    Configure,
    /// `write(pin, level)`
    Write,
    /// `read(pin)`
    Read,
}

/// Why a port operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoErrorKind {
    /// No such pin on this port
    PinUnavailable,
    /// Pin is configured for the opposite direction
    WrongDirection,
    /// The driver or the hardware reported a failure
    Hardware,
}

/// A failed digital I/O call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoError {
    /// Pin the call addressed
    pub pin: PinId,
    /// Operation attempted
    pub operation: IoOperation,
    /// Failure cause
    pub kind: IoErrorKind,
}

impl IoError {
    /// Create a new I/O error.
    pub const fn new(pin: PinId, operation: IoOperation, kind: IoErrorKind) -> Self {
        Self {
            pin,
            operation,
            kind,
        }
    }
}

/// Motion command errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Pin setup failed; the controller stays uninitialized and may be retried
    Initialization(IoError),
    /// Another motion command is in flight
    AlreadyMoving,
    /// An axis sequence failed part way; earlier axes are already credited
    AxisFailed {
        /// Axis whose sequence failed
        axis: Axis,
        /// Steps emitted on that axis before the failure
        completed_steps: u32,
        /// The underlying port error
        source: IoError,
    },
    /// The sequence was interrupted by an emergency stop
    EmergencyStopped {
        /// Axis that was running, or next to run
        axis: Axis,
        /// Steps emitted on that axis before the stop took effect
        completed_steps: u32,
    },
    /// Step rate must be positive and finite
    InvalidSpeed(f64),
    /// Requested travel needs more steps than one sequence can emit
    StepOverflow {
        /// Axis with the oversized travel
        axis: Axis,
    },
}

/// Sample registry and tour errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// No sample with this name is registered
    UnknownSample(heapless::String<32>),
    /// Sample name longer than 32 bytes
    NameTooLong,
    /// Registry already holds the maximum number of samples
    RegistryFull,
    /// `next` was requested before the tour was started
    TourNotStarted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Sample(e) => write!(f, "Sample error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepsPerMm { axis, value } => {
                write!(f, "Invalid steps_per_mm on axis {}: {}. Must be > 0", axis, value)
            }
            ConfigError::DuplicatePin(pin) => write!(f, "Pin {} is assigned more than once", pin),
            ConfigError::InvalidSpeed(v) => write!(f, "Invalid default speed: {}. Must be > 0", v),
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid default acceleration: {}. Must be >= 0", v)
            }
            ConfigError::InvalidHomeOffset(axis) => {
                write!(f, "Home offset on axis {} is not a finite number", axis)
            }
            ConfigError::InvalidSample(name) => {
                write!(f, "Sample '{}' has a non-finite coordinate", name)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for IoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoOperation::Configure => "configure",
            IoOperation::Write => "write",
            IoOperation::Read => "read",
        })
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cause = match self.kind {
            IoErrorKind::PinUnavailable => "pin unavailable",
            IoErrorKind::WrongDirection => "pin configured for the other direction",
            IoErrorKind::Hardware => "hardware failure",
        };
        write!(f, "{} on pin {} failed: {}", self.operation, self.pin, cause)
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::Initialization(e) => write!(f, "Initialization failed: {}", e),
            MotionError::AlreadyMoving => write!(f, "Motor is already moving"),
            MotionError::AxisFailed {
                axis,
                completed_steps,
                source,
            } => write!(
                f,
                "Axis {} failed after {} steps: {}",
                axis, completed_steps, source
            ),
            MotionError::EmergencyStopped {
                axis,
                completed_steps,
            } => write!(
                f,
                "Emergency stop interrupted axis {} after {} steps",
                axis, completed_steps
            ),
            MotionError::InvalidSpeed(v) => write!(f, "Invalid speed: {}. Must be > 0", v),
            MotionError::StepOverflow { axis } => {
                write!(f, "Travel on axis {} exceeds the maximum step count", axis)
            }
        }
    }
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::UnknownSample(name) => write!(f, "Unknown sample: {}", name),
            SampleError::NameTooLong => write!(f, "Sample name exceeds 32 bytes"),
            SampleError::RegistryFull => write!(f, "Sample registry is full"),
            SampleError::TourNotStarted => {
                write!(f, "No current sample. Start the sample tour first")
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<SampleError> for Error {
    fn from(e: SampleError) -> Self {
        Error::Sample(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for IoError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for SampleError {}
