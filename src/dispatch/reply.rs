//! Replies and command-surface errors.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, MotionError, SampleError};
use crate::io::IoError;

/// Why a command was not carried out.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Command name not recognised
    UnknownCommand(String),
    /// Parameters missing or malformed
    InvalidParams(String),
    /// Token missing or wrong
    Unauthorized,
    /// Sample lookup or tour failure
    Sample(SampleError),
    /// Controller rejected or failed the command
    Motion(MotionError),
    /// A port call failed outside a motion
    Io(IoError),
}

impl CommandError {
    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            CommandError::UnknownCommand(_) | CommandError::InvalidParams(_) => 400,
            CommandError::Unauthorized => 401,
            CommandError::Sample(SampleError::UnknownSample(_)) => 404,
            CommandError::Sample(SampleError::RegistryFull) => 500,
            CommandError::Sample(_) => 400,
            CommandError::Motion(e) => match e {
                MotionError::AlreadyMoving => 409,
                MotionError::Initialization(_) => 503,
                MotionError::InvalidSpeed(_) | MotionError::StepOverflow { .. } => 400,
                MotionError::AxisFailed { .. } | MotionError::EmergencyStopped { .. } => 500,
            },
            CommandError::Io(_) => 500,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(name) => write!(f, "Unknown command: {}", name),
            CommandError::InvalidParams(msg) => write!(f, "Invalid parameters: {}", msg),
            CommandError::Unauthorized => write!(f, "Unauthorized"),
            CommandError::Sample(e) => write!(f, "{}", e),
            CommandError::Motion(e) => write!(f, "{}", e),
            CommandError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<MotionError> for CommandError {
    fn from(e: MotionError) -> Self {
        CommandError::Motion(e)
    }
}

impl From<SampleError> for CommandError {
    fn from(e: SampleError) -> Self {
        CommandError::Sample(e)
    }
}

impl From<Error> for CommandError {
    fn from(e: Error) -> Self {
        match e {
            Error::Motion(e) => CommandError::Motion(e),
            Error::Sample(e) => CommandError::Sample(e),
            Error::Io(e) => CommandError::Io(e),
            Error::Config(e) => CommandError::InvalidParams(e.to_string()),
        }
    }
}

/// `{ success, command, result | error, status, timestamp }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReply {
    /// Whether the command was carried out.
    pub success: bool,
    /// Command name as received.
    pub command: String,
    /// Command output on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Human-readable failure on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP-equivalent status code.
    pub status: u16,
    /// Unix time in milliseconds.
    pub timestamp: u64,
}

impl CommandReply {
    /// A successful reply.
    pub fn ok(command: impl Into<String>, result: Value) -> Self {
        Self {
            success: true,
            command: command.into(),
            result: Some(result),
            error: None,
            status: 200,
            timestamp: now_millis(),
        }
    }

    /// A failed reply.
    pub fn failed(command: impl Into<String>, error: &CommandError) -> Self {
        Self {
            success: false,
            command: command.into(),
            result: None,
            error: Some(error.to_string()),
            status: error.status(),
            timestamp: now_millis(),
        }
    }

    /// Serialize to a JSON line.
    pub fn to_json(&self) -> String {
        // Every field is a plain value or a JSON tree; this cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
