//! Incoming command objects.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{PerAxis, StepsPerSecond};
use crate::motion::{FocusDirection, MotionCommand};

use super::reply::CommandError;

/// `{ command, params, token }` as received from the transport.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandRequest {
    /// Command name.
    pub command: String,
    /// Command parameters; absent means `{}`.
    #[serde(default)]
    pub params: Value,
    /// Shared secret, checked when the dispatcher has one.
    #[serde(default)]
    pub token: Option<String>,
}

impl CommandRequest {
    /// A request with no parameters.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: Value::Null,
            token: None,
        }
    }

    /// Set the parameters.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Set the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// What a request asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A controller command.
    Motion(MotionCommand),
    /// Drive to a named sample.
    GoToSample(String),
    /// Home, then drive to the first sample.
    StartSamples,
    /// Drive to the sample after the current one.
    NextSample,
    /// Disable every driver.
    Release,
}

#[derive(Debug, Deserialize)]
struct MoveParams {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    speed: Option<f64>,
    acceleration: Option<f64>,
}

impl MoveParams {
    fn speed(&self) -> Option<StepsPerSecond> {
        if let Some(acceleration) = self.acceleration {
            debug!(acceleration, "Acceleration accepted, pulses run at a constant rate");
        }
        self.speed.map(StepsPerSecond)
    }
}

fn one_step() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct FocusParams {
    direction: FocusDirection,
    #[serde(default = "one_step")]
    steps: u32,
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SampleParams {
    name: String,
}

impl Operation {
    /// Resolve a request into an operation.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownCommand`] for an unsupported name,
    /// [`CommandError::InvalidParams`] when the parameters do not fit it.
    pub fn parse(request: &CommandRequest) -> Result<Self, CommandError> {
        let params = &request.params;
        let operation = match request.command.as_str() {
            "move_to" => {
                let p: MoveParams = decode(params)?;
                Operation::Motion(MotionCommand::MoveAbsolute {
                    target: PerAxis::new(p.x, p.y, p.z),
                    speed: p.speed(),
                })
            }
            "move_relative" => {
                let p: MoveParams = decode(params)?;
                Operation::Motion(MotionCommand::MoveRelative {
                    delta: PerAxis::new(p.x, p.y, p.z),
                    speed: p.speed(),
                })
            }
            "home" => Operation::Motion(MotionCommand::Home),
            "emergency_stop" => Operation::Motion(MotionCommand::EmergencyStop),
            "focus_adjust" => {
                let p: FocusParams = decode(params)?;
                Operation::Motion(MotionCommand::FocusAdjust {
                    direction: p.direction,
                    steps: p.steps,
                    speed: p.speed.map(StepsPerSecond),
                })
            }
            "get_position" => Operation::Motion(MotionCommand::GetPosition),
            "get_status" => Operation::Motion(MotionCommand::GetStatus),
            "go_to_sample" => {
                let p: SampleParams = decode(params)?;
                Operation::GoToSample(p.name)
            }
            "start_samples" => Operation::StartSamples,
            "next_sample" => Operation::NextSample,
            "release" => Operation::Release,
            other => return Err(CommandError::UnknownCommand(other.to_owned())),
        };
        Ok(operation)
    }
}

fn decode<T: DeserializeOwned>(params: &Value) -> Result<T, CommandError> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params.clone()
    };
    serde_json::from_value(params).map_err(|e| CommandError::InvalidParams(e.to_string()))
}
