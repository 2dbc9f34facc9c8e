//! Routes command objects to the controller and the sample tour.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::io::DigitalIo;
use crate::motion::{AxisTargets, CommandOutput, MotionCommand, MotionController, StopReport};
use crate::samples::{Sample, SampleRegistry, SampleTour, TourStep};

use super::reply::{CommandError, CommandReply};
use super::request::{CommandRequest, Operation};

/// Command surface over one controller.
///
/// Holds the controller by `Arc` so a transport can hand the same
/// dispatcher to several connection threads; an emergency stop arriving on
/// one thread runs while a motion blocks another.
pub struct Dispatcher<P, D> {
    controller: Arc<MotionController<P, D>>,
    samples: SampleRegistry,
    tour: Mutex<SampleTour>,
    auth_token: Option<String>,
}

impl<P: DigitalIo, D: DelayNs> Dispatcher<P, D> {
    /// Dispatcher using the controller's configured samples and token.
    pub fn new(controller: Arc<MotionController<P, D>>) -> Self {
        let config = controller.config();
        let samples = SampleRegistry::from_config(config);
        let auth_token = config.auth_token.as_ref().map(|t| t.as_str().to_owned());

        Self {
            controller,
            samples,
            tour: Mutex::new(SampleTour::new()),
            auth_token,
        }
    }

    /// Replace the required token; `None` accepts every request.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// The controller behind this dispatcher.
    pub fn controller(&self) -> &Arc<MotionController<P, D>> {
        &self.controller
    }

    /// Handle one JSON command object.
    pub fn handle_json(&self, input: &str) -> CommandReply {
        match serde_json::from_str::<CommandRequest>(input) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "Malformed command");
                CommandReply::failed("", &CommandError::InvalidParams(e.to_string()))
            }
        }
    }

    /// Handle one command.
    pub fn handle(&self, request: CommandRequest) -> CommandReply {
        info!(command = %request.command, "Command received");

        match self.run(&request) {
            Ok(result) => CommandReply::ok(request.command, result),
            Err(e) => {
                warn!(command = %request.command, status = e.status(), error = %e, "Command failed");
                CommandReply::failed(request.command, &e)
            }
        }
    }

    fn run(&self, request: &CommandRequest) -> Result<Value, CommandError> {
        self.authorize(request)?;

        match Operation::parse(request)? {
            Operation::Motion(command) => self.motion(command),
            Operation::GoToSample(name) => {
                let sample = self.samples.get(&name)?;
                self.visit(sample)
            }
            Operation::StartSamples => {
                let first = self.tour().first(&self.samples)?;
                self.tour().reset();
                self.controller.home()?;
                self.visit(first)
            }
            Operation::NextSample => {
                let step = self.tour().next(&self.samples)?;
                match step {
                    TourStep::At(sample) => self.visit(sample),
                    TourStep::Complete => {
                        info!("All samples completed");
                        let current = self.tour().current_sample(&self.samples);
                        Ok(json!({
                            "complete": true,
                            "sample": current.map(|s| s.name),
                            "position": self.controller.position(),
                            "ready_for_capture": false,
                        }))
                    }
                }
            }
            Operation::Release => {
                self.controller.release()?;
                self.tour().reset();
                Ok(json!({ "released": true }))
            }
        }
    }

    fn authorize(&self, request: &CommandRequest) -> Result<(), CommandError> {
        match &self.auth_token {
            Some(expected) if request.token.as_deref() != Some(expected.as_str()) => {
                Err(CommandError::Unauthorized)
            }
            _ => Ok(()),
        }
    }

    fn motion(&self, command: MotionCommand) -> Result<Value, CommandError> {
        let output = self.controller.execute(command)?;
        Ok(match output {
            CommandOutput::Moved(position) => json!({ "position": position }),
            CommandOutput::Stopped(report) => stop_result(&report),
            CommandOutput::Position(position) => json!(position),
            CommandOutput::Status(status) => {
                let mut value = json!(status);
                let current = self.tour().current_sample(&self.samples);
                value["current_sample"] = json!(current.map(|s| s.name));
                value
            }
        })
    }

    fn visit(&self, sample: Sample<'_>) -> Result<Value, CommandError> {
        let position = self
            .controller
            .move_absolute(AxisTargets::all(sample.position), None)?;
        self.tour().arrived(&sample);
        info!(sample = sample.name, number = sample.number, "Sample ready for capture");

        Ok(json!({
            "sample": sample.name,
            "sample_number": sample.number,
            "total_samples": self.samples.len(),
            "position": position,
            "ready_for_capture": true,
        }))
    }

    fn tour(&self) -> MutexGuard<'_, SampleTour> {
        self.tour.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn stop_result(report: &StopReport) -> Value {
    let failed: Vec<Value> = report
        .failed
        .iter()
        .map(|(axis, error)| json!({ "axis": axis, "error": error.to_string() }))
        .collect();
    json!({ "stopped": true, "failed_axes": failed })
}
