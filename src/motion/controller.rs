//! The motion controller.
//!
//! One controller owns the stage: the three axis drivers, the port, the
//! dead-reckoned position and the busy flag. At most one motion command is
//! in flight across all axes; a second one is rejected, never queued.
//!
//! Motion runs on the calling thread and blocks it until the last pulse.
//! [`MotionController::emergency_stop`] is meant to be called from another
//! thread while that happens. It never waits for the motion: it trips the
//! halt signal, writes every ENABLE line high between two pulse writes of
//! the running train, and clears the busy flag. The running train notices
//! the halt within one step half-period and stops.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use tracing::{debug, error, info, warn};

use crate::config::{validate_config, Axis, PerAxis, StageConfig, StepsPerSecond};
use crate::error::{MotionError, Result};
use crate::io::{DigitalIo, SharedIo};
use crate::motor::{AxisDriver, DriveOutcome, Halt, HaltTicket, PulseGenerator, StepJob};

use super::command::{
    CommandOutput, ControllerState, FocusDirection, MotionCommand, MotionStatus, StopReport,
};
use super::plan::{self, MotionPlan};
use super::position::{AxisTargets, Position, ORIGIN};

/// Busy flag value when no motion is in flight.
const IDLE: usize = 0;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy)]
struct Tracking {
    position: Position,
    initialized: bool,
}

/// What a motion command resolves to once the speed is known.
#[derive(Debug, Clone, Copy)]
enum Motion {
    Absolute(AxisTargets),
    Relative(AxisTargets),
    Focus(FocusDirection, u32),
    Home,
}

/// Holds the busy flag for one command.
///
/// Released on drop unless an emergency stop has already taken the flag
/// away, possibly handing it to a newer command.
struct InFlight<'a> {
    busy: &'a AtomicUsize,
    id: usize,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let _ = self
            .busy
            .compare_exchange(self.id, IDLE, Ordering::SeqCst, Ordering::SeqCst);
    }
}

/// Three-axis stage controller.
///
/// Share it between threads behind an `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```rust,ignore
/// use stage_motion::{Axis, AxisTargets, MotionController, SimulatedIo, SpinDelay, StageConfig};
///
/// let controller = MotionController::new(StageConfig::default(), SimulatedIo::new(), SpinDelay::new())?;
/// controller.move_relative(AxisTargets::only(Axis::X, 2.5), None)?;
/// ```
pub struct MotionController<P, D> {
    config: StageConfig,
    drivers: PerAxis<AxisDriver>,
    io: SharedIo<P>,
    engine: Mutex<PulseGenerator<D>>,
    tracking: Mutex<Tracking>,
    // Id of the command in flight, or IDLE.
    busy: AtomicUsize,
    next_id: AtomicUsize,
    halt: Halt,
}

impl<P: DigitalIo, D: DelayNs> MotionController<P, D> {
    /// Create an uninitialized controller.
    ///
    /// No pin is touched until the first motion or [`initialize`](Self::initialize).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: StageConfig, io: P, delay: D) -> Result<Self> {
        validate_config(&config)?;

        Ok(Self {
            drivers: config.axes.map(AxisDriver::new),
            config,
            io: SharedIo::new(io),
            engine: Mutex::new(PulseGenerator::new(delay)),
            tracking: Mutex::new(Tracking {
                position: ORIGIN,
                initialized: false,
            }),
            busy: AtomicUsize::new(IDLE),
            next_id: AtomicUsize::new(1),
            halt: Halt::new(),
        })
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Handle to the port, shared with the controller.
    pub fn io(&self) -> SharedIo<P> {
        self.io.clone()
    }

    /// Run any command.
    ///
    /// # Errors
    ///
    /// Motion commands fail as described on their methods; queries and
    /// the emergency stop never fail.
    pub fn execute(&self, command: MotionCommand) -> core::result::Result<CommandOutput, MotionError> {
        match command {
            MotionCommand::MoveAbsolute { target, speed } => {
                self.move_absolute(target, speed).map(CommandOutput::Moved)
            }
            MotionCommand::MoveRelative { delta, speed } => {
                self.move_relative(delta, speed).map(CommandOutput::Moved)
            }
            MotionCommand::Home => self.home().map(CommandOutput::Moved),
            MotionCommand::FocusAdjust {
                direction,
                steps,
                speed,
            } => self
                .focus_adjust(direction, steps, speed)
                .map(CommandOutput::Moved),
            MotionCommand::EmergencyStop => Ok(CommandOutput::Stopped(self.emergency_stop())),
            MotionCommand::GetPosition => Ok(CommandOutput::Position(self.position())),
            MotionCommand::GetStatus => Ok(CommandOutput::Status(self.status())),
        }
    }

    /// Configure every axis line as an output and disable every driver.
    ///
    /// Position restarts at the origin. Does nothing if already initialized.
    ///
    /// # Errors
    ///
    /// [`MotionError::AlreadyMoving`] while a command is in flight;
    /// [`MotionError::Initialization`] if a pin call failed, in which case
    /// the controller stays uninitialized and the call may be retried.
    pub fn initialize(&self) -> core::result::Result<(), MotionError> {
        let _flight = self.begin("initialize")?;
        let _engine = lock(&self.engine);
        self.ensure_initialized()
    }

    /// Drive the named axes to absolute positions in millimeters.
    ///
    /// # Errors
    ///
    /// See [`MotionError`]. Axes finished before a failure stay credited.
    pub fn move_absolute(
        &self,
        target: AxisTargets,
        speed: Option<StepsPerSecond>,
    ) -> core::result::Result<Position, MotionError> {
        self.run("move_absolute", Motion::Absolute(target), speed)
    }

    /// Drive the named axes by relative amounts in millimeters.
    ///
    /// # Errors
    ///
    /// See [`MotionError`]. Axes finished before a failure stay credited.
    pub fn move_relative(
        &self,
        delta: AxisTargets,
        speed: Option<StepsPerSecond>,
    ) -> core::result::Result<Position, MotionError> {
        self.run("move_relative", Motion::Relative(delta), speed)
    }

    /// Drive to the configured home offset, then take that point as the origin.
    ///
    /// Pure dead reckoning: no limit switch is consulted.
    ///
    /// # Errors
    ///
    /// See [`MotionError`]. The origin is only reset on success.
    pub fn home(&self) -> core::result::Result<Position, MotionError> {
        self.run("home", Motion::Home, None)
    }

    /// Nudge the focus axis by raw steps.
    ///
    /// # Errors
    ///
    /// See [`MotionError`].
    pub fn focus_adjust(
        &self,
        direction: FocusDirection,
        steps: u32,
        speed: Option<StepsPerSecond>,
    ) -> core::result::Result<Position, MotionError> {
        self.run("focus_adjust", Motion::Focus(direction, steps), speed)
    }

    /// Stop everything now.
    ///
    /// Bypasses the busy check and never waits for a running command. Every
    /// ENABLE line is written high; a failed write is logged and listed in
    /// the report, but the stop still succeeds and the busy flag is cleared.
    /// Position is left as credited by the interrupted command.
    pub fn emergency_stop(&self) -> StopReport {
        self.halt.trigger();

        let mut io = self.io.clone();
        let mut report = StopReport::default();
        for axis in Axis::ALL {
            if let Err(e) = self.drivers[axis].disable(&mut io) {
                error!(axis = %axis, error = %e, "Emergency stop could not disable axis");
                let _ = report.failed.push((axis, e));
            }
        }

        self.busy.store(IDLE, Ordering::SeqCst);
        warn!(failed_axes = report.failed.len(), "Emergency stop");
        report
    }

    /// Disable every driver and return to the uninitialized state.
    ///
    /// The next motion configures the pins again and restarts at the origin.
    ///
    /// # Errors
    ///
    /// [`MotionError::AlreadyMoving`] while a command is in flight, or the
    /// first failed disable write. The controller is uninitialized either way.
    pub fn release(&self) -> Result<()> {
        let _flight = self.begin("release")?;
        let _engine = lock(&self.engine);

        let mut io = self.io.clone();
        let mut first_error = None;
        for driver in Axis::ALL.map(|axis| self.drivers[axis]) {
            if let Err(e) = driver.disable(&mut io) {
                error!(axis = %driver.axis(), error = %e, "Release could not disable axis");
                first_error.get_or_insert(e);
            }
        }

        lock(&self.tracking).initialized = false;
        info!("Motors released");

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Current dead-reckoned position.
    pub fn position(&self) -> Position {
        lock(&self.tracking).position
    }

    /// Whether a motion command is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst) != IDLE
    }

    /// Whether the pins are configured.
    pub fn is_initialized(&self) -> bool {
        lock(&self.tracking).initialized
    }

    /// Snapshot of position, busy flag and lifecycle state.
    pub fn status(&self) -> MotionStatus {
        let tracking = *lock(&self.tracking);
        let busy = self.is_busy();
        let state = if busy {
            ControllerState::Moving
        } else if tracking.initialized {
            ControllerState::Idle
        } else {
            ControllerState::Uninitialized
        };

        MotionStatus {
            position: tracking.position,
            busy,
            initialized: tracking.initialized,
            state,
        }
    }

    fn begin(&self, name: &'static str) -> core::result::Result<InFlight<'_>, MotionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).max(1);
        match self
            .busy
            .compare_exchange(IDLE, id, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => Ok(InFlight {
                busy: &self.busy,
                id,
            }),
            Err(_) => {
                warn!(command = name, "Rejected: motor is already moving");
                Err(MotionError::AlreadyMoving)
            }
        }
    }

    // Caller holds the engine lock.
    fn ensure_initialized(&self) -> core::result::Result<(), MotionError> {
        if lock(&self.tracking).initialized {
            return Ok(());
        }

        let mut io = self.io.clone();
        for driver in Axis::ALL.map(|axis| self.drivers[axis]) {
            driver.configure(&mut io).map_err(|e| {
                error!(axis = %driver.axis(), error = %e, "Initialization failed");
                MotionError::Initialization(e)
            })?;
        }

        let mut tracking = lock(&self.tracking);
        tracking.initialized = true;
        tracking.position = ORIGIN;
        info!("Stage initialized");
        Ok(())
    }

    fn run(
        &self,
        name: &'static str,
        motion: Motion,
        speed: Option<StepsPerSecond>,
    ) -> core::result::Result<Position, MotionError> {
        let speed = speed.unwrap_or(self.config.motion.default_speed);
        if !speed.is_valid() {
            warn!(command = name, speed = speed.value(), "Rejected: invalid speed");
            return Err(MotionError::InvalidSpeed(speed.value()));
        }

        // A stop issued from here on must halt this command.
        let ticket = self.halt.ticket();
        let _flight = self.begin(name)?;
        let mut engine = lock(&self.engine);
        self.ensure_initialized()?;

        let plan = self.plan(motion)?;
        info!(command = name, speed = speed.value(), "Motion started");

        match self.drive(&mut engine, &plan, speed, ticket) {
            Ok(()) => {
                if matches!(motion, Motion::Home) {
                    lock(&self.tracking).position = ORIGIN;
                }
                let position = self.position();
                info!(
                    command = name,
                    x = position.x,
                    y = position.y,
                    z = position.z,
                    "Motion complete"
                );
                Ok(position)
            }
            Err(e) => {
                error!(command = name, error = %e, "Motion failed");
                Err(e)
            }
        }
    }

    fn plan(&self, motion: Motion) -> core::result::Result<MotionPlan, MotionError> {
        let axes = &self.config.axes;
        let current = self.position();
        match motion {
            Motion::Absolute(target) => plan::plan_absolute(axes, &current, &target),
            Motion::Relative(delta) => plan::plan_relative(axes, &delta),
            Motion::Focus(direction, steps) => Ok(plan::plan_focus(&axes.z, direction, steps)),
            Motion::Home => plan::plan_absolute(
                axes,
                &current,
                &AxisTargets::all(self.config.motion.home_offset),
            ),
        }
    }

    fn drive(
        &self,
        engine: &mut PulseGenerator<D>,
        plan: &MotionPlan,
        speed: StepsPerSecond,
        ticket: HaltTicket,
    ) -> core::result::Result<(), MotionError> {
        let guard = self.halt.guard(ticket);
        let mut io = self.io.clone();

        for (job, axis_move) in plan.jobs(speed) {
            let axis = job.axis;
            if guard.is_triggered() {
                return Err(MotionError::EmergencyStopped {
                    axis,
                    completed_steps: 0,
                });
            }

            match self.drivers[axis].drive(&mut io, engine, &job, &guard) {
                Ok(DriveOutcome::Completed { .. }) => {
                    lock(&self.tracking).position[axis] += axis_move.delta_mm;
                }
                Ok(DriveOutcome::Halted { steps }) => {
                    self.credit_partial(&job, steps);
                    return Err(MotionError::EmergencyStopped {
                        axis,
                        completed_steps: steps,
                    });
                }
                Err(fault) => {
                    self.credit_partial(&job, fault.completed_steps);
                    return Err(MotionError::AxisFailed {
                        axis,
                        completed_steps: fault.completed_steps,
                        source: fault.error,
                    });
                }
            }
        }

        Ok(())
    }

    fn credit_partial(&self, job: &StepJob, steps: u32) {
        let signed = job.signed_steps.signum() * i64::from(steps);
        debug!(axis = %job.axis, steps = signed, "Crediting partial travel");
        let config = self.config.axis(job.axis);
        lock(&self.tracking).position.credit_steps(job.axis, config, signed);
    }
}
