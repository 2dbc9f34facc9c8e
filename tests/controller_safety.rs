//! Busy flag and emergency stop, exercised from concurrent threads with real
//! busy-wait timing.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use stage_motion::error::MotionError;
use stage_motion::io::Level;
use stage_motion::{
    Axis, AxisTargets, ControllerState, MotionController, SimulatedIo, SpinDelay, StageConfig,
    StepsPerSecond,
};

const X_STEP: u8 = 17;
const X_ENABLE: u8 = 27;
const Y_ENABLE: u8 = 24;
const Z_ENABLE: u8 = 7;

type Stage = Arc<MotionController<SimulatedIo, SpinDelay>>;

fn stage() -> (Stage, SimulatedIo) {
    let io = SimulatedIo::new();
    let controller = MotionController::new(StageConfig::default(), io.clone(), SpinDelay::new())
        .expect("default config is valid");
    (Arc::new(controller), io)
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Start a 10 mm X move at 5000 steps/s: 1000 steps, about 200 ms.
fn spawn_long_move(controller: &Stage) -> thread::JoinHandle<Result<stage_motion::Position, MotionError>> {
    let controller = Arc::clone(controller);
    thread::spawn(move || {
        controller.move_relative(AxisTargets::only(Axis::X, 10.0), Some(StepsPerSecond(5000.0)))
    })
}

#[test]
fn second_command_is_rejected_while_moving() {
    let (controller, io) = stage();
    let mover = spawn_long_move(&controller);
    wait_until(|| io.journal().rising_edges(X_STEP) > 0);

    let before = controller.position();
    assert_eq!(
        controller.move_relative(AxisTargets::only(Axis::Y, 1.0), None),
        Err(MotionError::AlreadyMoving)
    );
    assert_eq!(controller.home(), Err(MotionError::AlreadyMoving));
    assert_eq!(controller.position(), before);
    assert_eq!(controller.status().state, ControllerState::Moving);

    let position = mover.join().unwrap().unwrap();
    assert!((position.x - 10.0).abs() < 1e-9);
    assert_eq!(position.y, 0.0);
    assert!(!controller.is_busy());
}

#[test]
fn only_one_of_many_concurrent_commands_runs() {
    let (controller, io) = stage();
    controller.initialize().unwrap();
    io.journal().clear();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let controller = Arc::clone(&controller);
            thread::spawn(move || {
                controller.move_relative(AxisTargets::only(Axis::X, 1.0), Some(StepsPerSecond(5000.0)))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(MotionError::AlreadyMoving)))
        .count();
    assert_eq!(accepted + rejected, 8);
    assert!(accepted >= 1);

    // Every accepted command ran whole, none overlapped another.
    assert_eq!(io.journal().rising_edges(X_STEP), accepted * 100);
    assert!((controller.position().x - accepted as f64).abs() < 1e-9);
}

#[test]
fn emergency_stop_halts_running_move() {
    let (controller, io) = stage();
    let mover = spawn_long_move(&controller);
    wait_until(|| io.journal().rising_edges(X_STEP) >= 10);

    let report = controller.emergency_stop();
    assert!(report.is_clean());
    assert!(!controller.is_busy());

    let (axis, completed_steps) = match mover.join().unwrap() {
        Err(MotionError::EmergencyStopped {
            axis,
            completed_steps,
        }) => (axis, completed_steps),
        other => panic!("expected an emergency stop, got {other:?}"),
    };
    assert_eq!(axis, Axis::X);
    assert!(completed_steps >= 10 && completed_steps < 1000);

    // Only the pulses already emitted reached the motor, and they are credited.
    let edges = io.journal().rising_edges(X_STEP);
    assert_eq!(edges, completed_steps as usize);
    assert!((controller.position().x - f64::from(completed_steps) / 100.0).abs() < 1e-9);

    for pin in [X_ENABLE, Y_ENABLE, Z_ENABLE] {
        assert!(io.journal().writes_to(pin).contains(&Level::High));
        assert_eq!(io.level(pin), Some(Level::High));
    }
    assert_eq!(io.level(X_STEP), Some(Level::Low));
}

#[test]
fn emergency_stop_succeeds_when_a_disable_write_fails() {
    let (controller, io) = stage();
    controller.initialize().unwrap();
    io.fail_write_after(Y_ENABLE, 0);

    let report = controller.emergency_stop();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, Axis::Y);
    assert!(!controller.is_busy());
    assert_eq!(io.level(X_ENABLE), Some(Level::High));
    assert_eq!(io.level(Z_ENABLE), Some(Level::High));
}

#[test]
fn emergency_stop_when_idle_is_harmless() {
    let (controller, _io) = stage();
    let report = controller.emergency_stop();
    assert!(report.is_clean());
    assert!(!controller.is_busy());
    assert_eq!(controller.position(), stage_motion::motion::ORIGIN);
}

#[test]
fn new_command_after_stop_runs_normally() {
    let (controller, io) = stage();
    let mover = spawn_long_move(&controller);
    wait_until(|| io.journal().rising_edges(X_STEP) > 0);

    controller.emergency_stop();
    let stopped_at = {
        let err = mover.join().unwrap().unwrap_err();
        assert!(matches!(err, MotionError::EmergencyStopped { .. }));
        controller.position()
    };

    let position = controller
        .move_relative(AxisTargets::only(Axis::Y, 0.1), Some(StepsPerSecond(5000.0)))
        .unwrap();
    assert_eq!(position.x, stopped_at.x);
    assert!((position.y - 0.1).abs() < 1e-9);
    assert!(!controller.is_busy());
}
