//! Example: JSON command loop over a simulated stage.
//!
//! Reads one command object per line from stdin and prints one reply per
//! line. Each command runs on its own thread, so an `emergency_stop` typed
//! while a long move is running interrupts it.
//!
//! ```text
//! {"command":"start_samples"}
//! {"command":"move_relative","params":{"x":10.0,"speed":500}}
//! {"command":"emergency_stop"}
//! ```
//!
//! Run with: `cargo run --example simulated_stage`
//! (`STAGE_CONFIG=path/to/stage.toml` to replace the bundled layout,
//! `RUST_LOG=debug` for more output)

use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stage_motion::config::{parse_config, CONFIG_PATH_ENV};
use stage_motion::{load_config_from_env, Dispatcher, MotionController, Result, SimulatedIo, SpinDelay};

const BUNDLED_CONFIG: &str = include_str!("stage.toml");

/// Simulated pin calls kept; every step pulse adds two.
const JOURNAL_LIMIT: usize = 10_000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = if std::env::var_os(CONFIG_PATH_ENV).is_some() {
        load_config_from_env()?
    } else {
        parse_config(BUNDLED_CONFIG)?
    };
    info!(samples = config.samples.len(), "Stage configuration loaded");

    let io = SimulatedIo::with_journal_limit(JOURNAL_LIMIT);
    let controller = MotionController::new(config, io, SpinDelay::new())?;
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(controller)));

    let stdin = std::io::stdin();
    let mut workers = Vec::new();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let dispatcher = Arc::clone(&dispatcher);
        workers.push(thread::spawn(move || {
            let reply = dispatcher.handle_json(&line);
            println!("{}", reply.to_json());
        }));
        workers.retain(|worker| !worker.is_finished());
    }

    for worker in workers {
        let _ = worker.join();
    }

    let report = dispatcher.controller().emergency_stop();
    if !report.is_clean() {
        error!(failed = report.failed.len(), "Some axes did not disable on exit");
    }
    Ok(())
}
