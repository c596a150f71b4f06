//! `cadence` — a persistent single-host task scheduler.
//!
//! Reads a schedule file, runs its entries on their configured
//! intervals with retry semantics, and watches the file for edits so
//! it can be reloaded without restarting the process. SIGINT triggers
//! a graceful shutdown.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use cadence_core::{Clock, CondvarTimer, LoggingSystemCall, ShellSystemCall, SystemClock};
use cadence_dispatch::Dispatcher;
use cadence_reload::{read_schedule, FileLock, Supervisor};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// A single positional argument names the schedule file; there are no
/// subcommands.
#[derive(Parser)]
#[command(name = "cadence", version, about = "A persistent single-host task scheduler")]
struct Cli {
    /// Path to the schedule source file
    path: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let schedule = match read_schedule(&cli.path, clock.as_ref()) {
        Ok(schedule) => schedule,
        Err(err) => {
            eprintln!("cadence: {err}");
            return ExitCode::FAILURE;
        }
    };

    let file_lock = match FileLock::new(&cli.path, Arc::new(CondvarTimer::new())) {
        Ok(lock) => lock,
        Err(err) => {
            eprintln!("cadence: {err}");
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(schedule),
        Arc::new(LoggingSystemCall::new(ShellSystemCall)),
        Arc::clone(&clock),
    ));

    let supervisor = Arc::new(Supervisor::new(
        cli.path.clone(),
        dispatcher,
        file_lock,
        clock,
        Arc::new(CondvarTimer::new()),
    ));

    let worker = {
        let supervisor = Arc::clone(&supervisor);
        thread::spawn(move || supervisor.run())
    };

    wait_for_interrupt();
    tracing::info!("received interrupt, shutting down");

    supervisor.stop();
    worker.join().expect("supervisor thread panicked");

    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "cadence=debug" } else { "cadence=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

/// Installs a SIGINT handler and blocks the calling thread until it
/// fires, polling a shared flag rather than relying on a signal being
/// delivered to this specific thread.
fn wait_for_interrupt() {
    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    if let Err(err) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    }) {
        tracing::error!(%err, "failed to install SIGINT handler, falling back to unconditional run");
        return;
    }

    while !interrupted.load(Ordering::SeqCst) {
        thread::sleep(StdDuration::from_millis(200));
    }
}
