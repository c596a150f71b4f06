//! The reload supervisor: owns the schedule file path, the active
//! `Dispatcher`, and a `FileLock` on that path, and cycles between
//! running a `Coordinator` and checking for an edit to reparse.
//! Grounded on `chronos::program::Program`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use cadence_core::{Clock, Task, Timer};
use cadence_dispatch::{Coordinator, Dispatcher};
use cadence_schedule::{LoggingSchedule, Schedule};
use chrono::Duration;
use tracing::{error, info};

use crate::error::Result;
use crate::file_lock::FileLock;
use crate::filesystem::read_content;

/// How often the supervisor polls the schedule file for changes.
pub const FILE_CHECK_INTERVAL: Duration = Duration::seconds(60);

/// Parses `path` and builds a fresh `LoggingSchedule` from it.
pub fn read_schedule(path: &Path, clock: &dyn Clock) -> Result<LoggingSchedule> {
    let content = read_content(path)?;
    let tasks: Vec<Task> = cadence_parser::LoggingParser::parse(&content, clock)?;
    Ok(LoggingSchedule::new(Schedule::from_tasks(tasks)))
}

pub struct Supervisor {
    path: PathBuf,
    dispatcher: Arc<Dispatcher>,
    file_lock: FileLock,
    clock: Arc<dyn Clock>,
    coordinator_timer: Arc<dyn Timer>,
    stopped: AtomicBool,
}

impl Supervisor {
    pub fn new(
        path: PathBuf,
        dispatcher: Arc<Dispatcher>,
        file_lock: FileLock,
        clock: Arc<dyn Clock>,
        coordinator_timer: Arc<dyn Timer>,
    ) -> Self {
        Self { path, dispatcher, file_lock, clock, coordinator_timer, stopped: AtomicBool::new(false) }
    }

    /// Runs until `stop()` is called from another thread. Each cycle
    /// spawns a worker to drive one `Coordinator`, blocks until the
    /// schedule file changes (or a stop is requested), terminates
    /// that worker, and — unless stopping — reparses the file and
    /// hot-swaps the schedule.
    pub fn run(&self) {
        loop {
            let coordinator = Arc::new(Coordinator::new(Arc::clone(&self.dispatcher), Arc::clone(&self.coordinator_timer)));
            let handle = coordinator.handle();
            let worker = {
                let coordinator = Arc::clone(&coordinator);
                thread::spawn(move || coordinator.run())
            };

            self.file_lock.wait_until_change(FILE_CHECK_INTERVAL);
            handle.terminate();
            worker.join().expect("coordinator worker panicked");

            if self.stopped.load(Ordering::SeqCst) {
                return;
            }

            self.reload();
        }
    }

    fn reload(&self) {
        match read_schedule(&self.path, self.clock.as_ref()) {
            Ok(new_schedule) => {
                self.dispatcher.reload(Arc::new(new_schedule));
                info!(path = %self.path.display(), "reloaded schedule");
            }
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "failed to reload schedule, keeping previous one");
            }
        }
    }

    /// Requests a clean shutdown: the current coordinator finishes its
    /// in-flight task (if any), and `run()` returns after that.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.file_lock.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::test_support::{FakeClock, ScriptedSystemCall};
    use cadence_core::CondvarTimer;
    use std::io::Write;
    use std::time::Duration as StdDuration;
    use tempfile::NamedTempFile;

    fn write_file(path: &Path, content: &str) {
        std::fs::File::create(path).unwrap().write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn stop_ends_the_run_loop() {
        let file = NamedTempFile::new().unwrap();
        write_file(file.path(), r#"run "echo hi" every minute;"#);

        let clock = Arc::new(FakeClock::at(
            chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        ));
        let schedule = read_schedule(file.path(), clock.as_ref()).unwrap();
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(schedule),
            Arc::new(ScriptedSystemCall::always_succeeding()),
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        let file_lock = FileLock::new(file.path(), Arc::new(CondvarTimer::new())).unwrap();
        let supervisor = Arc::new(Supervisor::new(
            file.path().to_path_buf(),
            dispatcher,
            file_lock,
            clock as Arc<dyn Clock>,
            Arc::new(CondvarTimer::new()),
        ));

        let runner = Arc::clone(&supervisor);
        let worker = thread::spawn(move || runner.run());
        thread::sleep(StdDuration::from_millis(20));
        supervisor.stop();
        worker.join().unwrap();
    }
}
