//! Blocks the supervisor thread until the schedule file changes or it
//! is asked to stop. Grounded on `chronos::FileLock`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cadence_core::Timer;
use chrono::Duration;

use crate::error::Result;
use crate::file_guard::FileGuard;

pub struct FileLock {
    guard: Mutex<FileGuard>,
    timer: Arc<dyn Timer>,
    released: AtomicBool,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>, timer: Arc<dyn Timer>) -> Result<Self> {
        Ok(Self { guard: Mutex::new(FileGuard::new(path)?), timer, released: AtomicBool::new(false) })
    }

    /// Blocks until the watched file's content changes or `release()`
    /// is called, polling at most every `interval`.
    pub fn wait_until_change(&self, interval: Duration) {
        self.released.store(false, Ordering::SeqCst);
        loop {
            let changed = self.guard.lock().unwrap().check_for_change().unwrap_or(false);
            if changed || self.released.load(Ordering::SeqCst) {
                return;
            }
            self.timer.wait(interval);
        }
    }

    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.timer.interrupt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::NamedTempFile;

    fn write_file(path: &std::path::Path, content: &str) {
        std::fs::File::create(path).unwrap().write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn release_unblocks_a_wait_already_in_progress() {
        let file = NamedTempFile::new().unwrap();
        write_file(file.path(), "run \"a\" every minute;");
        let lock = Arc::new(FileLock::new(file.path(), Arc::new(cadence_core::CondvarTimer::new())).unwrap());

        let waiter = Arc::clone(&lock);
        let worker = thread::spawn(move || waiter.wait_until_change(Duration::seconds(30)));
        thread::sleep(StdDuration::from_millis(20));
        lock.release();
        worker.join().unwrap();
    }

    #[test]
    fn a_content_change_unblocks_wait_without_release() {
        let file = NamedTempFile::new().unwrap();
        write_file(file.path(), "run \"a\" every minute;");
        let lock = Arc::new(FileLock::new(file.path(), Arc::new(cadence_core::CondvarTimer::new())).unwrap());

        let waiter = Arc::clone(&lock);
        let worker = thread::spawn(move || waiter.wait_until_change(Duration::milliseconds(10)));
        thread::sleep(StdDuration::from_millis(30));
        write_file(file.path(), "run \"b\" every minute;");
        worker.join().unwrap();
    }
}
