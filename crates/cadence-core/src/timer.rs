//! Interruptible bounded sleep. The coordinator and the file lock both
//! block here between ticks; `interrupt()` must wake a current waiter
//! without executing whatever it was waiting for.

use std::sync::{Condvar, Mutex};
use std::time::Duration as StdDuration;

use chrono::Duration;

/// A bounded sleep that an external caller can cut short.
///
/// Unlike the condition-variable wait this is modeled on, `interrupt()`
/// sets a sticky flag before signalling, so a call that arrives just
/// before `wait` begins is not lost.
pub trait Timer: Send + Sync {
    /// Block for up to `duration`, or until `interrupt()` is called.
    /// A negative duration returns immediately.
    fn wait(&self, duration: Duration);

    /// Wake any thread currently (or about to be) blocked in `wait`.
    fn interrupt(&self);
}

/// `Timer` built on `std::sync::Condvar`.
#[derive(Debug)]
pub struct CondvarTimer {
    interrupted: Mutex<bool>,
    condvar: Condvar,
}

impl Default for CondvarTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CondvarTimer {
    pub fn new() -> Self {
        Self {
            interrupted: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }
}

impl Timer for CondvarTimer {
    fn wait(&self, duration: Duration) {
        let wait_for = duration.to_std().unwrap_or(StdDuration::ZERO);
        let guard = self.interrupted.lock().unwrap();
        let (mut guard, _timeout_result) = self
            .condvar
            .wait_timeout_while(guard, wait_for, |interrupted| !*interrupted)
            .unwrap();
        *guard = false;
    }

    fn interrupt(&self) {
        let mut guard = self.interrupted.lock().unwrap();
        *guard = true;
        self.condvar.notify_one();
    }
}
