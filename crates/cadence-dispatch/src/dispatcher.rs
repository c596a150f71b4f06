//! Consumes the schedule's head, runs it through a `SystemCall`, and
//! applies the retry/reschedule policy. Grounded on
//! `chronos::Dispatcher` and `chronos::dispatcher::detail::move_retries`.

use std::sync::{Arc, RwLock};

use cadence_core::{has_attempts_left, is_retry, Clock, SystemCall};
use cadence_schedule::LoggingSchedule;
use chrono::Duration;

pub struct Dispatcher {
    schedule: RwLock<Arc<LoggingSchedule>>,
    system_call: Arc<dyn SystemCall>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(schedule: Arc<LoggingSchedule>, system_call: Arc<dyn SystemCall>, clock: Arc<dyn Clock>) -> Self {
        Self { schedule: RwLock::new(schedule), system_call, clock }
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.read().unwrap().is_empty()
    }

    pub fn time_to_next_task(&self) -> Duration {
        self.schedule.read().unwrap().time_to_next_task(self.clock.as_ref())
    }

    /// Withdraws the due task, executes it, and applies the
    /// consequence-table policy: a fresh task is always rescheduled
    /// for its next period; a retry is only rescheduled by way of
    /// spawning a further retry on failure, and is dropped otherwise.
    pub fn handle_next_task(&self) {
        let task = self.schedule.read().unwrap().withdraw_next_task();
        let outcome = self.system_call.call(&task.command);

        if !outcome.success && has_attempts_left(&task) {
            self.schedule.read().unwrap().retry(&task);
        }
        if !is_retry(&task) {
            self.schedule.read().unwrap().reschedule(task);
        }
    }

    /// Migrates outstanding retries from the currently active schedule
    /// into `new_schedule`, then makes `new_schedule` active. Fresh
    /// tasks from the old schedule are discarded.
    pub fn reload(&self, new_schedule: Arc<LoggingSchedule>) {
        let mut active = self.schedule.write().unwrap();
        move_retries(&active, &new_schedule);
        *active = new_schedule;
    }
}

/// Drains every task from `old` into `new`, keeping only retries.
///
/// The draining loop must examine every task including the last one —
/// checking emptiness *before* the final withdrawal, rather than after
/// it, silently drops whatever was left in the queue.
fn move_retries(old: &LoggingSchedule, new: &LoggingSchedule) {
    while !old.is_empty() {
        let task = old.withdraw_next_task();
        if is_retry(&task) {
            new.add(task);
        }
    }
}
