//! A `Schedule` decorator that logs mutations at `info` level.
//! Grounded on `chronos::ScheduleLoggingProxy`: `is_empty`,
//! `time_to_next_task` and `withdraw_next_task` pass straight through,
//! while `add`/`reschedule`/`retry` log around the delegated call.

use cadence_core::{Clock, Task};
use chrono::Duration;
use tracing::info;

use crate::schedule::Schedule;

pub struct LoggingSchedule {
    inner: Schedule,
}

impl LoggingSchedule {
    pub fn new(inner: Schedule) -> Self {
        Self { inner }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn add(&self, task: Task) {
        info!(command = %task.command, time = %task.time, "added new task to schedule");
        self.inner.add(task);
    }

    pub fn reschedule(&self, task: Task) {
        let rescheduled = self.inner.reschedule(task);
        info!(command = %rescheduled.command, time = %rescheduled.time, "rescheduled task");
    }

    pub fn retry(&self, task: &Task) {
        info!(command = %task.command, "task will be retried");
        self.inner.retry(task);
    }

    pub fn time_to_next_task(&self, clock: &dyn Clock) -> Duration {
        self.inner.time_to_next_task(clock)
    }

    pub fn withdraw_next_task(&self) -> Task {
        self.inner.withdraw_next_task()
    }

    pub fn into_inner(self) -> Schedule {
        self.inner
    }
}
