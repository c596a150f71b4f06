//! Drives a `Dispatcher` from a dedicated worker thread. Grounded on
//! `chronos::Coordinator` and its `coordinator::Timer`, generalized
//! here to `cadence_core::Timer` so tests can swap in an instant one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cadence_core::Timer;
use chrono::Duration;

use crate::dispatcher::Dispatcher;

/// How long the coordinator waits when the schedule has nothing in
/// it, rather than trying to peek an empty heap.
const IDLE_WAIT: Duration = Duration::hours(24);

/// Running / Terminating / Stopped state machine around one
/// `Dispatcher`. `run` occupies the calling thread until `terminate`
/// (called from elsewhere, via `handle()`) is observed.
pub struct Coordinator {
    dispatcher: Arc<Dispatcher>,
    timer: Arc<dyn Timer>,
    terminated: Arc<AtomicBool>,
}

impl Coordinator {
    pub fn new(dispatcher: Arc<Dispatcher>, timer: Arc<dyn Timer>) -> Self {
        Self { dispatcher, timer, terminated: Arc::new(AtomicBool::new(false)) }
    }

    /// A cloneable remote control: the owner of this can request
    /// termination without owning the `Coordinator` (or the thread
    /// running it) directly.
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle { timer: Arc::clone(&self.timer), terminated: Arc::clone(&self.terminated) }
    }

    /// Runs the `Running` state until `terminate()` is observed.
    /// Intended to be the body of a dedicated worker thread.
    pub fn run(&self) {
        loop {
            let wait_for = if self.dispatcher.is_empty() { IDLE_WAIT } else { self.dispatcher.time_to_next_task() };
            self.timer.wait(wait_for);

            if self.terminated.load(Ordering::SeqCst) {
                return;
            }
            if !self.dispatcher.is_empty() {
                self.dispatcher.handle_next_task();
            }
        }
    }
}

#[derive(Clone)]
pub struct CoordinatorHandle {
    timer: Arc<dyn Timer>,
    terminated: Arc<AtomicBool>,
}

impl CoordinatorHandle {
    /// Requests a clean stop: the worker finishes or skips its current
    /// wait and returns without executing a pending task.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        self.timer.interrupt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::test_support::{FakeClock, InstantTimer, ScriptedSystemCall};
    use cadence_core::{Interval, Task};
    use cadence_schedule::{LoggingSchedule, Schedule};
    use chrono::NaiveDate;
    use std::thread;
    use std::time::Duration as StdDuration;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, mi, 0).unwrap()
    }

    #[test]
    fn terminate_stops_the_loop_without_running_a_pending_task() {
        let schedule = Schedule::new();
        schedule.add(Task::new("echo hi", dt(2020, 1, 1, 0, 0), Interval::Days(1), 0, Duration::seconds(0)));
        let system_call = Arc::new(ScriptedSystemCall::always_succeeding());
        let dispatcher = Arc::new(crate::dispatcher::Dispatcher::new(
            Arc::new(LoggingSchedule::new(schedule)),
            system_call.clone(),
            Arc::new(FakeClock::at(dt(2020, 1, 1, 0, 0))),
        ));
        let timer = Arc::new(InstantTimer::default());
        let coordinator = Coordinator::new(dispatcher, timer);
        let handle = coordinator.handle();

        handle.terminate();
        coordinator.run();

        assert_eq!(system_call.call_count(), 0);
    }

    #[test]
    fn terminate_wakes_a_thread_blocked_in_run() {
        let schedule = Schedule::new();
        schedule.add(Task::new("echo hi", dt(2099, 1, 1, 0, 0), Interval::Days(1), 0, Duration::seconds(0)));
        let system_call = Arc::new(ScriptedSystemCall::always_succeeding());
        let dispatcher = Arc::new(crate::dispatcher::Dispatcher::new(
            Arc::new(LoggingSchedule::new(schedule)),
            system_call,
            Arc::new(FakeClock::at(dt(2020, 1, 1, 0, 0))),
        ));
        let timer = Arc::new(cadence_core::CondvarTimer::new());
        let coordinator = Arc::new(Coordinator::new(dispatcher, timer));
        let handle = coordinator.handle();

        let runner = Arc::clone(&coordinator);
        let worker = thread::spawn(move || runner.run());
        thread::sleep(StdDuration::from_millis(20));
        handle.terminate();
        worker.join().unwrap();
    }
}
