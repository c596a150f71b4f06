//! A priority queue of tasks ordered by next-due time, safe to share
//! across the coordinator and supervisor threads. Grounded on
//! `chronos::Schedule` backed by `chronos::ThreadsafePriorityQueue`
//! (a `std::priority_queue` behind a `shared_mutex`) — here a
//! `BinaryHeap` behind a `RwLock` plays the same role.

use std::collections::BinaryHeap;
use std::sync::RwLock;

use cadence_core::{create_retry, transit, Clock, Task};
use chrono::Duration;

/// The live set of pending tasks. `Task`'s `Ord` impl makes the heap
/// pop the earliest-due task first.
#[derive(Default)]
pub struct Schedule {
    queue: RwLock<BinaryHeap<Task>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self { queue: RwLock::new(BinaryHeap::new()) }
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self { queue: RwLock::new(tasks.into_iter().collect()) }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.read().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.read().unwrap().len()
    }

    pub fn add(&self, task: Task) {
        self.queue.write().unwrap().push(task);
    }

    /// Advances `task` by its interval, resets its attempt count, and
    /// reinserts it. Returns the task as advanced, so a caller that
    /// needs to observe the new state (e.g. to log it) doesn't have to
    /// redo the transition itself.
    pub fn reschedule(&self, mut task: Task) -> Task {
        transit(&mut task);
        self.queue.write().unwrap().push(task.clone());
        task
    }

    /// Inserts the retry derived from `task`, leaving any copy the
    /// caller holds untouched.
    pub fn retry(&self, task: &Task) {
        self.queue.write().unwrap().push(create_retry(task));
    }

    /// How long until the earliest-due task, relative to `clock`.
    /// Negative if that task is already overdue.
    ///
    /// # Panics
    /// Panics if the schedule is empty; callers must check
    /// `is_empty()` first, same as the coordinator loop does.
    pub fn time_to_next_task(&self, clock: &dyn Clock) -> Duration {
        let queue = self.queue.read().unwrap();
        let next = queue.peek().expect("time_to_next_task called on an empty schedule");
        next.time - clock.now()
    }

    /// Removes and returns the earliest-due task.
    ///
    /// # Panics
    /// Panics if the schedule is empty; callers must check
    /// `is_empty()` first.
    pub fn withdraw_next_task(&self) -> Task {
        self.queue
            .write()
            .unwrap()
            .pop()
            .expect("withdraw_next_task called on an empty schedule")
    }
}
