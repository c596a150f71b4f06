//! The `Task` value type, its derived predicates, and the time
//! arithmetic used to reschedule it or spawn a retry.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// How often a task recurs. Hours and minutes are duration-based (wall
/// time arithmetic); days, weeks and months are calendar-based (date
/// arithmetic that preserves time-of-day).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Minutes(u32),
    Hours(u32),
    Days(u32),
    Weeks(u32),
    Months(u32),
}

/// A scheduled unit of work.
///
/// `month_anchor_day` is internal bookkeeping that lets `Months`
/// rescheduling preserve the originally intended day-of-month across
/// a short month instead of drifting toward the clamped value (see
/// `transit`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub command: String,
    pub time: NaiveDateTime,
    pub interval: Interval,
    pub attempts_count: u32,
    pub max_retries_count: u32,
    pub retry_after: Duration,
    month_anchor_day: Option<u32>,
}

impl Task {
    /// Builds a fresh (non-retry) task. `time` is the already-resolved
    /// first execution instant (the converter, not this constructor,
    /// is responsible for finding the closest future time).
    pub fn new(
        command: impl Into<String>,
        time: NaiveDateTime,
        interval: Interval,
        max_retries_count: u32,
        retry_after: Duration,
    ) -> Self {
        let month_anchor_day = match interval {
            Interval::Months(_) => Some(time.day()),
            _ => None,
        };
        Self {
            command: command.into(),
            time,
            interval,
            attempts_count: 0,
            max_retries_count,
            retry_after,
            month_anchor_day,
        }
    }
}

/// Tasks order earliest-due-first when placed in a `BinaryHeap`
/// (which is otherwise a max-heap) — mirrors `chronos::Task`'s
/// `operator<` flipping comparison direction for the same reason.
impl Ord for Task {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.cmp(&self.time)
    }
}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn is_retry(task: &Task) -> bool {
    task.attempts_count > 0
}

pub fn has_attempts_left(task: &Task) -> bool {
    task.attempts_count < task.max_retries_count
}

/// Derives the next retry attempt from a task that just failed.
/// Leaves `task` untouched; the caller inserts the returned task.
pub fn create_retry(task: &Task) -> Task {
    let mut retry = task.clone();
    retry.time = task.time + task.retry_after;
    retry.attempts_count = task.attempts_count + 1;
    retry
}

/// Advances a fresh task's `time` by its interval and resets
/// `attempts_count` to 0, in place.
pub fn transit(task: &mut Task) {
    task.time = advance(task.time, task.interval, task.month_anchor_day);
    task.attempts_count = 0;
}

fn advance(time: NaiveDateTime, interval: Interval, month_anchor_day: Option<u32>) -> NaiveDateTime {
    match interval {
        Interval::Minutes(n) => time + Duration::minutes(n as i64),
        Interval::Hours(n) => time + Duration::hours(n as i64),
        Interval::Days(n) => time + Duration::days(n as i64),
        Interval::Weeks(n) => time + Duration::weeks(n as i64),
        Interval::Months(n) => add_months_clamped(time, n, month_anchor_day),
    }
}

/// Adds `months` calendar months to `time`, preserving time-of-day.
/// The target day-of-month is `anchor_day` (falling back to `time`'s
/// own day when absent), clamped to the target month's length.
/// Reusing the anchor rather than the clamped day of the previous
/// result is what makes day 31 land on day 31 again two months later
/// instead of drifting to day 30.
fn add_months_clamped(time: NaiveDateTime, months: u32, anchor_day: Option<u32>) -> NaiveDateTime {
    let date = time.date();
    let day = anchor_day.unwrap_or_else(|| date.day());
    let total_months = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;
    let clamped_day = day.min(days_in_month(year, month));
    let new_date =
        NaiveDate::from_ymd_opt(year, month, clamped_day).expect("year/month/day always valid after clamping");
    NaiveDateTime::new(new_date, time.time())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_this_month = NaiveDate::from_ymd_opt(year, month, 1).expect("valid year/month");
    let first_of_next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid year/month");
    (first_of_next_month - first_of_this_month).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn is_retry_distinguishes_fresh_from_derived() {
        let fresh = Task::new("echo hi", dt(2020, 1, 1, 0, 0), Interval::Days(1), 3, Duration::seconds(5));
        assert!(!is_retry(&fresh));

        let retry = create_retry(&fresh);
        assert!(is_retry(&retry));
    }

    #[test]
    fn has_attempts_left_compares_against_budget() {
        let mut task = Task::new("echo hi", dt(2020, 1, 1, 0, 0), Interval::Days(1), 2, Duration::seconds(5));
        assert!(has_attempts_left(&task));
        task.attempts_count = 2;
        assert!(!has_attempts_left(&task));
    }

    #[test]
    fn create_retry_advances_time_by_retry_after_and_bumps_attempts() {
        let task = Task::new(
            "echo hi",
            dt(2020, 7, 1, 12, 0),
            Interval::Days(1),
            3,
            Duration::seconds(10),
        );
        let retry = create_retry(&task);
        assert_eq!(retry.time, dt(2020, 7, 1, 12, 0) + Duration::seconds(10));
        assert_eq!(retry.attempts_count, 1);
        assert_eq!(retry.command, task.command);
        assert_eq!(retry.max_retries_count, task.max_retries_count);
    }

    #[test]
    fn retry_of_retry_keeps_incrementing() {
        let task = Task::new("x", dt(2020, 1, 1, 0, 0), Interval::Hours(1), 5, Duration::seconds(1));
        let r1 = create_retry(&task);
        let r2 = create_retry(&r1);
        assert_eq!(r2.attempts_count, 2);
    }

    // Hourly and minute-based transit.
    #[test]
    fn transit_hours_and_minutes_add_wall_duration() {
        let mut task = Task::new("x", dt(2021, 2, 22, 1, 0), Interval::Hours(2), 0, Duration::seconds(0));
        transit(&mut task);
        assert_eq!(task.time, dt(2021, 2, 22, 3, 0));

        let mut minutes_task = Task::new("x", dt(2021, 2, 22, 3, 0), Interval::Minutes(30), 0, Duration::seconds(0));
        transit(&mut minutes_task);
        assert_eq!(minutes_task.time, dt(2021, 2, 22, 3, 30));
    }

    // Week transit.
    #[test]
    fn transit_weeks_advances_seven_days_per_week() {
        let mut task = Task::new("x", dt(2021, 1, 14, 1, 0), Interval::Weeks(1), 0, Duration::seconds(0));
        transit(&mut task);
        assert_eq!(task.time, dt(2021, 1, 21, 1, 0));
    }

    // Month transit preserving time-of-day.
    #[test]
    fn transit_months_preserves_time_of_day() {
        let mut task = Task::new("x", dt(2021, 12, 30, 10, 0), Interval::Months(3), 0, Duration::seconds(0));
        transit(&mut task);
        assert_eq!(task.time, dt(2022, 3, 30, 10, 0));
    }

    // Day-of-month intent survives a short month in between.
    #[test]
    fn month_anchor_survives_clamping_across_a_short_month() {
        let mut task = Task::new("x", dt(2020, 10, 31, 0, 0), Interval::Months(1), 0, Duration::seconds(0));
        transit(&mut task);
        assert_eq!(task.time, dt(2020, 11, 30, 0, 0));
        transit(&mut task);
        assert_eq!(task.time, dt(2020, 12, 31, 0, 0));
    }

    #[test]
    fn transit_resets_attempts_count() {
        let task = Task::new("x", dt(2020, 1, 1, 0, 0), Interval::Days(1), 3, Duration::seconds(5));
        let mut retry = create_retry(&task);
        assert_eq!(retry.attempts_count, 1);
        transit(&mut retry);
        assert_eq!(retry.attempts_count, 0);
    }

    #[test]
    fn ordering_is_earliest_time_first() {
        let later = Task::new("later", dt(2020, 1, 3, 1, 0), Interval::Days(1), 0, Duration::seconds(0));
        let earlier = Task::new("earlier", dt(2020, 1, 1, 1, 0), Interval::Days(1), 0, Duration::seconds(0));
        assert!(earlier > later, "earlier task should sort as greater so BinaryHeap pops it first");
    }

    #[test]
    fn days_in_month_handles_leap_february() {
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2021, 2), 28);
        assert_eq!(days_in_month(2021, 4), 30);
        assert_eq!(days_in_month(2021, 12), 31);
    }
}
