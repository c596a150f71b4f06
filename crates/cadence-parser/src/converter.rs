//! Resolves a `TaskEntry` parse tree into a `cadence_core::Task` by
//! picking the task's first execution time — the "closest future time
//! point" for whichever `at`-clause shape (or its absence) the entry
//! carries. Grounded on `chronos::TaskBuilder`'s family of
//! `closest_future_time_point` overloads, with two corrections over
//! that code (see `DESIGN.md`): the weekly case treats an exact
//! time-of-day match as "already passed" rather than silently firing
//! immediately, and the monthly case rolls over the year at December.

use cadence_core::{Clock, Interval, Task};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::entry::{AtClause, AtPart, DayValue, FrequencyUnit, TaskEntry};
use crate::error::{ParseError, Result};

pub fn convert(entry: &TaskEntry, clock: &dyn Clock) -> Result<Task> {
    let now = clock.now();
    let time = resolve_time(entry, now)?;
    let interval = match entry.frequency.unit {
        FrequencyUnit::Minutes => Interval::Minutes(entry.frequency.count),
        FrequencyUnit::Hours => Interval::Hours(entry.frequency.count),
        FrequencyUnit::Days => Interval::Days(entry.frequency.count),
        FrequencyUnit::Weeks => Interval::Weeks(entry.frequency.count),
        FrequencyUnit::Months => Interval::Months(entry.frequency.count),
    };
    let retry_after = Duration::seconds(entry.retry.retry_after_seconds());
    Ok(Task::new(entry.command.clone(), time, interval, entry.retry.retries_count, retry_after))
}

fn resolve_time(entry: &TaskEntry, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let at = match entry.at {
        AtClause::None => return Ok(start_of_next_minute(now)),
        AtClause::Present(at) => at,
    };

    match entry.frequency.unit {
        FrequencyUnit::Minutes => Ok(start_of_next_minute(now)),
        FrequencyUnit::Hours => Ok(closest_at_minute(now, at.minute)),
        FrequencyUnit::Days => Ok(closest_at_hour(now, at.hour, at.minute)),
        FrequencyUnit::Weeks => {
            let weekday = expect_weekday(at)?;
            Ok(closest_weekday(now, weekday, at.hour, at.minute))
        }
        FrequencyUnit::Months => {
            let day = expect_month_day(at)?;
            Ok(closest_month_day(now, day, at.hour, at.minute))
        }
    }
}

fn expect_weekday(at: AtPart) -> Result<Weekday> {
    match at.day {
        DayValue::Weekday(w) => Ok(w),
        _ => Err(ParseError::syntax(0, "a weekly schedule's 'at' clause must name a weekday")),
    }
}

fn expect_month_day(at: AtPart) -> Result<u32> {
    match at.day {
        DayValue::MonthDay(d) => Ok(d),
        _ => Err(ParseError::syntax(0, "a monthly schedule's 'at' clause must name a day of month")),
    }
}

/// `hour == 24` means "midnight, the following day" throughout this
/// module; every candidate built from a user-supplied hour runs
/// through this first.
fn canonical_hour(hour: u32) -> (u32, i64) {
    if hour == 24 {
        (0, 1)
    } else {
        (hour, 0)
    }
}

fn start_of_next_minute(now: NaiveDateTime) -> NaiveDateTime {
    let truncated = now.date().and_hms_opt(now.hour(), now.minute(), 0).unwrap();
    truncated + Duration::minutes(1)
}

/// This hour at `minute`, compared against the full current instant
/// (including seconds) so a match within the same minute still counts
/// as past; otherwise the same minute next hour.
fn closest_at_minute(now: NaiveDateTime, minute: u32) -> NaiveDateTime {
    let candidate = now.date().and_hms_opt(now.hour(), minute, 0).unwrap();
    if now < candidate {
        candidate
    } else {
        candidate + Duration::hours(1)
    }
}

/// Today at `hour:minute`, compared by time-of-day only (seconds are
/// not part of the comparison); otherwise tomorrow.
fn closest_at_hour(now: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    let (hour, extra_days) = canonical_hour(hour);
    let base_date = now.date() + Duration::days(extra_days);
    let candidate = base_date.and_hms_opt(hour, minute, 0).unwrap();
    if minutes_of_day(now.hour(), now.minute()) < minutes_of_day(hour, minute) {
        candidate
    } else {
        candidate + Duration::days(1)
    }
}

/// The next occurrence of `weekday` at `hour:minute`. A match on
/// today's weekday only counts if `hour:minute` is still strictly
/// ahead of now; otherwise it rolls to the same weekday next week.
fn closest_weekday(now: NaiveDateTime, weekday: Weekday, hour: u32, minute: u32) -> NaiveDateTime {
    let (hour, extra_days) = canonical_hour(hour);
    let days_until = days_until_weekday(now.weekday(), weekday);
    let mut candidate_date = now.date() + Duration::days(days_until as i64 + extra_days);
    let mut candidate = candidate_date.and_hms_opt(hour, minute, 0).unwrap();
    if days_until == 0 && extra_days == 0 && candidate <= now {
        candidate_date += Duration::days(7);
        candidate = candidate_date.and_hms_opt(hour, minute, 0).unwrap();
    }
    candidate
}

fn days_until_weekday(from: Weekday, to: Weekday) -> i64 {
    let f = from.num_days_from_monday() as i64;
    let t = to.num_days_from_monday() as i64;
    (t - f).rem_euclid(7)
}

/// This month at `day:hour:minute` if that's still ahead of now
/// (compared lexicographically as day, then hour, then minute); else
/// the same day next month, clamped to that month's length and
/// carrying the year over at a December rollover.
fn closest_month_day(now: NaiveDateTime, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    let (hour, extra_days) = canonical_hour(hour);
    let now_key = (now.day(), now.hour(), now.minute());
    let target_key = (day, hour, minute);
    let (year, month) = if target_key > now_key && extra_days == 0 {
        (now.year(), now.month())
    } else {
        next_month(now.year(), now.month())
    };
    let clamped_day = day.min(days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, clamped_day).expect("valid after clamping");
    let date = date + Duration::days(extra_days);
    NaiveDateTime::new(date, NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_this_month = NaiveDate::from_ymd_opt(year, month, 1).expect("valid year/month");
    let (next_year, next_month) = next_month(year, month);
    let first_of_next_month = NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("valid year/month");
    (first_of_next_month - first_of_this_month).num_days() as u32
}

fn minutes_of_day(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::test_support::FakeClock;
    use crate::parser::parse_schedule;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, mi, 0).unwrap()
    }

    fn convert_one(source: &str, now: NaiveDateTime) -> Task {
        let entries = parse_schedule(source).unwrap();
        let clock = FakeClock::at(now);
        convert(&entries[0], &clock).unwrap()
    }

    #[test]
    fn no_at_clause_resolves_to_start_of_next_minute() {
        let task = convert_one(r#"run "x" every minute;"#, dt(2020, 1, 1, 10, 30));
        assert_eq!(task.time, dt(2020, 1, 1, 10, 31));
    }

    #[test]
    fn at_minute_rolls_to_next_hour_when_already_past() {
        // now is 10:45:30 (seconds matter for at-minute); target minute 10 has passed this hour.
        let now = dt(2020, 1, 1, 10, 45) + Duration::seconds(30);
        let task = convert_one(r#"run "x" every 2 hours at 10;"#, now);
        assert_eq!(task.time, dt(2020, 1, 1, 11, 10));
    }

    #[test]
    fn at_minute_stays_this_hour_when_still_future() {
        let task = convert_one(r#"run "x" every 2 hours at 50;"#, dt(2020, 1, 1, 10, 30));
        assert_eq!(task.time, dt(2020, 1, 1, 10, 50));
    }

    #[test]
    fn at_hour_rolls_to_tomorrow_when_already_past() {
        let task = convert_one(r#"run "x" every day at 09:00;"#, dt(2020, 1, 1, 10, 0));
        assert_eq!(task.time, dt(2020, 1, 2, 9, 0));
    }

    #[test]
    fn at_hour_exact_match_counts_as_past() {
        let task = convert_one(r#"run "x" every day at 10:00;"#, dt(2020, 1, 1, 10, 0));
        assert_eq!(task.time, dt(2020, 1, 2, 10, 0));
    }

    // Spec scenario: Friday -> next Monday.
    #[test]
    fn weekday_from_friday_lands_on_following_monday() {
        let friday = dt(2020, 8, 7, 12, 0);
        let task = convert_one(r#"run "x" every week at monday 00:00;"#, friday);
        assert_eq!(task.time, dt(2020, 8, 10, 0, 0));
    }

    // Spec scenario: Sunday still resolves to the same Monday.
    #[test]
    fn weekday_from_sunday_lands_on_same_monday() {
        let sunday = dt(2020, 8, 9, 23, 0);
        let task = convert_one(r#"run "x" every week at monday 00:00;"#, sunday);
        assert_eq!(task.time, dt(2020, 8, 10, 0, 0));
    }

    #[test]
    fn weekday_exact_match_rolls_to_next_week() {
        let monday_morning = dt(2020, 8, 10, 9, 0);
        let task = convert_one(r#"run "x" every week at monday 09:00;"#, monday_morning);
        assert_eq!(task.time, dt(2020, 8, 17, 9, 0));
    }

    #[test]
    fn month_day_still_ahead_this_month() {
        let task = convert_one(r#"run "x" every month at 20 00:00;"#, dt(2020, 6, 10, 8, 0));
        assert_eq!(task.time, dt(2020, 6, 20, 0, 0));
    }

    #[test]
    fn month_day_already_past_rolls_to_next_month() {
        let task = convert_one(r#"run "x" every month at 5 00:00;"#, dt(2020, 6, 10, 8, 0));
        assert_eq!(task.time, dt(2020, 7, 5, 0, 0));
    }

    #[test]
    fn month_day_rollover_carries_the_year() {
        let task = convert_one(r#"run "x" every month at 1 00:00;"#, dt(2020, 12, 10, 8, 0));
        assert_eq!(task.time, dt(2021, 1, 1, 0, 0));
    }

    #[test]
    fn month_day_clamps_to_short_month_length() {
        let task = convert_one(r#"run "x" every month at 31 00:00;"#, dt(2021, 1, 31, 8, 0));
        assert_eq!(task.time, dt(2021, 2, 28, 0, 0));
    }

    #[test]
    fn weekly_entry_without_a_weekday_is_rejected() {
        let entries = parse_schedule(r#"run "x" every week at 09:00;"#).unwrap();
        let clock = FakeClock::at(dt(2020, 1, 1, 0, 0));
        assert!(convert(&entries[0], &clock).is_err());
    }

    #[test]
    fn monthly_entry_without_a_day_is_rejected() {
        let entries = parse_schedule(r#"run "x" every month at monday 09:00;"#).unwrap();
        let clock = FakeClock::at(dt(2020, 1, 1, 0, 0));
        assert!(convert(&entries[0], &clock).is_err());
    }

    #[test]
    fn retry_settings_are_carried_onto_the_task() {
        let task = convert_one(r#"run "x" every 3 hours retry after 5 seconds 3 times;"#, dt(2020, 1, 1, 0, 0));
        assert_eq!(task.max_retries_count, 3);
        assert_eq!(task.retry_after, Duration::seconds(5));
    }
}
