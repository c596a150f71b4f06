//! The parse tree for a single schedule-file entry, one level above the
//! token stream and one level below the resolved `cadence_core::Task`.
//! `Converter` (see `converter.rs`) is what turns this into a `Task`,
//! once it has a `Clock` to resolve "closest future time" against.

use chrono::Weekday;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    pub count: u32,
    pub unit: FrequencyUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayValue {
    /// No day token was part of this at-clause (the at-hour and
    /// at-minute forms don't carry one).
    Unspecified,
    MonthDay(u32),
    Weekday(Weekday),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtPart {
    pub day: DayValue,
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtClause {
    /// The entry had no `at` clause at all.
    None,
    Present(AtPart),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryClause {
    pub retry_time_count: u32,
    pub retry_time_unit: RetryUnit,
    pub retries_count: u32,
}

impl RetryClause {
    /// What an entry with no `retry after ...` clause at all gets.
    pub fn none() -> Self {
        Self { retry_time_count: 0, retry_time_unit: RetryUnit::Seconds, retries_count: 0 }
    }

    pub fn retry_after_seconds(&self) -> i64 {
        let per_unit = match self.retry_time_unit {
            RetryUnit::Seconds => 1,
            RetryUnit::Minutes => 60,
            RetryUnit::Hours => 3_600,
            RetryUnit::Days => 86_400,
        };
        self.retry_time_count as i64 * per_unit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub command: String,
    pub frequency: Frequency,
    pub at: AtClause,
    pub retry: RetryClause,
}
