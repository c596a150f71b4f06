//! Parses a schedule file's text into a sequence of `cadence_core::Task`
//! values, by way of a token stream (`lexer`), a parse tree (`entry`,
//! `parser`) and a `Clock`-driven time resolution pass (`converter`).

pub mod converter;
pub mod entry;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod parser;

pub use entry::{AtClause, AtPart, DayValue, Frequency, FrequencyUnit, RetryClause, RetryUnit, TaskEntry};
pub use error::{ParseError, Result};
pub use logging::LoggingParser;

use cadence_core::{Clock, Task};

/// Parses a whole schedule file and resolves every entry into a `Task`
/// against `clock`. Entries are resolved in the order they appear.
pub fn parse_tasks(source: &str, clock: &dyn Clock) -> Result<Vec<Task>> {
    parser::parse_schedule(source)?
        .iter()
        .map(|entry| converter::convert(entry, clock))
        .collect()
}
