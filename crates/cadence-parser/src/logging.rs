//! Logs around a whole-file parse: a task-count summary on success, the
//! syntax error and its position on failure. Grounded on
//! `Chronos.cpp`'s `logging_parser_t = ParserLoggingProxy<parser_t>`,
//! used in place of the bare parser for every schedule-file read.

use cadence_core::{Clock, Task};
use tracing::{error, info};

use crate::error::Result;

/// Thin wrapper around `parse_tasks`, mirroring `LoggingSchedule` and
/// `LoggingSystemCall`'s decorator shape for the one remaining
/// capability this tree proxies for logging.
pub struct LoggingParser;

impl LoggingParser {
    pub fn parse(source: &str, clock: &dyn Clock) -> Result<Vec<Task>> {
        match crate::parse_tasks(source, clock) {
            Ok(tasks) => {
                info!(task_count = tasks.len(), "parsed schedule file");
                Ok(tasks)
            }
            Err(err) => {
                error!(position = err.position, message = %err.message, "failed to parse schedule file");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::test_support::FakeClock;
    use chrono::NaiveDate;

    fn clock_at(y: i32, m: u32, d: u32) -> FakeClock {
        FakeClock::at(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn parse_delegates_the_tasks_unchanged_on_success() {
        let clock = clock_at(2020, 1, 1);
        let tasks = LoggingParser::parse(r#"run "echo hi" every minute;"#, &clock).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].command, "echo hi");
    }

    #[test]
    fn parse_passes_the_syntax_error_through_unchanged() {
        let clock = clock_at(2020, 1, 1);
        let err = LoggingParser::parse(r#"run "echo hi" every minute"#, &clock).unwrap_err();
        assert_eq!(err, crate::parse_tasks(r#"run "echo hi" every minute"#, &clock).unwrap_err());
    }
}
