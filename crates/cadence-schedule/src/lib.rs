//! The time-wheel schedule: a thread-safe priority queue of tasks plus
//! a logging decorator.

pub mod logging;
pub mod schedule;

pub use logging::LoggingSchedule;
pub use schedule::Schedule;
