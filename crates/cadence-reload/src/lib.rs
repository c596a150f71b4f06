//! File-watching reload supervision: a `FileGuard`/`FileLock` pair
//! that detects schedule-file edits, and a `Supervisor` that drives
//! the dispatch loop and swaps the schedule in on a successful
//! reparse.

pub mod error;
pub mod file_guard;
pub mod file_lock;
pub mod filesystem;
pub mod supervisor;

pub use error::{ReloadError, Result};
pub use file_guard::FileGuard;
pub use file_lock::FileLock;
pub use supervisor::{read_schedule, Supervisor, FILE_CHECK_INTERVAL};
