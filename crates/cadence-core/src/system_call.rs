//! Shell command execution. The scheduler never parses or interprets
//! a command string; it hands it to the shell verbatim and reports
//! back whether it exited cleanly.

use std::process::Command;

/// Outcome of running a command: whether it exited with status 0, and
/// its combined stdout+stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub success: bool,
    pub message: String,
}

/// Runs an arbitrary shell command and reports the result.
pub trait SystemCall: Send + Sync {
    fn call(&self, command: &str) -> CallResult;
}

/// Executes `command` through `sh -c`, redirecting stderr into stdout
/// the way the schedule file's commands expect their output captured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellSystemCall;

impl SystemCall for ShellSystemCall {
    fn call(&self, command: &str) -> CallResult {
        let redirected = format!("{command} 2>&1");
        match Command::new("sh").arg("-c").arg(redirected).output() {
            Ok(output) => CallResult {
                success: output.status.success(),
                message: String::from_utf8_lossy(&output.stdout).into_owned(),
            },
            // Couldn't even spawn the child (e.g. pipe open failed).
            // Not a scheduler error: it's an execution failure with no message.
            Err(_) => CallResult {
                success: false,
                message: String::new(),
            },
        }
    }
}

/// Logs around a `SystemCall`, grounded on
/// `chronos::SystemCallLoggingProxy`: entry at `info`, then success or
/// failure depending on the wrapped call's outcome.
pub struct LoggingSystemCall<T> {
    inner: T,
}

impl<T: SystemCall> LoggingSystemCall<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: SystemCall> SystemCall for LoggingSystemCall<T> {
    fn call(&self, command: &str) -> CallResult {
        tracing::info!(command, "executing command");
        let result = self.inner.call(command);
        if result.success {
            tracing::info!(command, "execution succeeded");
        } else {
            tracing::error!(command, "execution failed");
        }
        result
    }
}
