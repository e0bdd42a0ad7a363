//! Error types for the upres core library.
//!
//! All fallible operations in this crate return [`CoreResult`]. The helper
//! constructors keep call sites that wrap external process failures terse.

use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for upres.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("External dependency '{0}' not found in PATH")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Command '{cmd}' failed (status {status}): {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, #[source] std::io::Error),

    #[error("Pipeline stage '{stage}' failed with status {status}")]
    StageFailed { stage: String, status: ExitStatus },

    #[error("Size targeting unavailable: {0}")]
    SizeTargetUnavailable(String),
}

/// Result type for upres operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Creates a `CommandStart` error for the named command.
pub(crate) fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Creates a `CommandFailed` error for the named command.
pub(crate) fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}

/// Creates a `CommandWait` error for the named command.
pub(crate) fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}
