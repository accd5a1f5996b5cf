//! Error types and handling for the Klotho runtime.

use thiserror::Error;

/// A blocking operation was asked to stop before it finished waiting.
///
/// This is the Rust stand-in for thread interruption: it is produced whenever
/// a [`CancellationToken`](crate::CancellationToken) fires while someone is
/// sleeping or waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted while waiting")]
pub struct Interrupted;

/// Errors that can occur while a task runs or while its result is awaited.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Task was cancelled before it produced a value
    #[error("task was cancelled")]
    Cancelled,
    /// Task panicked during execution
    #[error("task panicked: {0}")]
    Panicked(String),
    /// Task hit an unrecoverable condition and gave up
    #[error("task failed: {message}")]
    Fatal {
        /// Human readable description of the failure
        message: String,
        /// The interruption that made the task give up
        #[source]
        source: Interrupted,
    },
    /// Waiting for the result exceeded the caller's deadline
    #[error("timed out waiting for task result")]
    Timeout,
    /// The caller waiting for the result was interrupted
    #[error("interrupted while waiting for task result")]
    WaitInterrupted,
}

impl TaskError {
    /// Build a fatal failure caused by an interruption.
    #[must_use]
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
            source: Interrupted,
        }
    }

    /// Whether this error came from the task itself rather than from waiting on it.
    #[must_use]
    pub const fn is_task_failure(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Panicked(_) | Self::Fatal { .. })
    }
}

/// Errors that can occur during executor operations.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Executor has been shut down and no longer accepts tasks
    #[error("executor is shut down and rejects new tasks")]
    Rejected,
    /// The executor's bounded queue is full
    #[error("task queue is full ({0} tasks)")]
    QueueFull(usize),
    /// Executor configuration is invalid
    #[error("invalid executor configuration: {0}")]
    InvalidConfiguration(String),
    /// A worker thread could not be started
    #[error("failed to spawn worker thread")]
    ThreadSpawn(#[source] std::io::Error),
    /// Waiting on the executor was interrupted
    #[error("executor wait was interrupted")]
    Interrupted(#[from] Interrupted),
}

/// A result type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// A result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;
