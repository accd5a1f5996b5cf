//! Errors surfaced by the demo flow.

use klotho_core::{ExecutorError, TaskError};
use thiserror::Error;

/// Result alias for demo operations.
pub type DemoResult<T> = Result<T, DemoError>;

/// Failures that abort the demonstration flow.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The worker pool could not be created or rejected a task
    #[error("executor error")]
    Executor(#[from] ExecutorError),
    /// The value-producing task failed, or waiting for it was interrupted
    #[error("value task did not produce a result")]
    Task(#[from] TaskError),
    /// The background thread could not be started
    #[error("failed to start background thread")]
    Spawn(#[source] std::io::Error),
    /// The demo configuration is unusable
    #[error("invalid demo configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_task_failure_chain() {
        let err = DemoError::from(TaskError::interrupted("task interrupted"));
        assert_eq!(err.to_string(), "value task did not produce a result");

        let cause = err.source().expect("task errors are wrapped");
        assert_eq!(cause.to_string(), "task failed: task interrupted");
        let root = cause.source().expect("fatal failures keep the interruption");
        assert_eq!(root.to_string(), "interrupted while waiting");
    }

    #[test]
    fn test_executor_error_conversion() {
        let err: DemoError = ExecutorError::Rejected.into();
        assert!(matches!(err, DemoError::Executor(ExecutorError::Rejected)));
    }
}
