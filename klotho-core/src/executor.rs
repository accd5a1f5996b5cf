//! Executor trait definitions and configuration.

use crate::{CancellationToken, ExecutorError, ExecutorResult, Task, TaskHandle};
use core::fmt;
use core::time::Duration;

/// Task submission capabilities.
pub trait TaskSpawner: Send + Sync + 'static {
    /// Spawn a task for execution.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Rejected`] once the executor is shutting down.
    fn spawn<T>(&self, task: T) -> ExecutorResult<TaskHandle<T::Output>>
    where
        T: Task;
}

/// Executor lifecycle and control operations.
pub trait ExecutorControl: Send + Sync + 'static {
    /// Shutdown the executor gracefully.
    ///
    /// # Behavior Guarantees
    /// - Queued and running tasks still complete
    /// - New submissions are rejected
    /// - Idempotent operation
    fn shutdown(&self);

    /// Stop the executor as fast as possible.
    ///
    /// # Behavior Guarantees
    /// - Queued tasks are discarded and their handles resolve as cancelled
    /// - Running tasks have their cancellation tokens fired (best effort)
    /// - Returns the number of discarded tasks
    fn shutdown_now(&self) -> usize;

    /// Block until every worker has exited or `timeout` elapses.
    ///
    /// Returns `true` if the executor terminated in time.
    fn await_termination(&self, timeout: Duration) -> bool;

    /// Like [`await_termination`](Self::await_termination), but stops when
    /// `interrupt` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Interrupted`] if the wait was interrupted.
    fn await_termination_interruptible(
        &self,
        timeout: Duration,
        interrupt: &CancellationToken,
    ) -> ExecutorResult<bool>;

    /// Whether shutdown has been requested.
    fn is_shutdown(&self) -> bool;

    /// Whether shutdown has been requested and every worker has exited.
    fn is_terminated(&self) -> bool;

    /// Current lifecycle state.
    fn state(&self) -> ExecutorState;

    /// Get the number of worker threads.
    fn worker_count(&self) -> usize;

    /// Get the current load (queued plus running tasks).
    fn load(&self) -> usize;
}

/// Combined executor trait with all capabilities.
pub trait Executor: TaskSpawner + ExecutorControl {}

impl<E: TaskSpawner + ExecutorControl> Executor for E {}

/// Lifecycle of an executor.
///
/// `Running → ShuttingDown → Terminated`, or `ForceTerminated` once
/// [`ExecutorControl::shutdown_now`] has been called on an executor that had
/// not yet terminated. No state ever leads back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorState {
    /// Accepting and running tasks
    Running,
    /// No new tasks accepted, draining queued work
    ShuttingDown,
    /// Drained and every worker exited
    Terminated,
    /// Forced stop requested; queued work discarded
    ForceTerminated,
}

impl ExecutorState {
    /// Whether the executor accepts new tasks.
    #[must_use]
    pub const fn accepts_tasks(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::ShuttingDown => write!(f, "ShuttingDown"),
            Self::Terminated => write!(f, "Terminated"),
            Self::ForceTerminated => write!(f, "ForceTerminated"),
        }
    }
}

/// Configuration for executor behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Number of worker threads
    pub worker_threads: usize,
    /// Thread name prefix for worker threads
    pub thread_name_prefix: String,
    /// Maximum number of queued tasks (0 = unbounded)
    pub max_queue_size: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: 1,
            thread_name_prefix: "klotho-worker".into(),
            max_queue_size: 0,
        }
    }
}

impl ExecutorConfig {
    /// Configuration for a pool with exactly one worker.
    ///
    /// Tasks submitted to such a pool run one at a time, in submission order.
    #[must_use]
    pub fn single_thread() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = count;
        self
    }

    /// Set the thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Bound the task queue.
    #[must_use]
    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    /// Check the configuration for values an executor cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidConfiguration`] describing the first problem found.
    pub fn validate(&self) -> ExecutorResult<()> {
        if self.worker_threads == 0 {
            return Err(ExecutorError::InvalidConfiguration(
                "worker_threads must be at least 1".into(),
            ));
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err(ExecutorError::InvalidConfiguration(
                "thread_name_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}
