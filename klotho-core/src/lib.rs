//! # Klotho Core
//!
//! Core abstractions shared by the Klotho crates.
//!
//! Named after the Fate who spins the thread of life, Klotho is a compact
//! demonstration of thread based concurrency: tasks, pending results that can
//! be waited on or cancelled, and cooperative cancellation tokens standing in
//! for thread interruption.
//!
//! ## Design Principles
//!
//! - **Explicit cancellation**: blocking points take a [`CancellationToken`]
//! - **Complete once**: every [`TaskHandle`] is resolved exactly one time
//! - **Typed failures**: interruption and fatal task failure are distinct errors

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fmt;

pub mod cancel;
pub mod error;
pub mod executor;
pub mod handle;
pub mod task;

pub use cancel::CancellationToken;
pub use executor::{Executor, ExecutorConfig, ExecutorControl, ExecutorState, TaskSpawner};
pub use error::{ExecutorError, ExecutorResult, Interrupted, TaskError, TaskResult};
pub use handle::{pending, Completer, TaskHandle};
pub use task::{Cancellable, Closure, Task, TaskBuilder};

/// A unique identifier for tasks within an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Create a new task ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

/// Task metadata used for logging and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContext {
    /// Unique identifier for this task
    pub id: TaskId,
    /// Optional name for debugging
    pub name: Option<&'static str>,
}

impl TaskContext {
    /// Create a new task context.
    #[must_use]
    pub const fn new(id: TaskId) -> Self {
        Self { id, name: None }
    }

    /// Set the name for this task.
    #[must_use]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// The task name, or `"anonymous"` when none was given.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        self.name.unwrap_or("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id() {
        let id = TaskId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(format!("{}", id), "Task(42)");
    }

    #[test]
    fn test_task_context() {
        let id = TaskId::new(1);
        let ctx = TaskContext::new(id).with_name("test_task");

        assert_eq!(ctx.id, id);
        assert_eq!(ctx.name, Some("test_task"));
        assert_eq!(ctx.display_name(), "test_task");
        assert_eq!(TaskContext::new(id).display_name(), "anonymous");
    }
}
