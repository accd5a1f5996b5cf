//! # Task Abstraction Layer
//!
//! A task is a zero-argument unit of work that runs at most once. Tasks either
//! run for their side effects (`Output = ()`) or produce a value. Every task
//! receives the [`CancellationToken`] its executor associated with it, so a
//! long running task can sleep interruptibly and give up when asked to.
//!
//! ## Examples
//!
//! ```rust
//! use klotho_core::{CancellationToken, Task, TaskBuilder};
//!
//! let task = TaskBuilder::new()
//!     .name("computation")
//!     .build(|| (1..=100).sum::<i32>());
//!
//! assert_eq!(task.execute(&CancellationToken::new()), Ok(5050));
//! ```
//!
//! Tasks that want to observe cancellation use [`TaskBuilder::build_cancellable`]:
//!
//! ```rust
//! use klotho_core::{CancellationToken, Task, TaskBuilder, TaskError};
//! use std::time::Duration;
//!
//! let task = TaskBuilder::new().build_cancellable(|token| {
//!     token
//!         .sleep(Duration::from_secs(1))
//!         .map_err(|_| TaskError::interrupted("task interrupted"))?;
//!     Ok(123)
//! });
//!
//! let token = CancellationToken::new();
//! token.cancel();
//! assert!(matches!(task.execute(&token), Err(TaskError::Fatal { .. })));
//! ```

use crate::{CancellationToken, TaskContext, TaskId, TaskResult};

/// The core trait for executable tasks in the Klotho runtime.
pub trait Task: Send + 'static {
    /// The output type produced by this task.
    type Output: Send + 'static;

    /// Execute this task to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskError`](crate::TaskError) when the task cannot produce its value.
    fn execute(self, token: &CancellationToken) -> TaskResult<Self::Output>;

    /// Get the task context for scheduling and debugging.
    fn context(&self) -> &TaskContext;
}

/// Builder for creating and configuring tasks.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    context: TaskContext,
}

impl TaskBuilder {
    /// Creates a new task builder with default settings.
    ///
    /// The id is a placeholder until an executor assigns one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: TaskContext::new(TaskId::new(0)),
        }
    }

    /// Sets a descriptive name for the task.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.context.name = Some(name);
        self
    }

    /// Sets the task ID.
    #[must_use]
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.context.id = id;
        self
    }

    /// Build a task from a plain closure.
    pub fn build<F, R>(self, func: F) -> Closure<F>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        Closure::new(func, self.context)
    }

    /// Build a task from a closure that observes its cancellation token.
    pub fn build_cancellable<F, R>(self, func: F) -> Cancellable<F>
    where
        F: FnOnce(&CancellationToken) -> TaskResult<R> + Send + 'static,
        R: Send + 'static,
    {
        Cancellable::new(func, self.context)
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A task that wraps a closure which cannot fail.
pub struct Closure<F> {
    closure: F,
    context: TaskContext,
}

impl<F> Closure<F> {
    /// Create a new closure task.
    pub fn new(func: F, context: TaskContext) -> Self {
        Self {
            closure: func,
            context,
        }
    }
}

impl<F, R> Task for Closure<F>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn execute(self, _token: &CancellationToken) -> TaskResult<R> {
        Ok((self.closure)())
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }
}

/// A task whose closure receives the cancellation token and may fail.
pub struct Cancellable<F> {
    closure: F,
    context: TaskContext,
}

impl<F> Cancellable<F> {
    /// Create a new cancellable task.
    pub fn new(func: F, context: TaskContext) -> Self {
        Self {
            closure: func,
            context,
        }
    }
}

impl<F, R> Task for Cancellable<F>
where
    F: FnOnce(&CancellationToken) -> TaskResult<R> + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn execute(self, token: &CancellationToken) -> TaskResult<R> {
        (self.closure)(token)
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }
}
