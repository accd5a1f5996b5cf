//! Demo configuration.
//!
//! Nothing is read from files, flags or the environment: the defaults are
//! the demo's fixed constants, and tests shrink the timings through
//! [`DemoConfigBuilder`].

use crate::error::{DemoError, DemoResult};
use klotho_core::ExecutorConfig;
use std::time::Duration;

/// Timings and knobs for the demonstration flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// How long the background thread sleeps between its two lines
    pub background_sleep: Duration,
    /// How long the value-producing pool task sleeps before returning
    pub task_sleep: Duration,
    /// How long graceful shutdown waits before forcing termination
    pub shutdown_timeout: Duration,
    /// The value the pool task returns
    pub task_value: i32,
    /// Join the background thread before returning (deterministic tests)
    pub join_background: bool,
    /// Name given to the background thread
    pub background_thread_name: String,
    /// Worker pool configuration
    pub executor: ExecutorConfig,
    /// `tracing` filter directive used by the binary
    pub log_filter: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            background_sleep: Duration::from_secs(1),
            task_sleep: Duration::from_secs(1),
            shutdown_timeout: Duration::from_secs(5),
            task_value: 123,
            join_background: false,
            background_thread_name: "klotho-vanilla".into(),
            executor: ExecutorConfig::single_thread(),
            log_filter: "warn".into(),
        }
    }
}

impl DemoConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> DemoConfigBuilder {
        DemoConfigBuilder::new()
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::Config`] for an empty thread name or log filter
    /// and [`DemoError::Executor`] for an invalid pool configuration.
    pub fn validate(&self) -> DemoResult<()> {
        if self.background_thread_name.trim().is_empty() {
            return Err(DemoError::Config("background thread name must not be empty".into()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(DemoError::Config("log filter must not be empty".into()));
        }
        self.executor.validate()?;
        Ok(())
    }
}

/// Builder for [`DemoConfig`].
#[derive(Debug, Clone, Default)]
pub struct DemoConfigBuilder {
    config: DemoConfig,
}

impl DemoConfigBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the background thread's sleep.
    #[must_use]
    pub fn background_sleep(mut self, duration: Duration) -> Self {
        self.config.background_sleep = duration;
        self
    }

    /// Set the pool task's sleep.
    #[must_use]
    pub fn task_sleep(mut self, duration: Duration) -> Self {
        self.config.task_sleep = duration;
        self
    }

    /// Set the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Set the value returned by the pool task.
    #[must_use]
    pub fn task_value(mut self, value: i32) -> Self {
        self.config.task_value = value;
        self
    }

    /// Join the background thread before the concurrency demo returns.
    #[must_use]
    pub fn join_background(mut self, join: bool) -> Self {
        self.config.join_background = join;
        self
    }

    /// Set the background thread's name.
    #[must_use]
    pub fn background_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.background_thread_name = name.into();
        self
    }

    /// Set the worker pool configuration.
    #[must_use]
    pub fn executor(mut self, executor: ExecutorConfig) -> Self {
        self.config.executor = executor;
        self
    }

    /// Set the log filter directive.
    #[must_use]
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem reported by [`DemoConfig::validate`].
    pub fn build(self) -> DemoResult<DemoConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
