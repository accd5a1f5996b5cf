//! # Klotho
//!
//! A walk through collection pipelines, single-method capability traits and
//! a cancellable single-worker thread pool, run as one demonstration flow.
//!
//! ## Crates
//!
//! - [`klotho_core`]: task ids, the [`Task`] trait, [`TaskHandle`],
//!   [`CancellationToken`] and the error types
//! - [`klotho_executor`]: [`ThreadPoolExecutor`]
//! - [`klotho_iter`]: the [`Stream`] pipeline wrapper
//!
//! ## Running the demos
//!
//! ```rust,no_run
//! use klotho::{run_all, Console, DemoConfig};
//!
//! let report = run_all(&Console::stdio(), &DemoConfig::default())?;
//! assert_eq!(report.concurrency.value, 123);
//! # Ok::<(), klotho::DemoError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod concurrency;
pub mod config;
pub mod console;
pub mod error;
pub mod functional;
pub mod streams;

pub use klotho_core::{
    error::*, CancellationToken, Executor, ExecutorConfig, ExecutorControl, ExecutorState, Task,
    TaskBuilder, TaskContext, TaskHandle, TaskId, TaskSpawner,
};
pub use klotho_executor::ThreadPoolExecutor;
pub use klotho_iter::{stream, Stream};

pub use concurrency::{
    shutdown_gracefully, BackgroundOutcome, BackgroundThread, ConcurrencyDemo, ConcurrencyReport,
    ShutdownOutcome, ShutdownReport,
};
pub use config::{DemoConfig, DemoConfigBuilder};
pub use console::{Capture, Console};
pub use error::{DemoError, DemoResult};
pub use functional::{Person, PersonFactory, Transformer};
pub use streams::StreamsReport;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Everything the full demonstration flow produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// Pipeline demos
    pub streams: StreamsReport,
    /// The person built by the factory
    pub person: Person,
    /// The transformer's output
    pub transformed: String,
    /// The functional pipeline's sum
    pub functional_sum: Option<i32>,
    /// The concurrency demo
    pub concurrency: ConcurrencyReport,
}

/// Run every demo in order: pipelines, capability traits, the functional
/// pipeline, then concurrency.
///
/// # Errors
///
/// Fails only when the concurrency demo does; see [`ConcurrencyDemo::run`].
pub fn run_all(console: &Console, config: &DemoConfig) -> DemoResult<DemoReport> {
    config.validate()?;

    let streams = streams::run_streams(console);
    let (person, transformed) = functional::run_functional_interfaces(console);
    let functional_sum = streams::run_functional_streams(console);

    info!("starting concurrency demo");
    let concurrency = ConcurrencyDemo::new(console.clone(), config.clone()).run()?;

    Ok(DemoReport {
        streams,
        person,
        transformed,
        functional_sum,
        concurrency,
    })
}

/// Install a global `tracing` subscriber filtered by `filter` and writing
/// to stderr.
///
/// # Errors
///
/// Fails if `filter` is not a valid directive or a global subscriber is
/// already installed.
pub fn init_tracing(filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

/// Common imports.
pub mod prelude {
    pub use crate::{
        run_all, CancellationToken, Console, DemoConfig, ExecutorConfig, ExecutorControl, Person,
        PersonFactory, Stream, TaskError, TaskHandle, ThreadPoolExecutor, Transformer,
    };
}
