//! The concurrency demo: a raw background thread, a single-worker pool, a
//! value retrieved through a task handle, and the graceful-then-forced
//! shutdown protocol.
//!
//! Thread interruption is modelled with [`CancellationToken`]s. The
//! background thread and every pool task own one, and the caller of
//! [`ConcurrencyDemo::run`] can supply its own to interrupt the blocking
//! waits on the calling thread.

use crate::config::DemoConfig;
use crate::console::Console;
use crate::error::{DemoError, DemoResult};
use klotho_core::{CancellationToken, ExecutorControl, ExecutorState, TaskError};
use klotho_executor::ThreadPoolExecutor;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

fn current_thread_name() -> String {
    thread::current().name().unwrap_or("unnamed").to_owned()
}

/// How the background thread ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// Printed both lines
    Completed,
    /// Its sleep was interrupted
    Interrupted,
    /// The thread panicked
    Panicked,
}

/// A named, fire-and-forget thread that prints, sleeps and prints again.
#[derive(Debug)]
pub struct BackgroundThread {
    name: String,
    token: CancellationToken,
    handle: JoinHandle<BackgroundOutcome>,
}

impl BackgroundThread {
    /// Start the thread.
    ///
    /// It prints `Vanilla Foo <name>`, sleeps for `sleep`, then prints
    /// `Vanilla Bar <name>`. An interrupted sleep is reported on the error
    /// stream and ends the thread quietly.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::Spawn`] if the OS refuses to create the thread.
    pub fn spawn(console: &Console, name: &str, sleep: Duration) -> DemoResult<Self> {
        let token = CancellationToken::new();
        let thread_token = token.clone();
        let console = console.clone();

        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let name = current_thread_name();
                console.println(format_args!("Vanilla Foo {name}"));
                match thread_token.sleep(sleep) {
                    Ok(()) => {
                        console.println(format_args!("Vanilla Bar {name}"));
                        BackgroundOutcome::Completed
                    }
                    Err(err) => {
                        console.eprintln(format_args!("{name}: {err}"));
                        warn!(thread = %name, "background thread interrupted");
                        BackgroundOutcome::Interrupted
                    }
                }
            })
            .map_err(DemoError::Spawn)?;

        debug!(thread = name, "background thread started");
        Ok(Self {
            name: name.to_owned(),
            token,
            handle,
        })
    }

    /// The thread's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interrupt the thread's sleep.
    pub fn interrupt(&self) {
        self.token.cancel();
    }

    /// Whether the thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit.
    pub fn join(self) -> BackgroundOutcome {
        self.handle.join().unwrap_or(BackgroundOutcome::Panicked)
    }
}

/// How the pool ended up stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every worker exited within the graceful timeout
    Terminated,
    /// Workers were still alive and the pool was forced to stop
    ForceTerminated {
        /// Queued tasks discarded by the forced stop
        cancelled: usize,
    },
}

/// Everything [`shutdown_gracefully`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// How the pool stopped
    pub outcome: ShutdownOutcome,
    /// Whether the graceful wait was interrupted
    pub wait_interrupted: bool,
    /// Pool state once the protocol finished
    pub final_state: ExecutorState,
}

/// Stop `executor`, waiting up to `timeout` for queued and running work
/// before forcing it down.
///
/// An interrupted wait is reported on the error stream and does not stop
/// the protocol; the forced stop and the final `shutdown finished` line
/// always follow.
pub fn shutdown_gracefully<E>(
    executor: &E,
    timeout: Duration,
    interrupt: &CancellationToken,
    console: &Console,
) -> ShutdownReport
where
    E: ExecutorControl + ?Sized,
{
    console.println("attempt to shutdown executor");
    executor.shutdown();

    let wait_interrupted = match executor.await_termination_interruptible(timeout, interrupt) {
        Ok(terminated) => {
            debug!(terminated, ?timeout, "graceful shutdown wait finished");
            false
        }
        Err(err) => {
            console.eprintln("tasks interrupted");
            warn!(error = %err, "graceful shutdown wait interrupted");
            true
        }
    };

    let outcome = if executor.is_terminated() {
        ShutdownOutcome::Terminated
    } else {
        console.eprintln("cancel non-finished tasks");
        ShutdownOutcome::ForceTerminated {
            cancelled: executor.shutdown_now(),
        }
    };
    console.println("shutdown finished");

    let final_state = executor.state();
    info!(?outcome, state = %final_state, "executor shut down");
    ShutdownReport {
        outcome,
        wait_interrupted,
        final_state,
    }
}

/// Everything the concurrency demo observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrencyReport {
    /// `is_done()` before the blocking get
    pub done_before: bool,
    /// `is_done()` after the blocking get
    pub done_after: bool,
    /// The value returned by the pool task
    pub value: i32,
    /// How the pool was stopped
    pub shutdown: ShutdownReport,
    /// How the background thread ended, when it was joined
    pub background: Option<BackgroundOutcome>,
}

/// Runs the concurrency demo.
#[derive(Debug, Clone)]
pub struct ConcurrencyDemo {
    console: Console,
    config: DemoConfig,
    interrupt: CancellationToken,
}

impl ConcurrencyDemo {
    /// A demo printing to `console` with the given timings.
    #[must_use]
    pub fn new(console: Console, config: DemoConfig) -> Self {
        Self {
            console,
            config,
            interrupt: CancellationToken::new(),
        }
    }

    /// Use `token` to interrupt the calling thread's blocking waits.
    #[must_use]
    pub fn with_interrupt(mut self, token: CancellationToken) -> Self {
        self.interrupt = token;
        self
    }

    /// Run the demo.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::Spawn`] or [`DemoError::Executor`] when a thread
    /// cannot be started, and [`DemoError::Task`] when the value task fails
    /// or the wait for it is interrupted. The pool is forced down on error.
    pub fn run(&self) -> DemoResult<ConcurrencyReport> {
        let background = BackgroundThread::spawn(
            &self.console,
            &self.config.background_thread_name,
            self.config.background_sleep,
        )?;

        // The background thread is settled the same way whether or not the
        // pool part failed.
        let pool = self.run_pool();
        let background = self.settle_background(background);
        let pool = pool?;

        Ok(ConcurrencyReport {
            done_before: pool.done_before,
            done_after: pool.done_after,
            value: pool.value,
            shutdown: pool.shutdown,
            background,
        })
    }

    fn run_pool(&self) -> DemoResult<PoolRun> {
        let executor = ThreadPoolExecutor::new(self.config.executor.clone())?;

        let console = self.console.clone();
        executor.execute(move || {
            console.println(format_args!("Executor {}", current_thread_name()));
        })?;

        let (task_sleep, task_value) = (self.config.task_sleep, self.config.task_value);
        let future = executor.submit_cancellable(move |token| {
            token
                .sleep(task_sleep)
                .map_err(|_| TaskError::interrupted("task interrupted"))?;
            Ok(task_value)
        })?;

        let done_before = future.is_done();
        self.console
            .println(format_args!("future done? {done_before}"));

        let value = future.get_interruptible(&self.interrupt)?;

        let done_after = future.is_done();
        self.console.println(format_args!("future done? {done_after}"));
        self.console.println(format_args!("result: {value}"));

        let shutdown = shutdown_gracefully(
            &executor,
            self.config.shutdown_timeout,
            &self.interrupt,
            &self.console,
        );

        Ok(PoolRun {
            done_before,
            done_after,
            value,
            shutdown,
        })
    }

    fn settle_background(&self, background: BackgroundThread) -> Option<BackgroundOutcome> {
        if self.config.join_background {
            Some(background.join())
        } else {
            debug!(
                thread = background.name(),
                finished = background.is_finished(),
                "leaving background thread detached"
            );
            None
        }
    }
}

struct PoolRun {
    done_before: bool,
    done_after: bool,
    value: i32,
    shutdown: ShutdownReport,
}
