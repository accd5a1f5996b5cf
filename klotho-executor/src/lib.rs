//! Thread pool executor for the Klotho concurrency demo.
//!
//! [`ThreadPoolExecutor`] owns a fixed set of named worker threads fed from a
//! single FIFO queue. With the default configuration it has exactly one
//! worker, so tasks run one at a time in submission order.
//!
//! ```rust
//! use klotho_core::ExecutorControl;
//! use klotho_executor::ThreadPoolExecutor;
//! use std::time::Duration;
//!
//! let executor = ThreadPoolExecutor::single_thread()?;
//! let handle = executor.submit(|| 6 * 7)?;
//! assert_eq!(handle.join(), Ok(42));
//!
//! executor.shutdown();
//! assert!(executor.await_termination(Duration::from_secs(5)));
//! # Ok::<(), klotho_core::ExecutorError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use klotho_core::{
    cancel::wait_while,
    executor::{ExecutorConfig, ExecutorControl, ExecutorState, TaskSpawner},
    handle::pending,
    CancellationToken, ExecutorError, ExecutorResult, Interrupted, Task, TaskBuilder,
    TaskError, TaskHandle, TaskId, TaskResult,
};

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// A queued unit of work, already bound to its completer.
struct Job {
    id: TaskId,
    name: &'static str,
    token: CancellationToken,
    run: Box<dyn FnOnce() + Send + 'static>,
}

struct State {
    queue: VecDeque<Job>,
    lifecycle: ExecutorState,
    running: HashMap<TaskId, CancellationToken>,
    live_workers: usize,
}

impl State {
    fn is_terminated(&self) -> bool {
        self.live_workers == 0 && !self.lifecycle.accepts_tasks()
    }
}

struct Shared {
    state: Mutex<State>,
    work_available: Condvar,
    terminated: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A thread pool with graceful and forced shutdown.
pub struct ThreadPoolExecutor {
    config: ExecutorConfig,
    shared: Arc<Shared>,
    next_id: AtomicU64,
}

impl ThreadPoolExecutor {
    /// Create a new executor and start its worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidConfiguration`] for an unusable
    /// configuration and [`ExecutorError::ThreadSpawn`] if a worker thread
    /// could not be started.
    pub fn new(config: ExecutorConfig) -> ExecutorResult<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                lifecycle: ExecutorState::Running,
                running: HashMap::new(),
                live_workers: 0,
            }),
            work_available: Condvar::new(),
            terminated: Condvar::new(),
        });

        let executor = Self {
            config,
            shared,
            next_id: AtomicU64::new(1),
        };

        for index in 0..executor.config.worker_threads {
            let name = format!("{}-{}", executor.config.thread_name_prefix, index);
            let shared = executor.shared.clone();
            executor.shared.lock().live_workers += 1;

            // Workers are detached; termination is tracked through `live_workers`.
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&shared));

            if let Err(err) = spawned {
                executor.shared.lock().live_workers -= 1;
                executor.shutdown_now();
                return Err(ExecutorError::ThreadSpawn(err));
            }
            debug!(worker = %name, "worker thread started");
        }

        info!(
            workers = executor.config.worker_threads,
            prefix = %executor.config.thread_name_prefix,
            "executor started"
        );
        Ok(executor)
    }

    /// Create an executor with exactly one worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::ThreadSpawn`] if the worker could not be started.
    pub fn single_thread() -> ExecutorResult<Self> {
        Self::new(ExecutorConfig::single_thread())
    }

    /// The configuration this executor was built with.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Submit a fire-and-forget closure.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Rejected`] after shutdown, or
    /// [`ExecutorError::QueueFull`] when the bounded queue is full.
    pub fn execute<F>(&self, func: F) -> ExecutorResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(TaskBuilder::new().name("execute").build(func))
            .map(drop)
    }

    /// Submit a closure and get a handle to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Rejected`] after shutdown, or
    /// [`ExecutorError::QueueFull`] when the bounded queue is full.
    pub fn submit<F, R>(&self, func: F) -> ExecutorResult<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.spawn(TaskBuilder::new().name("submit").build(func))
    }

    /// Submit a closure that observes its cancellation token.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Rejected`] after shutdown, or
    /// [`ExecutorError::QueueFull`] when the bounded queue is full.
    pub fn submit_cancellable<F, R>(&self, func: F) -> ExecutorResult<TaskHandle<R>>
    where
        F: FnOnce(&CancellationToken) -> TaskResult<R> + Send + 'static,
        R: Send + 'static,
    {
        self.spawn(TaskBuilder::new().name("submit").build_cancellable(func))
    }

    /// Number of tasks waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Number of tasks currently running.
    #[must_use]
    pub fn active(&self) -> usize {
        self.shared.lock().running.len()
    }

    fn next_task_id(&self) -> TaskId {
        TaskId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn await_inner(
        &self,
        timeout: Duration,
        interrupt: Option<&CancellationToken>,
    ) -> Result<bool, Interrupted> {
        let deadline = Instant::now().checked_add(timeout);
        let guard = self.shared.lock();
        let (_guard, terminated) = wait_while(
            &self.shared.terminated,
            guard,
            deadline,
            interrupt,
            State::is_terminated,
        )?;
        Ok(terminated)
    }
}

impl TaskSpawner for ThreadPoolExecutor {
    fn spawn<T>(&self, task: T) -> ExecutorResult<TaskHandle<T::Output>>
    where
        T: Task,
    {
        let id = self.next_task_id();
        let name = task.context().display_name();
        let (handle, completer) = pending(id);
        let token = completer.token().clone();

        let run = Box::new(move || {
            if !completer.start() {
                debug!(task = %id, "skipping task cancelled while queued");
                return;
            }
            let outcome = {
                let token = completer.token();
                panic::catch_unwind(AssertUnwindSafe(move || task.execute(token)))
                    .unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(&*payload))))
            };
            if let Err(err) = &outcome {
                warn!(task = %id, error = %err, "task failed");
            }
            if !completer.complete(outcome) {
                debug!(task = %id, "task finished after its handle was cancelled");
            }
        });

        let mut state = self.shared.lock();
        if !state.lifecycle.accepts_tasks() {
            debug!(task = %id, state = %state.lifecycle, "rejecting task");
            return Err(ExecutorError::Rejected);
        }
        if self.config.max_queue_size > 0 && state.queue.len() >= self.config.max_queue_size {
            return Err(ExecutorError::QueueFull(self.config.max_queue_size));
        }
        state.queue.push_back(Job { id, name, token, run });
        drop(state);

        self.shared.work_available.notify_one();
        debug!(task = %id, name, "task submitted");
        Ok(handle)
    }
}

impl ExecutorControl for ThreadPoolExecutor {
    fn shutdown(&self) {
        let mut state = self.shared.lock();
        if state.lifecycle != ExecutorState::Running {
            return;
        }
        state.lifecycle = if state.live_workers == 0 {
            ExecutorState::Terminated
        } else {
            ExecutorState::ShuttingDown
        };
        let queued = state.queue.len();
        drop(state);

        info!(queued, "executor shutdown requested");
        self.shared.work_available.notify_all();
        self.shared.terminated.notify_all();
    }

    fn shutdown_now(&self) -> usize {
        let mut state = self.shared.lock();
        if state.lifecycle == ExecutorState::Terminated {
            return 0;
        }
        state.lifecycle = ExecutorState::ForceTerminated;
        let drained: Vec<Job> = state.queue.drain(..).collect();
        let running: Vec<(TaskId, CancellationToken)> = state
            .running
            .iter()
            .map(|(id, token)| (*id, token.clone()))
            .collect();
        drop(state);

        for (id, token) in &running {
            debug!(task = %id, "interrupting running task");
            token.cancel();
        }
        let cancelled = drained.len();
        for job in drained {
            debug!(task = %job.id, name = job.name, "discarding queued task");
            job.token.cancel();
            // Dropping the closure drops its completer, resolving the handle as cancelled.
            drop(job.run);
        }

        warn!(cancelled, interrupted = running.len(), "executor forced to stop");
        self.shared.work_available.notify_all();
        self.shared.terminated.notify_all();
        cancelled
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        // Without an interrupt token the wait cannot be interrupted.
        self.await_inner(timeout, None).unwrap_or(false)
    }

    fn await_termination_interruptible(
        &self,
        timeout: Duration,
        interrupt: &CancellationToken,
    ) -> ExecutorResult<bool> {
        Ok(self.await_inner(timeout, Some(interrupt))?)
    }

    fn is_shutdown(&self) -> bool {
        !self.shared.lock().lifecycle.accepts_tasks()
    }

    fn is_terminated(&self) -> bool {
        self.shared.lock().is_terminated()
    }

    fn state(&self) -> ExecutorState {
        self.shared.lock().lifecycle
    }

    fn worker_count(&self) -> usize {
        self.config.worker_threads
    }

    fn load(&self) -> usize {
        let state = self.shared.lock();
        state.queue.len() + state.running.len()
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        if !self.is_terminated() {
            self.shutdown_now();
        }
    }
}

fn worker_loop(shared: &Shared) {
    let worker = thread::current().name().unwrap_or("klotho-worker").to_owned();

    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if let Some(job) = state.queue.pop_front() {
                    state.running.insert(job.id, job.token.clone());
                    break Some(job);
                }
                if !state.lifecycle.accepts_tasks() {
                    break None;
                }
                state = shared
                    .work_available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let Some(job) = job else { break };
        let id = job.id;
        debug!(worker = %worker, task = %id, name = job.name, "running task");
        (job.run)();
        shared.lock().running.remove(&id);
    }

    let mut state = shared.lock();
    state.live_workers -= 1;
    if state.live_workers == 0 && state.lifecycle == ExecutorState::ShuttingDown {
        state.lifecycle = ExecutorState::Terminated;
    }
    let remaining = state.live_workers;
    drop(state);

    debug!(worker = %worker, remaining, "worker thread exiting");
    shared.terminated.notify_all();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
