//! Pending results.
//!
//! A [`TaskHandle`] is the consumer side of a task's result: it can be polled
//! for completion, blocked on, or cancelled. The executor keeps the matching
//! [`Completer`] and fills the slot exactly once.

use crate::cancel::wait_while;
use crate::{CancellationToken, TaskError, TaskId, TaskResult};
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

enum Slot<T> {
    Pending,
    Running,
    Done(TaskResult<T>),
    Taken,
}

impl<T> Slot<T> {
    fn is_done(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Taken)
    }
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    completed: Condvar,
    token: CancellationToken,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A handle to a task that may be running on another thread.
#[allow(clippy::module_name_repetitions)]
pub struct TaskHandle<T> {
    id: TaskId,
    shared: Arc<Shared<T>>,
}

/// The producer side of a [`TaskHandle`].
///
/// Dropping a completer that never completed resolves the handle as
/// [`TaskError::Cancelled`], so a handle can never wait forever on a task that
/// was discarded.
pub struct Completer<T> {
    id: TaskId,
    shared: Arc<Shared<T>>,
}

/// Create a connected handle/completer pair for the task `id`.
#[must_use]
pub fn pending<T>(id: TaskId) -> (TaskHandle<T>, Completer<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Pending),
        completed: Condvar::new(),
        token: CancellationToken::new(),
    });
    (
        TaskHandle {
            id,
            shared: shared.clone(),
        },
        Completer { id, shared },
    )
}

impl<T> TaskHandle<T> {
    /// Returns the task ID.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Whether the task has completed, failed or been cancelled. Never blocks.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.shared.lock().is_done()
    }

    /// Whether the task was cancelled before producing a value.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(*self.shared.lock(), Slot::Done(Err(TaskError::Cancelled)))
    }

    /// Attempt to cancel the task.
    ///
    /// A queued task will never run. A running task is resolved as cancelled
    /// right away; with `may_interrupt` its cancellation token is also fired
    /// so it can stop early. Returns `false` if the task had already finished.
    pub fn cancel(&self, may_interrupt: bool) -> bool {
        let mut slot = self.shared.lock();
        let was_running = match *slot {
            Slot::Pending => false,
            Slot::Running => true,
            Slot::Done(_) | Slot::Taken => return false,
        };
        *slot = Slot::Done(Err(TaskError::Cancelled));
        drop(slot);
        self.shared.completed.notify_all();

        if !was_running || may_interrupt {
            self.shared.token.cancel();
        }
        tracing::debug!(task = %self.id, was_running, "task cancelled through its handle");
        true
    }

    /// Wait for the task to complete and return its result.
    ///
    /// # Errors
    ///
    /// Returns the task's own failure: [`TaskError::Cancelled`],
    /// [`TaskError::Panicked`] or [`TaskError::Fatal`].
    pub fn join(self) -> TaskResult<T> {
        let slot = self.wait(None, None)?;
        Self::take(slot)
    }

    /// Wait up to `timeout` for the task and return its result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Timeout`] if the task is still running after
    /// `timeout`, otherwise the task's own failure.
    pub fn join_timeout(self, timeout: Duration) -> TaskResult<T> {
        let slot = self.wait(Instant::now().checked_add(timeout), None)?;
        Self::take(slot)
    }

    fn take(mut slot: MutexGuard<'_, Slot<T>>) -> TaskResult<T> {
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Done(result) => result,
            // `wait` only hands back finished slots and a handle is joined at most once.
            Slot::Pending | Slot::Running | Slot::Taken => Err(TaskError::Cancelled),
        }
    }

    fn wait(
        &self,
        deadline: Option<Instant>,
        interrupt: Option<&CancellationToken>,
    ) -> TaskResult<MutexGuard<'_, Slot<T>>> {
        let guard = self.shared.lock();
        let (guard, done) = wait_while(&self.shared.completed, guard, deadline, interrupt, Slot::is_done)
            .map_err(|_| TaskError::WaitInterrupted)?;
        if done {
            Ok(guard)
        } else {
            Err(TaskError::Timeout)
        }
    }
}

impl<T: Clone> TaskHandle<T> {
    /// Block until the task finishes and return a copy of its result.
    ///
    /// Unlike [`join`](Self::join) the handle stays usable afterwards, so
    /// completion can still be queried.
    ///
    /// # Errors
    ///
    /// Returns the task's own failure.
    pub fn get(&self) -> TaskResult<T> {
        let slot = self.wait(None, None)?;
        Self::peek(&slot)
    }

    /// Like [`get`](Self::get), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Timeout`] when the deadline passes first.
    pub fn get_timeout(&self, timeout: Duration) -> TaskResult<T> {
        let slot = self.wait(Instant::now().checked_add(timeout), None)?;
        Self::peek(&slot)
    }

    /// Like [`get`](Self::get), but stops waiting when `interrupt` fires.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::WaitInterrupted`] if the caller was interrupted
    /// before the task finished, otherwise the task's own failure.
    pub fn get_interruptible(&self, interrupt: &CancellationToken) -> TaskResult<T> {
        let slot = self.wait(None, Some(interrupt))?;
        Self::peek(&slot)
    }

    fn peek(slot: &Slot<T>) -> TaskResult<T> {
        match slot {
            Slot::Done(result) => result.clone(),
            Slot::Pending | Slot::Running | Slot::Taken => Err(TaskError::Cancelled),
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("done", &self.is_done())
            .finish()
    }
}

impl<T> Completer<T> {
    /// The task this completer resolves.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The token the running task should observe.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.shared.token
    }

    /// Mark the task as running.
    ///
    /// Returns `false` if the handle was cancelled while queued, in which case
    /// the task must not be run.
    pub fn start(&self) -> bool {
        let mut slot = self.shared.lock();
        match *slot {
            Slot::Pending => {
                *slot = Slot::Running;
                true
            }
            Slot::Running | Slot::Done(_) | Slot::Taken => false,
        }
    }

    /// Resolve the handle with `result`.
    ///
    /// Returns `false` if the handle was already resolved (for example by a
    /// cancellation that raced with completion); the result is dropped.
    pub fn complete(self, result: TaskResult<T>) -> bool {
        self.resolve(result)
    }

    /// Resolve the handle as cancelled and fire its token.
    pub fn cancel(self) -> bool {
        self.shared.token.cancel();
        self.resolve(Err(TaskError::Cancelled))
    }

    fn resolve(&self, result: TaskResult<T>) -> bool {
        let mut slot = self.shared.lock();
        if slot.is_done() {
            return false;
        }
        *slot = Slot::Done(result);
        drop(slot);
        self.shared.completed.notify_all();
        true
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if self.resolve(Err(TaskError::Cancelled)) {
            tracing::debug!(task = %self.id, "task discarded before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_handle_completes_once() {
        let (handle, completer) = pending::<i32>(TaskId::new(1));
        assert!(!handle.is_done());
        assert!(completer.start());
        assert!(completer.complete(Ok(5)));
        assert!(handle.is_done());
        assert!(!handle.cancel(true));
        assert_eq!(handle.get(), Ok(5));
        assert_eq!(handle.get(), Ok(5));
        assert_eq!(handle.join(), Ok(5));
    }

    #[test]
    fn test_get_blocks_until_completion() {
        let (handle, completer) = pending::<&'static str>(TaskId::new(2));
        let worker = thread::spawn(move || {
            completer.start();
            thread::sleep(Duration::from_millis(20));
            completer.complete(Ok("value"));
        });

        assert!(!handle.is_done());
        assert_eq!(handle.get(), Ok("value"));
        assert!(handle.is_done());
        worker.join().unwrap();
    }

    #[test]
    fn test_cancel_queued_task_prevents_start() {
        let (handle, completer) = pending::<()>(TaskId::new(3));
        assert!(handle.cancel(false));
        assert!(handle.is_cancelled());
        assert!(completer.token().is_cancelled());
        assert!(!completer.start());
        assert!(!completer.complete(Ok(())));
        assert_eq!(handle.join(), Err(TaskError::Cancelled));
    }

    #[test]
    fn test_cancel_running_task_with_interrupt() {
        let (handle, completer) = pending::<u8>(TaskId::new(4));
        assert!(completer.start());
        assert!(handle.cancel(true));
        assert!(completer.token().is_cancelled());
        assert!(!completer.complete(Ok(1)));
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_cancel_running_task_without_interrupt_leaves_token() {
        let (handle, completer) = pending::<u8>(TaskId::new(5));
        assert!(completer.start());
        assert!(handle.cancel(false));
        assert!(!completer.token().is_cancelled());
    }

    #[test]
    fn test_dropped_completer_resolves_cancelled() {
        let (handle, completer) = pending::<u8>(TaskId::new(6));
        drop(completer);
        assert_eq!(handle.join(), Err(TaskError::Cancelled));
    }

    #[test]
    fn test_get_timeout_and_interrupt() {
        let (handle, _completer) = pending::<u8>(TaskId::new(7));
        assert_eq!(
            handle.get_timeout(Duration::from_millis(10)),
            Err(TaskError::Timeout)
        );

        let interrupt = CancellationToken::new();
        interrupt.cancel();
        assert_eq!(
            handle.get_interruptible(&interrupt),
            Err(TaskError::WaitInterrupted)
        );
        assert!(!handle.is_done());
    }

    #[test]
    fn test_join_timeout_returns_failure() {
        let (handle, completer) = pending::<u8>(TaskId::new(8));
        completer.complete(Err(TaskError::interrupted("task interrupted")));
        assert_eq!(
            handle.join_timeout(Duration::from_secs(1)),
            Err(TaskError::interrupted("task interrupted"))
        );
    }

    #[test]
    fn test_unbounded_timeouts_on_finished_task() {
        let (handle, completer) = pending::<u8>(TaskId::new(10));
        assert!(completer.complete(Ok(4)));
        assert_eq!(handle.get_timeout(Duration::MAX), Ok(4));
        assert_eq!(handle.join_timeout(Duration::MAX), Ok(4));

        let (handle, completer) = pending::<u8>(TaskId::new(11));
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.complete(Ok(5))
        });
        assert_eq!(handle.get_timeout(Duration::MAX), Ok(5));
        assert!(worker.join().unwrap());
    }

    #[test]
    fn test_get_interruptible_returns_task_failure() {
        let (handle, completer) = pending::<u8>(TaskId::new(12));
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.complete(Err(TaskError::interrupted("task interrupted")))
        });

        let interrupt = CancellationToken::new();
        assert_eq!(
            handle.get_interruptible(&interrupt),
            Err(TaskError::interrupted("task interrupted"))
        );
        assert!(handle.is_done());
        assert!(worker.join().unwrap());
    }

    #[test]
    fn test_completer_cancel_resolves_and_fires_token() {
        let (handle, completer) = pending::<u8>(TaskId::new(13));
        assert_eq!(completer.id(), TaskId::new(13));
        assert_eq!(completer.id(), handle.id());
        let token = completer.token().clone();

        assert!(completer.cancel());
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
        assert_eq!(handle.join(), Err(TaskError::Cancelled));
    }

    proptest::proptest! {
        #[test]
        fn prop_only_first_resolution_wins(value in proptest::num::u32::ANY, cancel_first in proptest::bool::ANY) {
            let (handle, completer) = pending::<u32>(TaskId::new(9));
            if cancel_first {
                proptest::prop_assert!(handle.cancel(false));
                proptest::prop_assert!(!completer.complete(Ok(value)));
                proptest::prop_assert_eq!(handle.get(), Err(TaskError::Cancelled));
            } else {
                proptest::prop_assert!(completer.complete(Ok(value)));
                proptest::prop_assert!(!handle.cancel(true));
                proptest::prop_assert_eq!(handle.get(), Ok(value));
            }
            proptest::prop_assert!(handle.is_done());
        }
    }
}
