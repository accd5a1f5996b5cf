//! Cooperative cancellation.
//!
//! Rust threads cannot be interrupted from the outside, so every blocking
//! point that should be stoppable takes a [`CancellationToken`] instead. A
//! cancelled token wakes anybody sleeping on it and makes every later sleep
//! fail immediately with [`Interrupted`].

use crate::error::Interrupted;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Granularity used when a wait on some other condition must also watch a token.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct Inner {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// A cloneable, shared cancellation flag.
///
/// All clones observe the same flag. Cancelling is idempotent and cannot be
/// undone.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: Mutex::new(false),
                wakeup: Condvar::new(),
            }),
        }
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Request cancellation and wake every sleeper.
    pub fn cancel(&self) {
        let mut cancelled = self.flag();
        if !*cancelled {
            *cancelled = true;
            tracing::trace!("cancellation requested");
        }
        self.inner.wakeup.notify_all();
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Return `Err(Interrupted)` if the token has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] once the token is cancelled.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration` unless the token is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if the token is cancelled before or during the sleep.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        // A deadline past the clock's range means sleeping until cancelled.
        let deadline = Instant::now().checked_add(duration);
        let mut cancelled = self.flag();
        loop {
            if *cancelled {
                return Err(Interrupted);
            }
            let Some(deadline) = deadline else {
                cancelled = self
                    .inner
                    .wakeup
                    .wait(cancelled)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            cancelled = self
                .inner
                .wakeup
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Block until the token is cancelled or `timeout` elapses.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.sleep(timeout).is_err()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Block on `condvar` until `done` holds, the deadline passes or `interrupt` fires.
///
/// Shared by the task handle and the executor, both of which keep their state
/// behind a mutex/condvar pair that knows nothing about tokens. When an
/// interrupt token is supplied the wait is sliced into [`POLL_INTERVAL`]
/// chunks so the token is observed promptly.
///
/// Returns the guard and whether `done` held when the wait ended.
///
/// # Errors
///
/// Returns [`Interrupted`] if `interrupt` is cancelled before `done` holds.
pub fn wait_while<'a, T, F>(
    condvar: &Condvar,
    mut guard: MutexGuard<'a, T>,
    deadline: Option<Instant>,
    interrupt: Option<&CancellationToken>,
    mut done: F,
) -> Result<(MutexGuard<'a, T>, bool), Interrupted>
where
    F: FnMut(&T) -> bool,
{
    loop {
        if done(&guard) {
            return Ok((guard, true));
        }
        if let Some(token) = interrupt {
            token.check()?;
        }

        let slice = match (deadline, interrupt) {
            (Some(deadline), _) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok((guard, false));
                }
                let remaining = deadline - now;
                if interrupt.is_some() {
                    remaining.min(POLL_INTERVAL)
                } else {
                    remaining
                }
            }
            (None, Some(_)) => POLL_INTERVAL,
            (None, None) => {
                guard = condvar.wait(guard).unwrap_or_else(PoisonError::into_inner);
                continue;
            }
        };

        guard = condvar
            .wait_timeout(guard, slice)
            .unwrap_or_else(PoisonError::into_inner)
            .0;
    }
}
