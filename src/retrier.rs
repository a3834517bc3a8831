//! Retry driver
//!
//! Runs an operation until it reports done, waiting between attempts as dictated by a
//! [`WaitPolicy`].
//!
//! Semantics:
//! - For attempt index `i` (starting at `0`) the driver asks the policy for a delay, waits, then
//!   invokes the operation with the same `i`.
//! - A policy error ends the run immediately; the operation is not invoked for that index.
//! - The operation's error (or its absence) is recorded in the [`ErrorLog`] on every attempt.
//! - `Outcome::done()` ends the run with `Ok(())`; `Outcome::failed(e)` ends it with
//!   `RetryError::Inner(e)`. Errors without `done` are recorded and retried.
//! - The driver itself has no attempt limit. Without a bounding combinator such as
//!   [`crate::combinator::MaxAttempts`] a run that never reports done never ends, short of the
//!   attempt index overflowing `u32` (`RetryError::IndexOverflow`).
//!
//! Invariants:
//! - Attempts are strictly sequential; policy before operation within an attempt.
//! - The error log is cleared when `run` starts and describes that run only.
//! - Cancellation interrupts the wait only; an operation already started is awaited to the end.
//!
//! Example
//! ```rust
//! use retrier::{Backoff, InstantSleeper, Outcome, Retrier, WaitPolicyExt};
//!
//! #[derive(Debug, Clone)]
//! struct Flaky;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut retrier = Retrier::builder(
//!     Backoff::linear_millis().max_attempts(5),
//!     |attempt| async move {
//!         if attempt < 2 { Outcome::retry(Flaky) } else { Outcome::done() }
//!     },
//! )
//! .with_sleeper(InstantSleeper)
//! .build()
//! .unwrap();
//!
//! assert!(retrier.run().await.is_ok());
//! assert_eq!(retrier.errors().recorded(), 3);
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::io;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::watch;

use crate::backoff::WaitPolicy;
use crate::error::RetryError;
use crate::error_log::{ErrorLog, DEFAULT_ERROR_LOG_CAPACITY};
use crate::sleeper::{Sleeper, TokioSleeper};

/// What an operation reports for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<E> {
    done: bool,
    error: Option<E>,
}

impl<E> Outcome<E> {
    pub fn new(done: bool, error: Option<E>) -> Self {
        Self { done, error }
    }

    /// Finished successfully.
    pub fn done() -> Self {
        Self::new(true, None)
    }

    /// Finished, but with an error that becomes the result of the run.
    pub fn failed(error: E) -> Self {
        Self::new(true, Some(error))
    }

    /// Not finished; record `error` and try again.
    pub fn retry(error: E) -> Self {
        Self::new(false, Some(error))
    }

    /// Not finished and nothing went wrong (e.g. polling for readiness).
    pub fn pending() -> Self {
        Self::new(false, None)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    pub fn into_parts(self) -> (bool, Option<E>) {
        (self.done, self.error)
    }
}

/// `Ok` finishes the run; `Err` is recorded and retried.
impl<T, E> From<Result<T, E>> for Outcome<E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::done(),
            Err(e) => Self::retry(e),
        }
    }
}

/// Interrupts the wait of a running (or future) retrier run.
///
/// Cancellation is sticky: once cancelled, every later run of the same retrier is cancelled
/// before its first attempt.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Errors produced while building a retrier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The error log must keep at least one entry.
    #[error("error log capacity must be > 0 (got {0})")]
    InvalidErrorLogCapacity(usize),
}

/// Drives one operation through one wait policy.
pub struct Retrier<P, Op, E> {
    policy: P,
    operation: Op,
    errors: ErrorLog<E>,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancelHandle,
}

impl<P: fmt::Debug, Op, E> fmt::Debug for Retrier<P, Op, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .field("operation", &"<operation>")
            .field("errors", &self.errors.len())
            .field("sleeper", &self.sleeper)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl<P, Op, Fut, E> Retrier<P, Op, E>
where
    P: WaitPolicy,
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Outcome<E>>,
    E: Clone,
{
    /// Retrier with the tokio sleeper and a default-sized error log.
    pub fn new(policy: P, operation: Op) -> Self {
        Self {
            policy,
            operation,
            errors: ErrorLog::default(),
            sleeper: Arc::new(TokioSleeper),
            cancel: CancelHandle::new(),
        }
    }

    pub fn builder(policy: P, operation: Op) -> RetrierBuilder<P, Op, E> {
        RetrierBuilder::new(policy, operation)
    }

    /// Run attempts until the operation reports done or the wait policy fails.
    pub async fn run(&mut self) -> Result<(), RetryError<E>> {
        self.errors.clear();
        let mut cancelled = self.cancel.subscribe();
        let mut attempt: u32 = 0;

        loop {
            let delay = match self.policy.wait(attempt) {
                Ok(delay) => delay,
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "wait policy ended retry loop");
                    return Err(RetryError::Wait(err));
                }
            };
            tracing::debug!(attempt, ?delay, "retry attempt scheduled");

            tokio::select! {
                biased;
                _ = cancelled.wait_for(|cancelled| *cancelled) => {
                    tracing::warn!(attempt, "retry cancelled");
                    return Err(RetryError::Cancelled { attempt });
                }
                _ = self.sleeper.sleep(delay) => {}
            }

            let (done, error) = (self.operation)(attempt).await.into_parts();
            self.errors.record(error.clone());

            match (done, error) {
                (true, None) => {
                    if attempt > 0 {
                        tracing::info!(attempts = attempt + 1, "operation succeeded after retries");
                    }
                    return Ok(());
                }
                (true, Some(err)) => {
                    tracing::debug!(attempt, "operation finished with an error");
                    return Err(RetryError::Inner(err));
                }
                (false, Some(_)) => tracing::debug!(attempt, "operation failed; retrying"),
                (false, None) => {}
            }

            attempt = match attempt.checked_add(1) {
                Some(next) => next,
                None => {
                    tracing::warn!(attempt, "attempt index overflowed");
                    return Err(RetryError::IndexOverflow);
                }
            };
        }
    }

    /// Blocking form of [`Retrier::run`], driven on a private current-thread runtime.
    ///
    /// Inside a tokio runtime this returns `RetryError::Runtime` without running any attempt; use
    /// `run().await` there.
    pub fn run_blocking(&mut self) -> Result<(), RetryError<E>> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(RetryError::Runtime(Arc::new(io::Error::new(
                io::ErrorKind::Other,
                "run_blocking called from within a tokio runtime; use run().await instead",
            ))));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| RetryError::Runtime(Arc::new(e)))?;
        runtime.block_on(self.run())
    }
}

impl<P, Op, E> Retrier<P, Op, E> {
    /// Per-attempt errors of the most recent run.
    pub fn errors(&self) -> &ErrorLog<E> {
        &self.errors
    }

    /// Take the recorded entries, leaving the log empty.
    pub fn take_errors(&mut self) -> Vec<Option<E>> {
        self.errors.drain()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

/// Builder for `Retrier`.
pub struct RetrierBuilder<P, Op, E> {
    policy: P,
    operation: Op,
    sleeper: Arc<dyn Sleeper>,
    error_log_capacity: usize,
    _error: PhantomData<fn() -> E>,
}

impl<P, Op, Fut, E> RetrierBuilder<P, Op, E>
where
    P: WaitPolicy,
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Outcome<E>>,
    E: Clone,
{
    pub fn new(policy: P, operation: Op) -> Self {
        Self {
            policy,
            operation,
            sleeper: Arc::new(TokioSleeper),
            error_log_capacity: DEFAULT_ERROR_LOG_CAPACITY,
            _error: PhantomData,
        }
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Number of attempts kept in the error log. Must be > 0.
    pub fn error_log_capacity(mut self, capacity: usize) -> Self {
        self.error_log_capacity = capacity;
        self
    }

    /// Build the retrier, validating inputs.
    pub fn build(self) -> Result<Retrier<P, Op, E>, BuildError> {
        if self.error_log_capacity == 0 {
            return Err(BuildError::InvalidErrorLogCapacity(0));
        }
        Ok(Retrier {
            policy: self.policy,
            operation: self.operation,
            errors: ErrorLog::with_capacity(self.error_log_capacity),
            sleeper: self.sleeper,
            cancel: CancelHandle::new(),
        })
    }
}
