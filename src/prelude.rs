//! Convenient re-exports for common retrier types.
pub use crate::{
    backoff::{
        exponential_backoff, linear_backoff, linear_backoff_millis, linear_backoff_seconds,
        wait_fn, Backoff, WaitPolicy,
    },
    combinator::{Deadline, MaxAttempts, MaxInterval, MinInterval, WaitPolicyExt},
    error::{is_exhausted, Exhaustion, RetryError, WaitError},
    error_log::{ErrorLog, DEFAULT_ERROR_LOG_CAPACITY},
    retrier::{BuildError, CancelHandle, Outcome, Retrier},
    sleeper::{Sleeper, TokioSleeper},
};
