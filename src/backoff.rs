//! Backoff strategies for the retry driver.
//!
//! A wait policy maps an attempt index to the delay applied *before* that attempt runs. Attempt
//! semantics: index `0` is the first call and still waits whatever the policy returns for `0`;
//! use [`Backoff::immediate`] (or a combinator over it) when the first call must not wait.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use retrier::{Backoff, WaitPolicy};
//!
//! let backoff = Backoff::exponential();
//! assert_eq!(backoff.wait(0).unwrap(), Duration::from_secs(1));
//! assert_eq!(backoff.wait(3).unwrap(), Duration::from_secs(8));
//!
//! let linear = Backoff::linear(Duration::from_millis(250));
//! assert_eq!(linear.wait(0).unwrap(), Duration::ZERO);
//! assert_eq!(linear.wait(4).unwrap(), Duration::from_secs(1));
//! ```
//!
//! Overflow behavior: computations that would overflow saturate to `Duration::MAX`. Exponential
//! growth is unbounded otherwise; bound it with [`crate::combinator::MaxInterval`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::WaitError;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Computes the wait before an attempt, or ends the retry loop with an error.
pub trait WaitPolicy: Send + Sync + fmt::Debug {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError>;
}

impl<P: WaitPolicy + ?Sized> WaitPolicy for Box<P> {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        (**self).wait(attempt)
    }
}

impl<P: WaitPolicy + ?Sized> WaitPolicy for Arc<P> {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        (**self).wait(attempt)
    }
}

impl<P: WaitPolicy + ?Sized> WaitPolicy for &P {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        (**self).wait(attempt)
    }
}

/// Owned, type-erased wait policy.
pub type BoxWaitPolicy = Box<dyn WaitPolicy>;

fn saturating_from_nanos(nanos: u128) -> Duration {
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

fn exponential_delay(unit: Duration, attempt: u32) -> Duration {
    if unit.is_zero() {
        return Duration::ZERO;
    }
    let Some(factor) = 1u128.checked_shl(attempt) else {
        return Duration::MAX;
    };
    unit.as_nanos().checked_mul(factor).map(saturating_from_nanos).unwrap_or(Duration::MAX)
}

fn linear_delay(unit: Duration, attempt: u32) -> Duration {
    unit.checked_mul(attempt).unwrap_or(Duration::MAX)
}

/// `2^attempt` seconds. Never fails.
pub fn exponential_backoff(attempt: u32) -> Result<Duration, WaitError> {
    Ok(exponential_delay(Duration::from_secs(1), attempt))
}

/// `attempt * unit`. Never fails.
pub fn linear_backoff(attempt: u32, unit: Duration) -> Result<Duration, WaitError> {
    Ok(linear_delay(unit, attempt))
}

/// [`linear_backoff`] in whole seconds.
pub fn linear_backoff_seconds(attempt: u32) -> Result<Duration, WaitError> {
    linear_backoff(attempt, Duration::from_secs(1))
}

/// [`linear_backoff`] in milliseconds.
pub fn linear_backoff_millis(attempt: u32) -> Result<Duration, WaitError> {
    linear_backoff(attempt, Duration::from_millis(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackoffKind {
    Constant { delay: Duration },
    Linear { unit: Duration },
    Exponential { unit: Duration },
}

/// Built-in, infallible backoff strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    kind: BackoffKind,
}

impl Backoff {
    /// Zero wait for every attempt.
    pub fn immediate() -> Self {
        Self::constant(Duration::ZERO)
    }

    /// Same delay for every attempt, including attempt `0`.
    pub fn constant(delay: Duration) -> Self {
        Self { kind: BackoffKind::Constant { delay } }
    }

    /// `attempt * unit`; attempt `0` waits nothing.
    pub fn linear(unit: Duration) -> Self {
        Self { kind: BackoffKind::Linear { unit } }
    }

    pub fn linear_seconds() -> Self {
        Self::linear(Duration::from_secs(1))
    }

    pub fn linear_millis() -> Self {
        Self::linear(Duration::from_millis(1))
    }

    /// `2^attempt` seconds; attempt `0` waits one second.
    pub fn exponential() -> Self {
        Self::exponential_with_unit(Duration::from_secs(1))
    }

    /// `2^attempt * unit`.
    pub fn exponential_with_unit(unit: Duration) -> Self {
        Self { kind: BackoffKind::Exponential { unit } }
    }

    /// Delay for `attempt`. Built-in strategies never fail, so this skips the `Result`.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.kind {
            BackoffKind::Constant { delay } => delay,
            BackoffKind::Linear { unit } => linear_delay(unit, attempt),
            BackoffKind::Exponential { unit } => exponential_delay(unit, attempt),
        }
    }
}

impl WaitPolicy for Backoff {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        Ok(self.delay(attempt))
    }
}

/// Adapts a closure with the wait-policy signature into a [`WaitPolicy`].
#[derive(Clone)]
pub struct FnWait<F> {
    f: F,
}

impl<F> fmt::Debug for FnWait<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWait").field("f", &"<closure>").finish()
    }
}

impl<F> WaitPolicy for FnWait<F>
where
    F: Fn(u32) -> Result<Duration, WaitError> + Send + Sync,
{
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        (self.f)(attempt)
    }
}

/// Wrap a function or closure as a wait policy.
///
/// ```rust
/// use retrier::backoff::{linear_backoff_millis, wait_fn, WaitPolicy};
/// use std::time::Duration;
///
/// let policy = wait_fn(linear_backoff_millis);
/// assert_eq!(policy.wait(5).unwrap(), Duration::from_millis(5));
/// ```
pub fn wait_fn<F>(f: F) -> FnWait<F>
where
    F: Fn(u32) -> Result<Duration, WaitError> + Send + Sync,
{
    FnWait { f }
}
