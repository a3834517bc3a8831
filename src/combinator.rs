//! Wait-policy combinators.
//!
//! Every combinator wraps a [`WaitPolicy`] and is itself a `WaitPolicy`, so they nest freely.
//!
//! Semantics:
//! - The wrapped policy is consulted at most once per call; `MaxAttempts` and an expired
//!   `Deadline` do not consult it at all.
//! - Errors from the wrapped policy pass through unchanged; clamping only touches `Ok` durations.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use retrier::{Backoff, WaitPolicy, WaitPolicyExt};
//!
//! let policy = Backoff::exponential()
//!     .min_interval(Duration::from_secs(2))
//!     .max_interval(Duration::from_secs(30))
//!     .max_attempts(5);
//!
//! assert_eq!(policy.wait(0).unwrap(), Duration::from_secs(2)); // floored
//! assert_eq!(policy.wait(3).unwrap(), Duration::from_secs(8));
//! assert_eq!(policy.wait(5).unwrap(), Duration::from_secs(30)); // capped
//! assert!(policy.wait(6).unwrap_err().is_exhausted());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::adaptive::DynamicConfig;
use crate::backoff::WaitPolicy;
use crate::clock::{Clock, MonotonicClock};
use crate::error::WaitError;

/// Rejects attempt indices greater than a limit with an exhaustion error.
///
/// With a limit of `n` the indices `0..=n` are allowed, i.e. `n + 1` attempts in total.
#[derive(Debug, Clone)]
pub struct MaxAttempts<P> {
    inner: P,
    limit: DynamicConfig<u32>,
}

impl<P> MaxAttempts<P> {
    pub fn new(max_attempts: u32, inner: P) -> Self {
        Self { inner, limit: DynamicConfig::new(max_attempts) }
    }

    /// Handle to the live limit. Changes apply from the next call on.
    pub fn limit_handle(&self) -> DynamicConfig<u32> {
        self.limit.clone()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: WaitPolicy> WaitPolicy for MaxAttempts<P> {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        let max_attempts = self.limit.get();
        if attempt > max_attempts {
            return Err(WaitError::attempts_exhausted(attempt, max_attempts));
        }
        self.inner.wait(attempt)
    }
}

/// Clamps the wrapped policy's delay down to a ceiling.
#[derive(Debug, Clone)]
pub struct MaxInterval<P> {
    inner: P,
    ceiling: Duration,
}

impl<P> MaxInterval<P> {
    pub fn new(ceiling: Duration, inner: P) -> Self {
        Self { inner, ceiling }
    }
}

impl<P: WaitPolicy> WaitPolicy for MaxInterval<P> {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        self.inner.wait(attempt).map(|delay| delay.min(self.ceiling))
    }
}

/// Clamps the wrapped policy's delay up to a floor.
#[derive(Debug, Clone)]
pub struct MinInterval<P> {
    inner: P,
    floor: Duration,
}

impl<P> MinInterval<P> {
    pub fn new(floor: Duration, inner: P) -> Self {
        Self { inner, floor }
    }
}

impl<P: WaitPolicy> WaitPolicy for MinInterval<P> {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        self.inner.wait(attempt).map(|delay| delay.max(self.floor))
    }
}

/// Exhausts once a time limit has passed since attempt `0` was scheduled.
///
/// Attempt `0` (re)starts the clock, so the same policy can serve consecutive runs. Until the limit
/// passes, delays are shortened so that no wait extends past it. Clones share the clock but keep
/// their own start time.
///
/// The default clock is [`MonotonicClock`], which reads `std::time::Instant` and ignores a paused
/// tokio clock. Under `tokio::time::pause` (or `start_paused` tests) use
/// `with_clock(TokioClock::default())` so the deadline follows the same time as the sleeps.
#[derive(Debug)]
pub struct Deadline<P> {
    inner: P,
    limit: Duration,
    clock: Arc<dyn Clock>,
    started_at: Arc<AtomicU64>,
}

impl<P: Clone> Clone for Deadline<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limit: self.limit,
            clock: self.clock.clone(),
            started_at: Arc::new(AtomicU64::new(self.started_at.load(Ordering::SeqCst))),
        }
    }
}

impl<P> Deadline<P> {
    pub fn new(limit: Duration, inner: P) -> Self {
        Self {
            inner,
            limit,
            clock: Arc::new(MonotonicClock::default()),
            started_at: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the clock (useful for deterministic tests).
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn elapsed(&self, attempt: u32) -> Duration {
        let now = self.clock.now_millis();
        if attempt == 0 {
            self.started_at.store(now, Ordering::SeqCst);
            return Duration::ZERO;
        }
        Duration::from_millis(now.saturating_sub(self.started_at.load(Ordering::SeqCst)))
    }
}

impl<P: WaitPolicy> WaitPolicy for Deadline<P> {
    fn wait(&self, attempt: u32) -> Result<Duration, WaitError> {
        let elapsed = self.elapsed(attempt);
        if elapsed >= self.limit {
            return Err(WaitError::deadline_exhausted(elapsed, self.limit));
        }
        let remaining = self.limit - elapsed;
        self.inner.wait(attempt).map(|delay| delay.min(remaining))
    }
}

/// Bound `policy` to attempt indices `0..=max_attempts`.
pub fn max_attempts<P: WaitPolicy>(max_attempts: u32, policy: P) -> MaxAttempts<P> {
    MaxAttempts::new(max_attempts, policy)
}

/// Never wait longer than `ceiling`.
pub fn max_interval<P: WaitPolicy>(ceiling: Duration, policy: P) -> MaxInterval<P> {
    MaxInterval::new(ceiling, policy)
}

/// Never wait less than `floor`.
pub fn min_interval<P: WaitPolicy>(floor: Duration, policy: P) -> MinInterval<P> {
    MinInterval::new(floor, policy)
}

/// Stop scheduling attempts once `limit` has passed.
pub fn deadline<P: WaitPolicy>(limit: Duration, policy: P) -> Deadline<P> {
    Deadline::new(limit, policy)
}

/// Chaining forms of the combinators.
pub trait WaitPolicyExt: WaitPolicy + Sized {
    fn max_attempts(self, max_attempts: u32) -> MaxAttempts<Self> {
        MaxAttempts::new(max_attempts, self)
    }

    fn max_interval(self, ceiling: Duration) -> MaxInterval<Self> {
        MaxInterval::new(ceiling, self)
    }

    fn min_interval(self, floor: Duration) -> MinInterval<Self> {
        MinInterval::new(floor, self)
    }

    fn deadline(self, limit: Duration) -> Deadline<Self> {
        Deadline::new(limit, self)
    }

    fn boxed(self) -> Box<dyn WaitPolicy>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<P: WaitPolicy> WaitPolicyExt for P {}
