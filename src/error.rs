//! Error types for wait policies and the retry driver
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Why a wait policy refused to schedule another attempt.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Exhaustion {
    /// The attempt index passed the configured limit.
    #[error("attempt {attempt} exceeds the limit of {max_attempts}")]
    Attempts { attempt: u32, max_attempts: u32 },
    /// The retry deadline has passed.
    #[error("deadline of {limit:?} passed after {elapsed:?}")]
    Deadline { elapsed: Duration, limit: Duration },
}

/// Errors returned by a [`crate::WaitPolicy`]. Every one of them ends the retry loop.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum WaitError {
    /// No more attempts are permitted.
    #[error("retry exhausted: {0}")]
    Exhausted(Exhaustion),
    /// A custom policy failed.
    #[error("wait policy failed: {0}")]
    Policy(Arc<dyn std::error::Error + Send + Sync>),
}

impl WaitError {
    /// Attempt-limit exhaustion.
    pub fn attempts_exhausted(attempt: u32, max_attempts: u32) -> Self {
        Self::Exhausted(Exhaustion::Attempts { attempt, max_attempts })
    }

    /// Deadline exhaustion.
    pub fn deadline_exhausted(elapsed: Duration, limit: Duration) -> Self {
        Self::Exhausted(Exhaustion::Deadline { elapsed, limit })
    }

    /// Wrap an arbitrary error raised by a custom policy.
    pub fn policy<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Policy(Arc::new(err))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    pub fn exhaustion(&self) -> Option<Exhaustion> {
        match self {
            Self::Exhausted(reason) => Some(*reason),
            Self::Policy(_) => None,
        }
    }
}

/// Terminal error of a retry run.
#[derive(Debug, Clone)]
pub enum RetryError<E> {
    /// The operation reported done together with this error.
    Inner(E),
    /// The wait policy ended the loop; the operation was not invoked for that attempt.
    Wait(WaitError),
    /// The run was cancelled while waiting before `attempt`.
    Cancelled { attempt: u32 },
    /// The runtime backing `run_blocking` could not be started.
    Runtime(Arc<io::Error>),
    /// The attempt index ran past `u32::MAX` without the policy or the operation ending the run.
    IndexOverflow,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner(e) => write!(f, "{}", e),
            Self::Wait(e) => write!(f, "{}", e),
            Self::Cancelled { attempt } => {
                write!(f, "retry cancelled while waiting for attempt {}", attempt)
            }
            Self::Runtime(e) => write!(f, "failed to start retry runtime: {}", e),
            Self::IndexOverflow => {
                write!(f, "attempt index overflowed after {} attempts", u64::from(u32::MAX) + 1)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Wait(e) => Some(e),
            Self::Runtime(e) => Some(e.as_ref()),
            Self::Cancelled { .. } | Self::IndexOverflow => None,
        }
    }
}

impl<E> From<WaitError> for RetryError<E> {
    fn from(err: WaitError) -> Self {
        Self::Wait(err)
    }
}

impl<E> RetryError<E> {
    /// Check if the wait policy ran out of attempts or time.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Wait(e) if e.is_exhausted())
    }
    /// Check if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
    /// Check if this error came from the operation.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }
    /// Borrow the operation error if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
    /// Get the operation error if this is an `Inner` variant.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
    /// Borrow the wait-policy error if present.
    pub fn as_wait(&self) -> Option<&WaitError> {
        match self {
            Self::Wait(e) => Some(e),
            _ => None,
        }
    }
    /// Exhaustion details, if the run was exhausted.
    pub fn exhaustion(&self) -> Option<Exhaustion> {
        self.as_wait().and_then(WaitError::exhaustion)
    }
}

/// True only when a run ended because its wait policy was exhausted. `Ok` is never exhausted.
pub fn is_exhausted<E>(outcome: &Result<(), RetryError<E>>) -> bool {
    matches!(outcome, Err(e) if e.is_exhausted())
}
