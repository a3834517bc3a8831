#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # retrier
//!
//! Retry-with-backoff: run an operation until it reports done, waiting between attempts as a
//! composable wait policy dictates.
//!
//! ## Features
//!
//! - **Backoff policies**: exponential, linear (any unit), constant, immediate
//! - **Combinators** bounding attempts or time and clamping delays, all sharing one policy type
//! - **Sequential retry driver** with a bounded per-attempt error log
//! - **Cancelable waits** through a `Sleeper` abstraction (tokio in production, instant in tests)
//! - **Live tuning** of the attempt limit, declarative config behind the `config` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use retrier::{is_exhausted, Backoff, Outcome, Retrier, WaitPolicyExt};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let policy = Backoff::exponential_with_unit(Duration::from_millis(1))
//!         .max_interval(Duration::from_millis(5))
//!         .max_attempts(3);
//!
//!     let mut retrier = Retrier::new(policy, |_attempt| async {
//!         // Your fallible work here
//!         Outcome::retry("not yet")
//!     });
//!
//!     let result = retrier.run().await;
//!     assert!(is_exhausted(&result));
//!     assert_eq!(retrier.errors().recorded(), 4);
//! }
//! ```

pub mod adaptive;
pub mod backoff;
pub mod clock;
pub mod combinator;
#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod error_log;
pub mod prelude;
pub mod retrier;
pub mod sleeper;

// Re-exports
pub use adaptive::DynamicConfig;
pub use backoff::{wait_fn, Backoff, BoxWaitPolicy, FnWait, WaitPolicy};
pub use clock::{Clock, ManualClock, MonotonicClock, TokioClock};
pub use combinator::{
    deadline, max_attempts, max_interval, min_interval, Deadline, MaxAttempts, MaxInterval,
    MinInterval, WaitPolicyExt,
};
pub use error::{is_exhausted, Exhaustion, RetryError, WaitError};
pub use error_log::ErrorLog;
pub use retrier::{BuildError, CancelHandle, Outcome, Retrier, RetrierBuilder};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
