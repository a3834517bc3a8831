use futures::future::ready;
use retrier::{
    Backoff, InstantSleeper, ManualClock, Outcome, RetryError, Retrier, TokioClock,
    WaitPolicyExt,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TestError;

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_a_long_wait() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut retrier = Retrier::new(Backoff::constant(Duration::from_secs(3600)), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        ready(Outcome::<TestError>::pending())
    });

    let handle = retrier.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
    });

    let start = tokio::time::Instant::now();
    let result = retrier.run().await;

    assert!(matches!(result, Err(RetryError::Cancelled { attempt: 0 })));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "operation never ran");
    assert!(start.elapsed() < Duration::from_secs(3600));
}

#[tokio::test(start_paused = true)]
async fn cancel_between_attempts_reports_the_pending_index() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut retrier = Retrier::new(Backoff::linear_seconds(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        ready(Outcome::<TestError>::pending())
    });

    let handle = retrier.cancel_handle();
    tokio::spawn(async move {
        // Attempts 0 and 1 finish by t=1s; the wait for attempt 2 ends at t=3s.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.cancel();
    });

    let result = retrier.run().await;

    assert!(matches!(result, Err(RetryError::Cancelled { attempt: 2 })));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(retrier.errors().recorded(), 2);
}

#[tokio::test]
async fn deadline_ends_a_run_once_time_runs_out() {
    let clock = ManualClock::new();
    let op_clock = clock.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let policy = Backoff::constant(Duration::from_millis(400))
        .deadline(Duration::from_secs(1))
        .with_clock(clock.clone());
    let mut retrier = Retrier::builder(policy, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        op_clock.advance(Duration::from_millis(400));
        ready(Outcome::retry(TestError))
    })
    .with_sleeper(InstantSleeper)
    .build()
    .unwrap();

    let result = retrier.run().await;

    // Attempts start at t=0, 400ms and 800ms; at 1200ms the deadline has passed.
    assert!(result.unwrap_err().is_exhausted());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn deadline_on_tokio_clock_expires_under_paused_time() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let policy = Backoff::constant(Duration::from_millis(400))
        .deadline(Duration::from_secs(1))
        .with_clock(TokioClock::default());
    let mut retrier = Retrier::new(policy, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        ready(Outcome::retry(TestError))
    });

    let start = tokio::time::Instant::now();
    let result = retrier.run().await;

    // Waits of 400ms, 400ms, then 200ms clipped to the deadline; index 3 lands on it.
    assert!(result.unwrap_err().is_exhausted());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[test]
fn run_blocking_returns_the_terminal_error() {
    let mut retrier = Retrier::new(Backoff::linear_millis().max_attempts(2), |_| {
        ready(Outcome::retry(TestError))
    });

    let result = retrier.run_blocking();

    assert!(result.unwrap_err().is_exhausted());
    assert_eq!(retrier.errors().recorded(), 3);
}
