//! Minimal retry example: poll until a resource reports ready.
use retrier::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone)]
struct NotReady;

impl std::fmt::Display for NotReady {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resource not ready")
    }
}

impl std::error::Error for NotReady {}

#[tokio::main]
async fn main() -> Result<(), RetryError<NotReady>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let policy = Backoff::linear(Duration::from_millis(50)).max_attempts(5);
    let mut retrier = Retrier::new(policy, |attempt| async move {
        // Replace with your real readiness check
        if attempt < 3 {
            Outcome::retry(NotReady)
        } else {
            Outcome::done()
        }
    });

    retrier.run().await?;
    println!("ready after {} attempts", retrier.errors().recorded());
    Ok(())
}
