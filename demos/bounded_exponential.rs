//! Exponential backoff with a floor, a ceiling, an attempt limit and cancellation.
use retrier::prelude::*;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let policy = Backoff::exponential_with_unit(Duration::from_millis(10))
        .min_interval(Duration::from_millis(20))
        .max_interval(Duration::from_millis(200))
        .max_attempts(8);

    let mut retrier = Retrier::new(policy, |attempt| async move {
        Outcome::retry(format!("attempt {} failed", attempt))
    });

    let cancel = retrier.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
    });

    let result = retrier.run().await;
    if is_exhausted(&result) {
        println!("gave up; last errors:");
        for error in retrier.errors().errors() {
            println!("  {}", error);
        }
    } else if let Err(err) = result {
        println!("stopped: {}", err);
    }
}
