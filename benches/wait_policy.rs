use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures::future::ready;
use retrier::{Backoff, InstantSleeper, Outcome, Retrier, WaitPolicy, WaitPolicyExt};
use std::time::Duration;

fn composed_policy_evaluation(c: &mut Criterion) {
    let policy = Backoff::exponential()
        .min_interval(Duration::from_millis(100))
        .max_interval(Duration::from_secs(30))
        .max_attempts(64);

    c.bench_function("composed_policy_wait", |b| {
        b.iter(|| {
            for attempt in 0..64u32 {
                black_box(policy.wait(black_box(attempt)).ok());
            }
        })
    });
}

fn boxed_policy_evaluation(c: &mut Criterion) {
    let policy = Backoff::linear_millis().max_interval(Duration::from_secs(1)).boxed();

    c.bench_function("boxed_policy_wait", |b| {
        b.iter(|| black_box(policy.wait(black_box(17)).ok()))
    });
}

fn retry_loop_to_exhaustion(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("retry_loop_16_attempts", |b| {
        b.to_async(&rt).iter(|| async {
            let mut retrier = Retrier::builder(Backoff::immediate().max_attempts(15), |_| {
                ready(Outcome::retry("unavailable"))
            })
            .with_sleeper(InstantSleeper)
            .build()
            .unwrap();
            black_box(retrier.run().await.is_err())
        })
    });
}

criterion_group!(
    benches,
    composed_policy_evaluation,
    boxed_policy_evaluation,
    retry_loop_to_exhaustion
);
criterion_main!(benches);
