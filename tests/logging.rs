use futures::future::ready;
use retrier::{Backoff, InstantSleeper, Outcome, Retrier, WaitPolicyExt};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedGuard(self.0.clone())
    }
}

struct SharedGuard(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture() -> (Arc<Mutex<Vec<u8>>>, tracing::subscriber::DefaultGuard) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(BoxMakeWriter::new(SharedWriter(buffer.clone())))
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

fn logs(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
}

#[test]
fn exhaustion_is_logged_as_a_warning() {
    let (buffer, _guard) = capture();

    let mut retrier = Retrier::builder(Backoff::immediate().max_attempts(1), |_| {
        ready(Outcome::retry("offline"))
    })
    .with_sleeper(InstantSleeper)
    .build()
    .unwrap();
    assert!(retrier.run_blocking().unwrap_err().is_exhausted());

    let logs = logs(&buffer);
    assert!(logs.contains("WARN"), "{}", logs);
    assert!(logs.contains("wait policy ended retry loop"), "{}", logs);
    assert!(logs.contains("operation failed; retrying"), "{}", logs);
}

#[test]
fn success_after_retries_is_logged() {
    let (buffer, _guard) = capture();

    let mut retrier = Retrier::builder(Backoff::immediate(), |attempt| {
        ready(if attempt == 1 { Outcome::<&str>::done() } else { Outcome::retry("busy") })
    })
    .with_sleeper(InstantSleeper)
    .build()
    .unwrap();
    assert!(retrier.run_blocking().is_ok());

    let logs = logs(&buffer);
    assert!(logs.contains("retry attempt scheduled"), "{}", logs);
    assert!(logs.contains("operation succeeded after retries"), "{}", logs);
    assert!(logs.contains("attempts=2"), "{}", logs);
}
