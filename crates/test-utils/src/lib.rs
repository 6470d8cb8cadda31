pub mod builders;
pub mod scripted_runner;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Install a tracing subscriber once per test binary.
///
/// Output goes through the test writer, so it only shows up for failing
/// tests or under `--nocapture`. `RUST_LOG` picks the level; `info` if unset.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Upper bound on how long a batch may take in a test.
pub const BATCH_DEADLINE: Duration = Duration::from_secs(5);

/// Await `f`, panicking if a batch hangs past [`BATCH_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(BATCH_DEADLINE, f).await {
        Ok(value) => value,
        Err(_) => panic!("batch did not finish within {BATCH_DEADLINE:?}"),
    }
}
