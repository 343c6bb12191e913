//! Shared helpers for taskdag's integration tests: tracing setup, a watchdog
//! timeout, config/task builders and a recording executor backend.

pub mod builders;
pub mod recording;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test subscriber once per process.
///
/// Uses the test writer, so output only shows up for failing tests (or with
/// `-- --nocapture`); levels come from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, panicking if it takes longer than five seconds. Keeps a wedged
/// scheduler loop from hanging the whole suite.
pub async fn with_timeout<F: Future>(f: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("test future timed out after 5s")
}
