//! # Observability
//!
//! The facade and the wrapped client log through `tracing`. Forwarding entry
//! points open a span per call; the client logs each request at `debug` and
//! every failed request at `warn`.
//!
//! ```bash
//! # Requests and their routes
//! RUST_LOG=debug cargo test
//!
//! # Only the client
//! RUST_LOG=chat_service=debug cargo test
//! ```

use tracing_subscriber::EnvFilter;

/// Install a compact subscriber filtered by `RUST_LOG`.
///
/// Panics if a global subscriber is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`], but writes through the test harness and tolerates
/// being called from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .compact()
        .try_init();
}
