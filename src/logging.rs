//! # Logging
//!
//! The crate logs through `tracing` and never installs a subscriber on its
//! own. Applications (and the tests and demos in this repository) call
//! [`setup_tracing`] once at startup.
//!
//! ## What gets logged
//!
//! - **Sidecar server**: startup, shutdown and the number of requests served,
//!   with a `service_type` field naming the service implementation.
//! - **Client operations**: one span per public operation carrying its
//!   arguments (payload items are skipped, their count is recorded instead).
//! - **Faults**: transport failures and partial bulk publish failures at
//!   `warn`, each with the operation's span fields attached.
//! - **Call context**: the reentrancy id sent or received, at `debug`.
//!
//! ## Usage
//!
//! ```bash
//! # Operation outcomes only
//! RUST_LOG=info cargo test
//!
//! # Request shapes and reentrancy ids
//! RUST_LOG=dapr=debug cargo test
//! ```
//!
//! With `RUST_LOG=debug` a partially failed bulk publish reads:
//!
//! ```text
//! DEBUG bulk_publish_event{pubsub_name="pubsub" topic="orders" count=2}: Sending request entries=2 metadata={}
//!  WARN bulk_publish_event{pubsub_name="pubsub" topic="orders" count=2}: Some entries were not published failed=1
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Calling it again once a global subscriber exists has no effect.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // spans and fields identify the operation
        .compact()
        .try_init();
}
