#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Dapr Client SDK
//!
//! > **Typed access to the Dapr sidecar from async Rust.**
//!
//! An application talks to its Dapr sidecar through a [`DaprClient`]. The
//! client turns typed calls (publish these events, invoke that actor, take
//! this lock) into sidecar requests, and turns the sidecar's answers back into
//! typed results and a closed set of [`DaprError`]s.
//!
//! ## 🏗️ Design
//!
//! ### Message passing at the boundary
//! The client never owns a connection. It sends [`SidecarRequest`](transport::SidecarRequest)s
//! over a [`SidecarChannel`](transport::SidecarChannel), each carrying a oneshot
//! responder. Whatever sits at the far end (a gRPC bridge, the in-process
//! [`SidecarServer`](transport::SidecarServer), or a test mock) answers
//! through that responder. The client is therefore cheap to clone and trivial
//! to test.
//!
//! ### Two pieces of real logic
//! - **Bulk publish reconciliation** ([`pubsub`]): N events go out in one
//!   request, only the failures come back, and each failure is mapped onto
//!   the caller's original item by its positional entry id.
//! - **Logical call context** ([`actors::call_context`]): the reentrancy token
//!   of an actor call chain follows the async flow across `await` points and
//!   worker threads, and never leaks between concurrent flows.
//!
//! Everything else is thin, validated plumbing.
//!
//! ## 🗺️ Module Tour
//!
//! - [`client`]: the [`DaprClient`], call metadata, cancellation and timeouts.
//! - [`pubsub`]: [`bulk_publish_event`](DaprClient::bulk_publish_event) and
//!   explicit [`EventPayload`](pubsub::EventPayload)s.
//! - [`actors`]: the call context, [`ActorProxy`](actors::ActorProxy) and
//!   inbound [`dispatch`](actors::dispatch).
//! - [`lock`]: distributed lock acquire and release.
//! - [`workflow`]: workflow instance status.
//! - [`transport`]: wire messages, the channel, the service trait, the server
//!   and the [`mock`](transport::mock) sidecar for tests.
//! - [`config`], [`error`], [`logging`]: the ambient pieces.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use dapr::transport::mock::MockSidecar;
//! use dapr::proto::{BulkPublishResponse, BulkPublishResponseFailedEntry};
//! use dapr::DaprClient;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockSidecar::new();
//!     mock.expect_bulk_publish().return_ok(BulkPublishResponse {
//!         failed_entries: vec![BulkPublishResponseFailedEntry {
//!             entry_id: "1".to_string(),
//!             error: "topic is full".to_string(),
//!         }],
//!     });
//!
//!     let client = DaprClient::new(mock.channel());
//!     let orders = vec!["order-1", "order-2", "order-3"];
//!     let result = client
//!         .bulk_publish_event("pubsub", "orders", &orders, None, &CancellationToken::new())
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(result.failed_events(), vec![&"order-2"]);
//!     mock.verify();
//! }
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! RUST_LOG=debug cargo test
//! ```

pub mod actors;
pub mod client;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod proto;
pub mod pubsub;
pub mod transport;
pub mod workflow;

pub use client::DaprClient;
pub use config::ClientOptions;
pub use error::DaprError;
