//! Plumbing between the typed client and the sidecar connection.
//!
//! # Main Components
//!
//! - [`SidecarRequest`] - One message per remote procedure
//! - [`SidecarChannel`] - Cloneable handle the client sends requests through
//! - [`SidecarService`] - Trait answering requests on the far side
//! - [`SidecarServer`] - Dispatch loop driving a [`SidecarService`]
//! - [`Status`] - Fault reported by the connection (a gRPC status)
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without a sidecar.

pub mod channel;
pub mod message;
pub mod mock;
pub mod server;
pub mod service;

pub use channel::SidecarChannel;
pub use message::{CallMetadata, Response, SidecarRequest};
pub use server::SidecarServer;
pub use service::SidecarService;
pub use tonic::{Code, Status};
