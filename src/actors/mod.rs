//! Actors: the logical call context and method invocation through the sidecar.

pub mod call_context;
mod invocation;

pub use invocation::{dispatch, reentrancy_id, ActorProxy, REENTRANCY_HEADER};
