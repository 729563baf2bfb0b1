//! # Logical Call Context
//!
//! The sidecar detects reentrant actor call chains by a token that travels
//! with every hop (`Dapr-Reentrancy-Id`). While an actor method runs, the
//! token it was invoked with must be attached to every actor call it makes,
//! however deep in its `await`s that call happens.
//!
//! The token belongs to a *logical flow*, not to a thread and not to the
//! process: a flow may hop worker threads at every `await`, and two actor
//! invocations running on the same runtime must never see each other's token.
//! It is stored in a [`tokio::task_local!`] cell that a flow enters with
//! [`scope`]:
//!
//! - Everything awaited inside the scope sees the same cell, so [`set`] and
//!   [`clear`] are visible to the rest of the flow.
//! - A nested [`scope`] (or [`inherit`]) gets its own cell seeded with a copy
//!   of the current value. Its mutations never leak back to the parent.
//! - Tasks started with [`spawn`] inherit the value current at spawn time and
//!   are independent from then on. A bare `tokio::spawn` starts a flow with no
//!   token at all.
//!
//! Futures that run concurrently inside one task (`join!`, `select!`) share
//! the task's cell. Wrap each branch in [`inherit`] when the branches may set
//! their own token.
//!
//! Every flow that sets a token must be entered through [`scope`], [`inherit`]
//! or [`spawn`]; inbound actor calls get one from
//! [`dispatch`](crate::actors::dispatch). A bare `tokio::spawn` task has no
//! cell, so [`set`] there fails with [`NoCallContextScope`] and nothing is
//! attached to its outbound calls.
//!
//! ```rust
//! use dapr::actors::call_context;
//!
//! #[tokio::main]
//! async fn main() {
//!     assert!(!call_context::is_present());
//!
//!     call_context::scope(Some("chain-1".to_string()), async {
//!         assert_eq!(call_context::try_get().as_deref(), Some("chain-1"));
//!
//!         let child = call_context::spawn(async { call_context::try_get() });
//!         call_context::set("chain-2").unwrap();
//!         assert_eq!(child.await.unwrap().as_deref(), Some("chain-1"));
//!     })
//!     .await;
//!
//!     assert!(call_context::try_get().is_none());
//!     assert!(call_context::set("orphan").is_err());
//! }
//! ```

use std::cell::RefCell;
use std::future::Future;
use tokio::task::JoinHandle;

tokio::task_local! {
    static CALL_CONTEXT: RefCell<Option<String>>;
}

/// The current flow was not entered through a call context scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no call context scope is active in this flow")]
pub struct NoCallContextScope;

/// Returns `true` when the current flow carries a token.
pub fn is_present() -> bool {
    CALL_CONTEXT
        .try_with(|cell| cell.borrow().is_some())
        .unwrap_or(false)
}

/// Returns the current flow's token, if any.
pub fn try_get() -> Option<String> {
    CALL_CONTEXT
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
}

/// Installs `token` for the rest of the current flow.
///
/// # Errors
///
/// [`NoCallContextScope`] when the flow was not entered through [`scope`],
/// [`inherit`] or [`spawn`]. The token is not stored.
pub fn set(token: impl Into<String>) -> Result<(), NoCallContextScope> {
    let token = token.into();
    CALL_CONTEXT
        .try_with(|cell| *cell.borrow_mut() = Some(token))
        .map_err(|_| NoCallContextScope)
}

/// Removes the token from the current flow.
pub fn clear() {
    let _ = CALL_CONTEXT.try_with(|cell| cell.borrow_mut().take());
}

/// Runs `fut` as a flow of its own, starting with `token`.
pub async fn scope<F: Future>(token: Option<String>, fut: F) -> F::Output {
    CALL_CONTEXT.scope(RefCell::new(token), fut).await
}

/// Runs `fut` in a child flow seeded with a copy of the current token.
///
/// The copy is taken when `inherit` is called, not when the future is first
/// polled.
pub fn inherit<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    let token = try_get();
    CALL_CONTEXT.scope(RefCell::new(token), fut)
}

/// Spawns `fut` on the runtime as a child flow of the caller.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(inherit(fut))
}
