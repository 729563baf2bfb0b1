//! # Mock Sidecar & Testing Guide
//!
//! Client logic is tested without a sidecar by putting a test-controlled
//! receiver at the far end of a [`SidecarChannel`].
//!
//! ## When to use which helper
//!
//! | Helper | Use Case |
//! |--------|----------|
//! | [`create_mock_sidecar`] + `expect_*` | Capture the exact wire request, then answer it by hand |
//! | [`MockSidecar`] | Queue canned answers up front and `verify()` they were all consumed |
//! | [`SidecarServer`](super::SidecarServer) with a test service | Stateful end-to-end flows |
//!
//! ## Capturing a request
//!
//! ```rust
//! use dapr::transport::mock::{create_mock_sidecar, expect_bulk_publish};
//! use dapr::proto::BulkPublishResponse;
//! use dapr::DaprClient;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (channel, mut receiver) = create_mock_sidecar(10);
//!     let client = DaprClient::new(channel);
//!
//!     let call = tokio::spawn(async move {
//!         let items = vec!["hello", "world"];
//!         let result = client
//!             .bulk_publish_event("pubsub", "orders", &items, None, &CancellationToken::new())
//!             .await?;
//!         Ok::<_, dapr::DaprError>(result.failed_entries.len())
//!     });
//!
//!     let (request, _metadata, respond_to) = expect_bulk_publish(&mut receiver)
//!         .await
//!         .expect("Expected BulkPublish request");
//!     assert_eq!(request.entries.len(), 2);
//!     respond_to.send(Ok(BulkPublishResponse::default())).unwrap();
//!
//!     assert_eq!(call.await.unwrap().unwrap(), 0);
//! }
//! ```
//!
//! ## Simulating faults
//!
//! ```rust
//! use dapr::transport::mock::MockSidecar;
//! use dapr::transport::Status;
//! use dapr::DaprClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockSidecar::new();
//!     mock.expect_try_lock().return_err(Status::internal("store offline"));
//!
//!     let client = DaprClient::new(mock.channel());
//!     let result = client.try_lock("redis", "resource", "owner", 60).await;
//!     assert!(result.unwrap_err().status().is_some());
//!     mock.verify();
//! }
//! ```

use crate::proto::{
    BulkPublishRequest, BulkPublishResponse, GetWorkflowRequest, GetWorkflowResponse,
    InvokeActorRequest, InvokeActorResponse, TryLockRequest, TryLockResponse, UnlockRequest,
    UnlockResponse,
};
use crate::transport::channel::SidecarChannel;
use crate::transport::message::{CallMetadata, Response, SidecarRequest};
use crate::transport::Status;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A queued answer for the next request of the matching kind.
enum Expectation {
    BulkPublish(Result<BulkPublishResponse, Status>),
    TryLock(Result<TryLockResponse, Status>),
    Unlock(Result<UnlockResponse, Status>),
    InvokeActor(Result<InvokeActorResponse, Status>),
    GetWorkflow(Result<GetWorkflowResponse, Status>),
}

/// A request the mock has seen: the procedure name and its call metadata.
#[derive(Debug, Clone)]
pub struct ReceivedCall {
    pub procedure: &'static str,
    pub metadata: CallMetadata,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    received: Vec<ReceivedCall>,
    mismatches: Vec<String>,
}

/// A mock sidecar with expectation tracking for fluent testing.
///
/// Expectations are consumed in order. A request that does not match the next
/// expectation is answered with an `Internal` status and reported by
/// [`verify`](MockSidecar::verify).
///
/// ```ignore
/// let mut mock = MockSidecar::new();
/// mock.expect_bulk_publish().return_ok(BulkPublishResponse::default());
///
/// let client = DaprClient::new(mock.channel());
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockSidecar {
    channel: SidecarChannel,
    state: Arc<Mutex<MockState>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockSidecar {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSidecar {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<SidecarRequest>(100);
        let state = Arc::new(Mutex::new(MockState::default()));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = {
                    let mut state = task_state.lock().unwrap_or_else(|e| e.into_inner());
                    state.received.push(ReceivedCall {
                        procedure: request.procedure(),
                        metadata: request.metadata().clone(),
                    });
                    state.expectations.pop_front()
                };

                answer(request, expectation, &task_state);
            }
        });

        Self {
            channel: SidecarChannel::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns a channel connected to this mock.
    pub fn channel(&self) -> SidecarChannel {
        self.channel.clone()
    }

    pub fn expect_bulk_publish(&mut self) -> ExpectationBuilder<BulkPublishResponse> {
        self.builder(Expectation::BulkPublish)
    }

    pub fn expect_try_lock(&mut self) -> ExpectationBuilder<TryLockResponse> {
        self.builder(Expectation::TryLock)
    }

    pub fn expect_unlock(&mut self) -> ExpectationBuilder<UnlockResponse> {
        self.builder(Expectation::Unlock)
    }

    pub fn expect_invoke_actor(&mut self) -> ExpectationBuilder<InvokeActorResponse> {
        self.builder(Expectation::InvokeActor)
    }

    pub fn expect_get_workflow(&mut self) -> ExpectationBuilder<GetWorkflowResponse> {
        self.builder(Expectation::GetWorkflow)
    }

    fn builder<T>(
        &mut self,
        wrap: fn(Result<T, Status>) -> Expectation,
    ) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            wrap,
            state: self.state.clone(),
        }
    }

    /// Every request received so far, in arrival order.
    pub fn received(&self) -> Vec<ReceivedCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .received
            .clone()
    }

    /// Verifies that all expectations were met and no request was unexpected.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.mismatches.is_empty() {
            panic!("Unexpected requests: {:?}", state.mismatches);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

/// Sends the queued answer, or records the mismatch and answers with an
/// `Internal` status when the request does not match.
fn answer(request: SidecarRequest, expectation: Option<Expectation>, state: &Mutex<MockState>) {
    let procedure = request.procedure();
    match (request, expectation) {
        (SidecarRequest::BulkPublish { respond_to, .. }, Some(Expectation::BulkPublish(r))) => {
            let _ = respond_to.send(r);
        }
        (SidecarRequest::TryLock { respond_to, .. }, Some(Expectation::TryLock(r))) => {
            let _ = respond_to.send(r);
        }
        (SidecarRequest::Unlock { respond_to, .. }, Some(Expectation::Unlock(r))) => {
            let _ = respond_to.send(r);
        }
        (SidecarRequest::InvokeActor { respond_to, .. }, Some(Expectation::InvokeActor(r))) => {
            let _ = respond_to.send(r);
        }
        (SidecarRequest::GetWorkflow { respond_to, .. }, Some(Expectation::GetWorkflow(r))) => {
            let _ = respond_to.send(r);
        }
        (request, _) => {
            let mismatch = format!("unexpected {procedure} request");
            state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .mismatches
                .push(mismatch.clone());
            reject(request, Status::internal(mismatch));
        }
    }
}

fn reject(request: SidecarRequest, status: Status) {
    match request {
        SidecarRequest::BulkPublish { respond_to, .. } => {
            let _ = respond_to.send(Err(status));
        }
        SidecarRequest::TryLock { respond_to, .. } => {
            let _ = respond_to.send(Err(status));
        }
        SidecarRequest::Unlock { respond_to, .. } => {
            let _ = respond_to.send(Err(status));
        }
        SidecarRequest::InvokeActor { respond_to, .. } => {
            let _ = respond_to.send(Err(status));
        }
        SidecarRequest::GetWorkflow { respond_to, .. } => {
            let _ = respond_to.send(Err(status));
        }
    }
}

/// Builder for a single queued answer.
pub struct ExpectationBuilder<T> {
    wrap: fn(Result<T, Status>) -> Expectation,
    state: Arc<Mutex<MockState>>,
}

impl<T> ExpectationBuilder<T> {
    /// Sets the expectation to return a successful response.
    pub fn return_ok(self, response: T) {
        self.push(Ok(response));
    }

    /// Sets the expectation to fail with a transport status.
    pub fn return_err(self, status: Status) {
        self.push(Err(status));
    }

    fn push(self, response: Result<T, Status>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.expectations.push_back((self.wrap)(response));
    }
}

// =============================================================================
// CAPTURE HELPERS
// =============================================================================

/// Creates a channel and the receiver behind it for asserting requests.
///
/// The test drives the far end by hand: it awaits the next request with one
/// of the `expect_*` helpers, inspects it, then answers through the returned
/// responder. This makes delays and out-of-order answers deterministic.
pub fn create_mock_sidecar(
    buffer_size: usize,
) -> (SidecarChannel, mpsc::Receiver<SidecarRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (SidecarChannel::new(sender), receiver)
}

/// Helper to verify that the next message is a BulkPublish request
pub async fn expect_bulk_publish(
    receiver: &mut mpsc::Receiver<SidecarRequest>,
) -> Option<(BulkPublishRequest, CallMetadata, Response<BulkPublishResponse>)> {
    match receiver.recv().await {
        Some(SidecarRequest::BulkPublish {
            request,
            metadata,
            respond_to,
        }) => Some((request, metadata, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a TryLock request
pub async fn expect_try_lock(
    receiver: &mut mpsc::Receiver<SidecarRequest>,
) -> Option<(TryLockRequest, CallMetadata, Response<TryLockResponse>)> {
    match receiver.recv().await {
        Some(SidecarRequest::TryLock {
            request,
            metadata,
            respond_to,
        }) => Some((request, metadata, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Unlock request
pub async fn expect_unlock(
    receiver: &mut mpsc::Receiver<SidecarRequest>,
) -> Option<(UnlockRequest, CallMetadata, Response<UnlockResponse>)> {
    match receiver.recv().await {
        Some(SidecarRequest::Unlock {
            request,
            metadata,
            respond_to,
        }) => Some((request, metadata, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an InvokeActor request
pub async fn expect_invoke_actor(
    receiver: &mut mpsc::Receiver<SidecarRequest>,
) -> Option<(InvokeActorRequest, CallMetadata, Response<InvokeActorResponse>)> {
    match receiver.recv().await {
        Some(SidecarRequest::InvokeActor {
            request,
            metadata,
            respond_to,
        }) => Some((request, metadata, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a GetWorkflow request
pub async fn expect_get_workflow(
    receiver: &mut mpsc::Receiver<SidecarRequest>,
) -> Option<(GetWorkflowRequest, CallMetadata, Response<GetWorkflowResponse>)> {
    match receiver.recv().await {
        Some(SidecarRequest::GetWorkflow {
            request,
            metadata,
            respond_to,
        }) => Some((request, metadata, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Code;

    #[tokio::test]
    async fn test_capture_and_answer() {
        let (channel, mut receiver) = create_mock_sidecar(10);

        let call = tokio::spawn(async move {
            channel
                .try_lock(
                    TryLockRequest {
                        store_name: "redis".to_string(),
                        ..Default::default()
                    },
                    CallMetadata::new(),
                )
                .await
        });

        let (request, _, respond_to) = expect_try_lock(&mut receiver)
            .await
            .expect("Expected TryLock request");
        assert_eq!(request.store_name, "redis");
        respond_to.send(Ok(TryLockResponse { success: true })).unwrap();

        assert!(call.await.unwrap().unwrap().success);
    }

    #[tokio::test]
    async fn test_mock_with_expectations() {
        let mut mock = MockSidecar::new();
        mock.expect_unlock().return_ok(UnlockResponse { status: 1 });
        mock.expect_get_workflow()
            .return_err(Status::new(Code::NotFound, "no such instance"));

        let channel = mock.channel();
        let unlocked = channel
            .unlock(UnlockRequest::default(), CallMetadata::new())
            .await
            .unwrap();
        assert_eq!(unlocked.status, 1);

        let err = channel
            .get_workflow(GetWorkflowRequest::default(), CallMetadata::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);

        assert_eq!(mock.received().len(), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_mismatch_is_reported() {
        let mut mock = MockSidecar::new();
        mock.expect_unlock().return_ok(UnlockResponse::default());

        let err = mock
            .channel()
            .try_lock(TryLockRequest::default(), CallMetadata::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Internal);

        mock.verify();
    }
}
