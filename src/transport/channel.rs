//! # Sidecar Channel
//!
//! The client half of the sidecar connection.

use crate::proto::{
    BulkPublishRequest, BulkPublishResponse, GetWorkflowRequest, GetWorkflowResponse,
    InvokeActorRequest, InvokeActorResponse, TryLockRequest, TryLockResponse, UnlockRequest,
    UnlockResponse,
};
use crate::transport::message::{CallMetadata, Response, SidecarRequest};
use crate::transport::Status;
use tokio::sync::{mpsc, oneshot};

/// A cloneable handle that forwards remote procedure calls to the sidecar.
///
/// Each call sends one [`SidecarRequest`] over an mpsc channel and awaits the
/// answer on a oneshot channel. The handle holds only a sender, so clones are
/// cheap and can be shared across tasks. Dropping the call future (for example
/// when a cancellation wins a `select!`) abandons the answer.
#[derive(Clone, Debug)]
pub struct SidecarChannel {
    sender: mpsc::Sender<SidecarRequest>,
}

impl SidecarChannel {
    pub fn new(sender: mpsc::Sender<SidecarRequest>) -> Self {
        Self { sender }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(Response<T>) -> SidecarRequest,
    ) -> Result<T, Status> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| Status::unavailable("sidecar connection closed"))?;
        response
            .await
            .map_err(|_| Status::aborted("sidecar dropped the response"))?
    }

    pub async fn bulk_publish(
        &self,
        request: BulkPublishRequest,
        metadata: CallMetadata,
    ) -> Result<BulkPublishResponse, Status> {
        self.call(|respond_to| SidecarRequest::BulkPublish {
            request,
            metadata,
            respond_to,
        })
        .await
    }

    pub async fn try_lock(
        &self,
        request: TryLockRequest,
        metadata: CallMetadata,
    ) -> Result<TryLockResponse, Status> {
        self.call(|respond_to| SidecarRequest::TryLock {
            request,
            metadata,
            respond_to,
        })
        .await
    }

    pub async fn unlock(
        &self,
        request: UnlockRequest,
        metadata: CallMetadata,
    ) -> Result<UnlockResponse, Status> {
        self.call(|respond_to| SidecarRequest::Unlock {
            request,
            metadata,
            respond_to,
        })
        .await
    }

    pub async fn invoke_actor(
        &self,
        request: InvokeActorRequest,
        metadata: CallMetadata,
    ) -> Result<InvokeActorResponse, Status> {
        self.call(|respond_to| SidecarRequest::InvokeActor {
            request,
            metadata,
            respond_to,
        })
        .await
    }

    pub async fn get_workflow(
        &self,
        request: GetWorkflowRequest,
        metadata: CallMetadata,
    ) -> Result<GetWorkflowResponse, Status> {
        self.call(|respond_to| SidecarRequest::GetWorkflow {
            request,
            metadata,
            respond_to,
        })
        .await
    }
}
