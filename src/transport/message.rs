//! # Sidecar Messages
//!
//! The message type sent from a [`SidecarChannel`](super::SidecarChannel) to
//! whatever owns the other end of the connection (a [`SidecarServer`](super::SidecarServer)
//! or a test mock). There is one variant per remote procedure.

use crate::proto::{
    BulkPublishRequest, BulkPublishResponse, GetWorkflowRequest, GetWorkflowResponse,
    InvokeActorRequest, InvokeActorResponse, TryLockRequest, TryLockResponse, UnlockRequest,
    UnlockResponse,
};
use crate::transport::Status;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// One-shot channel used to answer a single request.
pub type Response<T> = oneshot::Sender<Result<T, Status>>;

/// Per-call metadata (gRPC metadata / HTTP headers), e.g. `dapr-api-token`.
pub type CallMetadata = HashMap<String, String>;

/// A remote procedure call addressed to the sidecar.
#[derive(Debug)]
pub enum SidecarRequest {
    BulkPublish {
        request: BulkPublishRequest,
        metadata: CallMetadata,
        respond_to: Response<BulkPublishResponse>,
    },
    TryLock {
        request: TryLockRequest,
        metadata: CallMetadata,
        respond_to: Response<TryLockResponse>,
    },
    Unlock {
        request: UnlockRequest,
        metadata: CallMetadata,
        respond_to: Response<UnlockResponse>,
    },
    InvokeActor {
        request: InvokeActorRequest,
        metadata: CallMetadata,
        respond_to: Response<InvokeActorResponse>,
    },
    GetWorkflow {
        request: GetWorkflowRequest,
        metadata: CallMetadata,
        respond_to: Response<GetWorkflowResponse>,
    },
}

impl SidecarRequest {
    /// Name of the remote procedure, as used in logs.
    pub fn procedure(&self) -> &'static str {
        match self {
            SidecarRequest::BulkPublish { .. } => "BulkPublishEventAlpha1",
            SidecarRequest::TryLock { .. } => "TryLockAlpha1",
            SidecarRequest::Unlock { .. } => "UnlockAlpha1",
            SidecarRequest::InvokeActor { .. } => "InvokeActor",
            SidecarRequest::GetWorkflow { .. } => "GetWorkflowBeta1",
        }
    }

    pub fn metadata(&self) -> &CallMetadata {
        match self {
            SidecarRequest::BulkPublish { metadata, .. }
            | SidecarRequest::TryLock { metadata, .. }
            | SidecarRequest::Unlock { metadata, .. }
            | SidecarRequest::InvokeActor { metadata, .. }
            | SidecarRequest::GetWorkflow { metadata, .. } => metadata,
        }
    }
}
