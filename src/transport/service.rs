//! # SidecarService Trait
//!
//! The contract implemented by whatever answers sidecar requests: a bridge to
//! a real gRPC connection, or an in-process stand-in used by tests and demos.
//! A [`SidecarServer`](super::SidecarServer) drives an implementation from the
//! requests arriving on a [`SidecarChannel`](super::SidecarChannel).
//!
//! Only bulk publish and actor invocation are required. The remaining
//! procedures have provided methods that answer `Unimplemented`, the same
//! answer a sidecar gives for an API it does not enable.

use crate::proto::{
    BulkPublishRequest, BulkPublishResponse, GetWorkflowRequest, GetWorkflowResponse,
    InvokeActorRequest, InvokeActorResponse, TryLockRequest, TryLockResponse, UnlockRequest,
    UnlockResponse,
};
use crate::transport::message::CallMetadata;
use crate::transport::Status;
use async_trait::async_trait;

/// Handler for the remote procedures of the sidecar API.
///
/// Methods take `&self` because a server dispatches requests concurrently: an
/// actor invocation may call back into the sidecar before it returns.
#[async_trait]
pub trait SidecarService: Send + Sync + 'static {
    async fn bulk_publish(
        &self,
        request: BulkPublishRequest,
        metadata: &CallMetadata,
    ) -> Result<BulkPublishResponse, Status>;

    async fn invoke_actor(
        &self,
        request: InvokeActorRequest,
        metadata: &CallMetadata,
    ) -> Result<InvokeActorResponse, Status>;

    async fn try_lock(
        &self,
        _request: TryLockRequest,
        _metadata: &CallMetadata,
    ) -> Result<TryLockResponse, Status> {
        Err(Status::unimplemented("TryLockAlpha1"))
    }

    async fn unlock(
        &self,
        _request: UnlockRequest,
        _metadata: &CallMetadata,
    ) -> Result<UnlockResponse, Status> {
        Err(Status::unimplemented("UnlockAlpha1"))
    }

    async fn get_workflow(
        &self,
        _request: GetWorkflowRequest,
        _metadata: &CallMetadata,
    ) -> Result<GetWorkflowResponse, Status> {
        Err(Status::unimplemented("GetWorkflowBeta1"))
    }
}
