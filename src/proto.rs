//! # Wire Messages
//!
//! Protobuf messages of the sidecar API (`dapr.proto.runtime.v1`), limited to
//! the procedures this client calls. Field names and tags follow the sidecar
//! contract, so a gRPC bridge can put them on the wire unchanged. Maps default
//! to empty; protobuf does not distinguish an absent map from an empty one.

use bytes::Bytes;
use std::collections::HashMap;

/// One event inside a [`BulkPublishRequest`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct BulkPublishRequestEntry {
    #[prost(string, tag = "1")]
    pub entry_id: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub event: Bytes,
    #[prost(string, tag = "3")]
    pub content_type: String,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BulkPublishRequest {
    #[prost(string, tag = "1")]
    pub pubsub_name: String,
    #[prost(string, tag = "2")]
    pub topic: String,
    #[prost(message, repeated, tag = "3")]
    pub entries: Vec<BulkPublishRequestEntry>,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BulkPublishResponseFailedEntry {
    #[prost(string, tag = "1")]
    pub entry_id: String,
    #[prost(string, tag = "2")]
    pub error: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BulkPublishResponse {
    #[prost(message, repeated, tag = "1")]
    pub failed_entries: Vec<BulkPublishResponseFailedEntry>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TryLockRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub resource_id: String,
    #[prost(string, tag = "3")]
    pub lock_owner: String,
    #[prost(int32, tag = "4")]
    pub expiry_in_seconds: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TryLockResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UnlockRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub resource_id: String,
    #[prost(string, tag = "3")]
    pub lock_owner: String,
}

/// `status` carries the raw wire enum value; see [`LockStatus`](crate::lock::LockStatus).
#[derive(Clone, PartialEq, prost::Message)]
pub struct UnlockResponse {
    #[prost(int32, tag = "1")]
    pub status: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InvokeActorRequest {
    #[prost(string, tag = "1")]
    pub actor_type: String,
    #[prost(string, tag = "2")]
    pub actor_id: String,
    #[prost(string, tag = "3")]
    pub method: String,
    #[prost(bytes = "bytes", tag = "4")]
    pub data: Bytes,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InvokeActorResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetWorkflowRequest {
    #[prost(string, tag = "1")]
    pub instance_id: String,
    #[prost(string, tag = "2")]
    pub workflow_component: String,
}

/// Timestamps of the instance (tags 3 and 4) are not decoded.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GetWorkflowResponse {
    #[prost(string, tag = "1")]
    pub instance_id: String,
    #[prost(string, tag = "2")]
    pub workflow_name: String,
    #[prost(string, tag = "5")]
    pub runtime_status: String,
    #[prost(map = "string, string", tag = "6")]
    pub properties: HashMap<String, String>,
}
