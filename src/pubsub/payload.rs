//! Event payloads and their content types.
//!
//! A serializable value is published as JSON. Callers that need a different
//! wire shape per item (raw bytes with their own content type, plain text)
//! publish [`EventPayload`]s instead.

use crate::error::DaprError;
use bytes::Bytes;
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// An event whose wire shape is chosen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Raw bytes, sent as-is. Without a content type they go out as
    /// `application/octet-stream`.
    Bytes {
        data: Bytes,
        content_type: Option<String>,
    },
    /// UTF-8 text sent as `text/plain`, without JSON quoting.
    Text(String),
    /// A structured value sent as `application/json`.
    Json(serde_json::Value),
}

impl EventPayload {
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        EventPayload::Bytes {
            data: data.into(),
            content_type: None,
        }
    }

    pub fn bytes_with_content_type(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        EventPayload::Bytes {
            data: data.into(),
            content_type: Some(content_type.into()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        EventPayload::Text(text.into())
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, DaprError> {
        Ok(EventPayload::Json(serde_json::to_value(value)?))
    }

    pub fn content_type(&self) -> &str {
        match self {
            EventPayload::Bytes {
                content_type: Some(content_type),
                ..
            } => content_type,
            EventPayload::Bytes { .. } => BINARY_CONTENT_TYPE,
            EventPayload::Text(_) => TEXT_CONTENT_TYPE,
            EventPayload::Json(_) => JSON_CONTENT_TYPE,
        }
    }

    pub(crate) fn encode(&self) -> Result<EncodedEvent, DaprError> {
        let data = match self {
            EventPayload::Bytes { data, .. } => data.clone(),
            EventPayload::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            EventPayload::Json(value) => Bytes::from(serde_json::to_vec(value)?),
        };
        Ok(EncodedEvent {
            content_type: self.content_type().to_string(),
            data,
        })
    }
}

/// A single event ready to be placed in a wire entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EncodedEvent {
    pub content_type: String,
    pub data: Bytes,
}

pub(crate) fn encode_json<T: Serialize>(item: &T) -> Result<EncodedEvent, DaprError> {
    Ok(EncodedEvent {
        content_type: JSON_CONTENT_TYPE.to_string(),
        data: Bytes::from(serde_json::to_vec(item)?),
    })
}
