//! # Client Errors
//!
//! Every public client operation returns [`DaprError`]. The set of variants is
//! closed: callers can match exhaustively and decide which ones are worth a
//! retry (none of them are retried inside this crate).
//!
//! Per-entry failures of a bulk publish are **not** errors. They are part of a
//! successful [`BulkPublishResult`](crate::pubsub::BulkPublishResult).

use crate::transport::Status;

/// Errors returned by the Dapr client.
#[derive(Debug, thiserror::Error)]
pub enum DaprError {
    /// A caller supplied argument was rejected before any network activity.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The caller cancelled the operation before a response arrived.
    #[error("operation was cancelled")]
    Cancelled,

    /// The sidecar connection reported a fault. The original status is kept
    /// as the error source.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Status,
    },

    /// The sidecar answered with something the request cannot account for,
    /// e.g. a failed entry id that was never sent.
    #[error("protocol violation in {operation}: {detail}")]
    ProtocolViolation {
        operation: &'static str,
        detail: String,
    },

    /// A payload could not be encoded or decoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DaprError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        DaprError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(operation: &'static str) -> impl FnOnce(Status) -> Self {
        move |source| DaprError::Transport { operation, source }
    }

    /// Returns the wrapped transport status, if this error came from the boundary.
    pub fn status(&self) -> Option<&Status> {
        match self {
            DaprError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DaprError::Cancelled)
    }
}

/// Rejects empty (or whitespace-only) string arguments.
pub(crate) fn ensure_not_empty(name: &'static str, value: &str) -> Result<(), DaprError> {
    if value.trim().is_empty() {
        return Err(DaprError::invalid_argument(name, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Code;
    use std::error::Error;

    #[test]
    fn test_transport_error_keeps_status_as_source() {
        let err = DaprError::transport("bulk publish")(Status::internal("not gonna work"));
        let source = err.source().expect("source");
        let status = source.downcast_ref::<Status>().expect("status source");
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "not gonna work");
        assert_eq!(err.status().map(Status::code), Some(Code::Internal));
        assert!(err.to_string().starts_with("bulk publish failed: "));
    }

    #[test]
    fn test_ensure_not_empty() {
        assert!(ensure_not_empty("topic", "orders").is_ok());
        assert!(matches!(
            ensure_not_empty("topic", "  "),
            Err(DaprError::InvalidArgument { name: "topic", .. })
        ));
    }
}
