//! Publish/subscribe: bulk publishing with per-entry failure reporting.

mod bulk;
mod payload;

pub use bulk::{BulkPublishFailedEntry, BulkPublishResult};
pub use payload::{EventPayload, BINARY_CONTENT_TYPE, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};

use crate::error::DaprError;
use crate::DaprClient;
use bulk::{build_request, reconcile, OPERATION};
use payload::{encode_json, EncodedEvent};
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

impl DaprClient {
    /// Publishes `items` to `topic` as JSON events in a single request.
    ///
    /// Entry `i` of the request carries `items[i]`. The result lists the
    /// items the sidecar rejected, each with its error message; an empty
    /// list means everything was published.
    ///
    /// # Errors
    ///
    /// - [`DaprError::InvalidArgument`] for a blank pubsub name or topic.
    /// - [`DaprError::Cancelled`] when `cancel` fires first.
    /// - [`DaprError::Transport`] when the sidecar call fails.
    /// - [`DaprError::ProtocolViolation`] when a failure names an unknown entry.
    #[instrument(skip(self, items, metadata, cancel), fields(count = items.len()))]
    pub async fn bulk_publish_event<'a, T: Serialize>(
        &self,
        pubsub_name: &str,
        topic: &str,
        items: &'a [T],
        metadata: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> Result<BulkPublishResult<'a, T>, DaprError> {
        self.bulk_publish_with(pubsub_name, topic, items, metadata, cancel, encode_json)
            .await
    }

    /// Like [`bulk_publish_event`](Self::bulk_publish_event), with the content
    /// type chosen per item by its [`EventPayload`] variant.
    #[instrument(skip(self, items, metadata, cancel), fields(count = items.len()))]
    pub async fn bulk_publish_payloads<'a>(
        &self,
        pubsub_name: &str,
        topic: &str,
        items: &'a [EventPayload],
        metadata: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> Result<BulkPublishResult<'a, EventPayload>, DaprError> {
        self.bulk_publish_with(pubsub_name, topic, items, metadata, cancel, EventPayload::encode)
            .await
    }

    async fn bulk_publish_with<'a, T>(
        &self,
        pubsub_name: &str,
        topic: &str,
        items: &'a [T],
        metadata: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
        encode: impl Fn(&T) -> Result<EncodedEvent, DaprError>,
    ) -> Result<BulkPublishResult<'a, T>, DaprError> {
        let request = build_request(pubsub_name, topic, items, metadata, encode)?;
        debug!(entries = request.entries.len(), metadata = ?request.metadata, "Sending request");

        let response = self
            .call(
                OPERATION,
                Some(cancel),
                self.channel().bulk_publish(request, self.call_metadata()),
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Bulk publish failed"))?;

        let result = reconcile(items, response)?;
        if result.is_success() {
            info!("Published");
        } else {
            warn!(
                failed = result.failed_entries.len(),
                "Some entries were not published"
            );
        }
        Ok(result)
    }
}
