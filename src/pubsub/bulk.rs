//! # Bulk Publish Reconciliation
//!
//! A bulk publish sends N events in one request and gets back only the ids of
//! the entries that failed. The entry id is the sole link between the two, so
//! it is derived from position: item `i` travels as entry `"i"`. Going back,
//! every reported id is parsed into an index of the caller's slice, which lets
//! the result hand out the caller's own objects instead of wire copies.
//!
//! The response may list failures in any order; each one is correlated by id
//! alone. An id that does not name an entry of the request means the client
//! and the sidecar disagree about the protocol and is reported as
//! [`DaprError::ProtocolViolation`] rather than skipped.

use crate::error::{ensure_not_empty, DaprError};
use crate::proto::{BulkPublishRequest, BulkPublishRequestEntry, BulkPublishResponse};
use crate::pubsub::payload::EncodedEvent;
use std::collections::HashMap;

pub(crate) const OPERATION: &str = "bulk publish";

/// An event the sidecar could not publish, paired with the caller's original item.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkPublishFailedEntry<'a, T> {
    pub entry_id: String,
    /// Position of `event` in the published slice.
    pub index: usize,
    pub event: &'a T,
    pub error_message: String,
}

/// Outcome of a bulk publish call that reached the sidecar.
///
/// Entries not listed in `failed_entries` were published.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkPublishResult<'a, T> {
    pub failed_entries: Vec<BulkPublishFailedEntry<'a, T>>,
}

impl<'a, T> BulkPublishResult<'a, T> {
    pub fn is_success(&self) -> bool {
        self.failed_entries.is_empty()
    }

    /// The original items that failed, in the order the sidecar reported them.
    /// Feeding them back into another bulk publish retries exactly that subset.
    pub fn failed_events(&self) -> Vec<&'a T> {
        self.failed_entries.iter().map(|entry| entry.event).collect()
    }
}

/// Builds the wire request, one entry per item, ids `"0".."N-1"` in order.
///
/// Per-entry metadata is always empty. Request metadata defaults to an empty
/// map when absent.
pub(crate) fn build_request<T>(
    pubsub_name: &str,
    topic: &str,
    items: &[T],
    metadata: Option<&HashMap<String, String>>,
    encode: impl Fn(&T) -> Result<EncodedEvent, DaprError>,
) -> Result<BulkPublishRequest, DaprError> {
    ensure_not_empty("pubsub_name", pubsub_name)?;
    ensure_not_empty("topic", topic)?;

    let entries = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let EncodedEvent { content_type, data } = encode(item)?;
            Ok(BulkPublishRequestEntry {
                entry_id: index.to_string(),
                event: data,
                content_type,
                metadata: HashMap::new(),
            })
        })
        .collect::<Result<Vec<_>, DaprError>>()?;

    Ok(BulkPublishRequest {
        pubsub_name: pubsub_name.to_string(),
        topic: topic.to_string(),
        entries,
        metadata: metadata.cloned().unwrap_or_default(),
    })
}

/// Maps the sidecar's failed entry ids back onto `items`.
pub(crate) fn reconcile<'a, T>(
    items: &'a [T],
    response: BulkPublishResponse,
) -> Result<BulkPublishResult<'a, T>, DaprError> {
    let failed_entries = response
        .failed_entries
        .into_iter()
        .map(|failed| {
            let index = entry_index(&failed.entry_id, items.len())?;
            Ok(BulkPublishFailedEntry {
                entry_id: failed.entry_id,
                index,
                event: &items[index],
                error_message: failed.error,
            })
        })
        .collect::<Result<Vec<_>, DaprError>>()?;

    Ok(BulkPublishResult { failed_entries })
}

/// Parses an entry id produced by [`build_request`]. Only the exact decimal
/// rendering of an in-range index is accepted.
fn entry_index(entry_id: &str, len: usize) -> Result<usize, DaprError> {
    entry_id
        .parse::<usize>()
        .ok()
        .filter(|index| *index < len && index.to_string() == entry_id)
        .ok_or_else(|| DaprError::ProtocolViolation {
            operation: OPERATION,
            detail: format!(
                "failed entry id {entry_id:?} does not match any of the {len} published entries"
            ),
        })
}
