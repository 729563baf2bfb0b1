//! # DaprClient
//!
//! The typed entry point of the crate. The client itself only knows how to
//! attach call metadata, apply cancellation and timeouts, and translate
//! transport faults; each building block adds its operations in its own
//! module (`pubsub`, `lock`, `workflow`, `actors`).

use crate::config::{ClientOptions, API_TOKEN_METADATA_KEY};
use crate::error::DaprError;
use crate::transport::{CallMetadata, SidecarChannel, SidecarServer, SidecarService, Status};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Client for the Dapr sidecar API.
///
/// Cheap to clone: it holds a [`SidecarChannel`] and its options.
#[derive(Clone, Debug)]
pub struct DaprClient {
    channel: SidecarChannel,
    options: ClientOptions,
}

impl DaprClient {
    pub fn new(channel: SidecarChannel) -> Self {
        Self::with_options(channel, ClientOptions::default())
    }

    pub fn with_options(channel: SidecarChannel, options: ClientOptions) -> Self {
        Self { channel, options }
    }

    /// Creates a client wired to an in-process [`SidecarService`].
    ///
    /// The returned server must be spawned for calls to make progress.
    pub fn serve<S: SidecarService>(
        options: ClientOptions,
        service: S,
    ) -> (Self, SidecarServer<S>) {
        let (server, channel) = SidecarServer::new(options.channel_buffer.max(1), service);
        (Self::with_options(channel, options), server)
    }

    pub fn channel(&self) -> &SidecarChannel {
        &self.channel
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Metadata attached to every outbound call.
    pub(crate) fn call_metadata(&self) -> CallMetadata {
        let mut metadata = CallMetadata::new();
        if let Some(token) = &self.options.api_token {
            metadata.insert(API_TOKEN_METADATA_KEY.to_string(), token.clone());
        }
        metadata
    }

    /// Awaits one sidecar call, racing it against `cancel` and the configured
    /// timeout.
    ///
    /// A token that is already cancelled fails before the call future is
    /// polled, so nothing reaches the sidecar. Cancellation surfaces as
    /// [`DaprError::Cancelled`]; every transport fault, including a timeout,
    /// is wrapped once into [`DaprError::Transport`].
    pub(crate) async fn call<T>(
        &self,
        operation: &'static str,
        cancel: Option<&CancellationToken>,
        call: impl Future<Output = Result<T, Status>>,
    ) -> Result<T, DaprError> {
        let timeout = self.options.call_timeout();
        let bounded = async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                    Err(Status::deadline_exceeded(format!(
                        "no response within {}ms",
                        limit.as_millis()
                    )))
                }),
                None => call.await,
            }
        };

        let outcome = match cancel {
            Some(token) if token.is_cancelled() => {
                debug!(operation, "Cancelled before sending");
                return Err(DaprError::Cancelled);
            }
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(operation, "Cancelled while awaiting the sidecar");
                        return Err(DaprError::Cancelled);
                    }
                    outcome = bounded => outcome,
                }
            }
            None => bounded.await,
        };
        outcome.map_err(DaprError::transport(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::create_mock_sidecar;
    use crate::transport::Code;
    use std::time::Duration;

    #[tokio::test]
    async fn test_api_token_is_attached() {
        let (channel, _receiver) = create_mock_sidecar(1);
        let client =
            DaprClient::with_options(channel, ClientOptions::default().with_api_token("t0k"));
        let metadata = client.call_metadata();
        assert_eq!(metadata.get(API_TOKEN_METADATA_KEY).map(String::as_str), Some("t0k"));

        let (channel, _receiver) = create_mock_sidecar(1);
        assert!(DaprClient::new(channel).call_metadata().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_fault() {
        let (channel, _receiver) = create_mock_sidecar(1);
        let client = DaprClient::with_options(
            channel,
            ClientOptions::default().with_call_timeout(Duration::from_millis(10)),
        );

        let err = client
            .call("ping", None, std::future::pending::<Result<(), Status>>())
            .await
            .unwrap_err();
        assert_eq!(err.status().map(Status::code), Some(Code::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_cancellation_while_waiting() {
        let (channel, _receiver) = create_mock_sidecar(1);
        let client = DaprClient::new(channel);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = client
            .call("ping", Some(&cancel), std::future::pending::<Result<(), Status>>())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
