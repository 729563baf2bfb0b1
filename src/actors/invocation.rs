//! Actor method invocation in both directions.
//!
//! Outbound, an [`ActorProxy`] serializes the call, attaches the current call
//! context token under [`REENTRANCY_HEADER`], and decodes the answer. Inbound,
//! [`dispatch`] runs an actor method inside a call context scope seeded from
//! the same header, so the token is present for exactly as long as the method
//! runs.

use crate::actors::call_context;
use crate::error::{ensure_not_empty, DaprError};
use crate::proto::InvokeActorRequest;
use crate::DaprClient;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Header carrying the call context token between actor hops.
pub const REENTRANCY_HEADER: &str = "Dapr-Reentrancy-Id";

const OPERATION: &str = "invoke actor";

/// Addresses one actor instance through the sidecar.
#[derive(Clone, Debug)]
pub struct ActorProxy {
    client: DaprClient,
    actor_type: String,
    actor_id: String,
}

impl DaprClient {
    /// Returns a proxy for the actor `actor_type`/`actor_id`.
    pub fn actor_proxy(
        &self,
        actor_type: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Result<ActorProxy, DaprError> {
        let actor_type = actor_type.into();
        let actor_id = actor_id.into();
        ensure_not_empty("actor_type", &actor_type)?;
        ensure_not_empty("actor_id", &actor_id)?;
        Ok(ActorProxy {
            client: self.clone(),
            actor_type,
            actor_id,
        })
    }
}

impl ActorProxy {
    pub fn actor_type(&self) -> &str {
        &self.actor_type
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Invokes `method` with a JSON body and decodes the JSON answer.
    ///
    /// An empty answer decodes as JSON `null`, so methods that may return
    /// nothing should use an `Option<_>` response type.
    pub async fn invoke_method<Req, Resp>(
        &self,
        method: &str,
        data: &Req,
        cancel: &CancellationToken,
    ) -> Result<Resp, DaprError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = Bytes::from(serde_json::to_vec(data)?);
        let answer = self.invoke_raw(method, body, cancel).await?;
        decode_answer(&answer)
    }

    /// Invokes a method that takes no arguments and returns nothing.
    pub async fn invoke_method_no_response(
        &self,
        method: &str,
        cancel: &CancellationToken,
    ) -> Result<(), DaprError> {
        self.invoke_raw(method, Bytes::new(), cancel).await.map(drop)
    }

    /// Invokes `method` with an opaque body and returns the opaque answer.
    #[instrument(
        skip(self, data, cancel),
        fields(actor_type = %self.actor_type, actor_id = %self.actor_id)
    )]
    pub async fn invoke_raw(
        &self,
        method: &str,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> Result<Bytes, DaprError> {
        ensure_not_empty("method", method)?;

        let mut metadata = HashMap::new();
        let reentrancy_id = call_context::try_get();
        if let Some(token) = &reentrancy_id {
            metadata.insert(REENTRANCY_HEADER.to_string(), token.clone());
        }
        debug!(reentrancy_id = ?reentrancy_id, bytes = data.len(), "Sending request");

        let request = InvokeActorRequest {
            actor_type: self.actor_type.clone(),
            actor_id: self.actor_id.clone(),
            method: method.to_string(),
            data,
            metadata,
        };
        let response = self
            .client
            .call(
                OPERATION,
                Some(cancel),
                self.client
                    .channel()
                    .invoke_actor(request, self.client.call_metadata()),
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Actor invocation failed"))?;
        Ok(response.data)
    }
}

fn decode_answer<Resp: DeserializeOwned>(answer: &[u8]) -> Result<Resp, DaprError> {
    if answer.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(answer)?)
}

/// Reads the call context token from inbound headers. Header names are
/// matched case-insensitively.
pub fn reentrancy_id(headers: &HashMap<String, String>) -> Option<&str> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(REENTRANCY_HEADER))
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// Runs an inbound actor method with the call context taken from `headers`.
///
/// The handler's flow starts with the caller's token (or none) and the token
/// is gone again once the handler completes, whatever the handler did to it
/// in between.
pub async fn dispatch<F, Fut>(headers: &HashMap<String, String>, handler: F) -> Fut::Output
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    let token = reentrancy_id(headers).map(str::to_string);
    debug!(reentrancy_id = ?token, "Dispatching actor method");
    call_context::scope(token, async move { handler().await }).await
}
