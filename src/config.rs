//! # Client Configuration
//!
//! Settings shared by every call a [`DaprClient`](crate::DaprClient) makes.
//! They can be built in code, deserialized from a config file, or read from
//! the environment variables the sidecar injector sets.

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Metadata key carrying the API token on every outbound call.
pub const API_TOKEN_METADATA_KEY: &str = "dapr-api-token";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Sent as `dapr-api-token` when set.
    pub api_token: Option<String>,
    /// Capacity of the request channel towards the sidecar.
    pub channel_buffer: usize,
    /// Upper bound for a single sidecar call. `None` waits indefinitely.
    pub call_timeout_ms: Option<u64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_token: None,
            channel_buffer: 32,
            call_timeout_ms: None,
        }
    }
}

impl ClientOptions {
    /// Reads `DAPR_API_TOKEN` and `DAPR_API_TIMEOUT_MS`. Blank or malformed
    /// values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_token: non_empty("DAPR_API_TOKEN"),
            call_timeout_ms: non_empty("DAPR_API_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()),
            ..Self::default()
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}
