//! # Distributed Lock
//!
//! Thin typed wrappers over the sidecar's lock API. A lock is identified by
//! store, resource and owner; only the owner that acquired it can release it.

use crate::error::{ensure_not_empty, DaprError};
use crate::proto::{TryLockRequest, UnlockRequest};
use crate::DaprClient;
use tracing::{debug, instrument};

const TRY_LOCK: &str = "try lock";
const UNLOCK: &str = "unlock";

/// Outcome of an unlock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockStatus {
    Success,
    LockDoesNotExist,
    LockBelongsToOthers,
    InternalError,
}

impl TryFrom<i32> for LockStatus {
    type Error = DaprError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LockStatus::Success),
            1 => Ok(LockStatus::LockDoesNotExist),
            2 => Ok(LockStatus::LockBelongsToOthers),
            3 => Ok(LockStatus::InternalError),
            other => Err(DaprError::ProtocolViolation {
                operation: UNLOCK,
                detail: format!("unknown lock status {other}"),
            }),
        }
    }
}

/// Answer to an unlock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockResponse {
    pub status: LockStatus,
}

/// Answer to a lock request.
///
/// Keeps the identity of the request so a granted lock can be released
/// without repeating it.
#[derive(Debug, Clone)]
pub struct LockResponse {
    pub success: bool,
    pub store_name: String,
    pub resource_id: String,
    pub lock_owner: String,
    client: DaprClient,
}

impl LockResponse {
    /// Releases the lock this response refers to.
    pub async fn unlock(&self) -> Result<UnlockResponse, DaprError> {
        self.client
            .unlock(&self.store_name, &self.resource_id, &self.lock_owner)
            .await
    }
}

impl DaprClient {
    /// Tries to acquire a lock on `resource_id` for `lock_owner`.
    ///
    /// `success` is `false` when someone else holds the lock; that is not an
    /// error.
    #[instrument(skip(self))]
    pub async fn try_lock(
        &self,
        store_name: &str,
        resource_id: &str,
        lock_owner: &str,
        expiry_in_seconds: i32,
    ) -> Result<LockResponse, DaprError> {
        ensure_not_empty("store_name", store_name)?;
        ensure_not_empty("resource_id", resource_id)?;
        ensure_not_empty("lock_owner", lock_owner)?;
        if expiry_in_seconds <= 0 {
            return Err(DaprError::invalid_argument(
                "expiry_in_seconds",
                "must be greater than zero",
            ));
        }

        let request = TryLockRequest {
            store_name: store_name.to_string(),
            resource_id: resource_id.to_string(),
            lock_owner: lock_owner.to_string(),
            expiry_in_seconds,
        };
        let response = self
            .call(
                TRY_LOCK,
                None,
                self.channel().try_lock(request, self.call_metadata()),
            )
            .await?;
        debug!(success = response.success, "Lock answered");

        Ok(LockResponse {
            success: response.success,
            store_name: store_name.to_string(),
            resource_id: resource_id.to_string(),
            lock_owner: lock_owner.to_string(),
            client: self.clone(),
        })
    }

    /// Releases a lock held by `lock_owner`.
    #[instrument(skip(self))]
    pub async fn unlock(
        &self,
        store_name: &str,
        resource_id: &str,
        lock_owner: &str,
    ) -> Result<UnlockResponse, DaprError> {
        ensure_not_empty("store_name", store_name)?;
        ensure_not_empty("resource_id", resource_id)?;
        ensure_not_empty("lock_owner", lock_owner)?;

        let request = UnlockRequest {
            store_name: store_name.to_string(),
            resource_id: resource_id.to_string(),
            lock_owner: lock_owner.to_string(),
        };
        let response = self
            .call(UNLOCK, None, self.channel().unlock(request, self.call_metadata()))
            .await?;
        let status = LockStatus::try_from(response.status)?;
        debug!(?status, "Unlock answered");
        Ok(UnlockResponse { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto;
    use crate::transport::mock::{create_mock_sidecar, expect_try_lock, expect_unlock, MockSidecar};

    #[tokio::test]
    async fn test_try_lock_sends_identity_and_unlock_reuses_it() {
        let (channel, mut receiver) = create_mock_sidecar(10);
        let client = DaprClient::new(channel);

        let call = tokio::spawn(async move {
            let lock = client.try_lock("redis", "resource", "owner", 1000).await?;
            let unlocked = lock.unlock().await?;
            Ok::<_, DaprError>((lock.success, unlocked.status))
        });

        let (request, _, respond_to) = expect_try_lock(&mut receiver).await.unwrap();
        assert_eq!(request.store_name, "redis");
        assert_eq!(request.resource_id, "resource");
        assert_eq!(request.lock_owner, "owner");
        assert_eq!(request.expiry_in_seconds, 1000);
        respond_to.send(Ok(proto::TryLockResponse { success: true })).unwrap();

        let (request, _, respond_to) = expect_unlock(&mut receiver).await.unwrap();
        assert_eq!(request.resource_id, "resource");
        assert_eq!(request.lock_owner, "owner");
        respond_to.send(Ok(proto::UnlockResponse { status: 0 })).unwrap();

        let (success, status) = call.await.unwrap().unwrap();
        assert!(success);
        assert_eq!(status, LockStatus::Success);
    }

    #[tokio::test]
    async fn test_unlock_status_mapping() {
        let mut mock = MockSidecar::new();
        mock.expect_unlock().return_ok(proto::UnlockResponse { status: 2 });
        mock.expect_unlock().return_ok(proto::UnlockResponse { status: 9 });

        let client = DaprClient::new(mock.channel());
        let answer = client.unlock("redis", "resource", "owner").await.unwrap();
        assert_eq!(answer.status, LockStatus::LockBelongsToOthers);

        let err = client.unlock("redis", "resource", "owner").await.unwrap_err();
        assert!(matches!(err, DaprError::ProtocolViolation { .. }));
        mock.verify();
    }

    #[tokio::test]
    async fn test_arguments_are_validated_before_sending() {
        let mock = MockSidecar::new();
        let client = DaprClient::new(mock.channel());

        let err = client.try_lock("redis", "resource", "owner", 0).await.unwrap_err();
        assert!(matches!(
            err,
            DaprError::InvalidArgument { name: "expiry_in_seconds", .. }
        ));
        let err = client.unlock("redis", "", "owner").await.unwrap_err();
        assert!(matches!(err, DaprError::InvalidArgument { name: "resource_id", .. }));

        assert!(mock.received().is_empty());
        mock.verify();
    }
}
