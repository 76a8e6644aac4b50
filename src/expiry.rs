//! TTL validation and the automatic-expiry index
//!
//! Expired sessions are removed by the backing store itself once an index on
//! `last_modified` with an expire-after horizon exists. Provisioning happens
//! once, when the store is built.

use std::future::Future;
use std::time::Duration;

use crate::error::SessionError;
use crate::store::SessionCollection;

/// Upper bound on index provisioning and the initial connectivity check
pub const PROVISION_TIMEOUT: Duration = Duration::from_secs(15);

/// Field the expiry index is built on
pub const LAST_MODIFIED_FIELD: &str = "last_modified";

/// Reject TTLs under one second
pub fn validate_ttl(ttl: chrono::Duration) -> Result<(), SessionError> {
    if ttl.num_seconds() <= 0 {
        return Err(SessionError::InvalidTtl(ttl));
    }
    Ok(())
}

/// Description of the automatic-expiry index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlIndex {
    /// Indexed field, ascending
    pub field: &'static str,
    /// Seconds after `last_modified` at which a record is removed
    pub expire_after_secs: u64,
}

impl TtlIndex {
    /// Build the index for a validated TTL
    pub fn from_ttl(ttl: chrono::Duration) -> Result<Self, SessionError> {
        validate_ttl(ttl)?;
        Ok(Self {
            field: LAST_MODIFIED_FIELD,
            expire_after_secs: ttl.num_seconds().unsigned_abs(),
        })
    }

    /// Expire-after horizon as a Duration
    pub fn expire_after(&self) -> Duration {
        Duration::from_secs(self.expire_after_secs)
    }
}

/// Provision the expiry index on `collection`, bounded by [`PROVISION_TIMEOUT`].
///
/// Creating an index that already exists with the same definition is a no-op
/// on the store side.
pub async fn ensure_ttl_index<C>(collection: &C, ttl: chrono::Duration) -> Result<TtlIndex, SessionError>
where
    C: SessionCollection + ?Sized,
{
    let index = TtlIndex::from_ttl(ttl)?;
    bounded(
        "ensure_ttl_index",
        PROVISION_TIMEOUT,
        collection.ensure_ttl_index(&index),
    )
    .await?;
    Ok(index)
}

/// Run a store operation under a deadline.
///
/// On expiry the operation's future is dropped, which cancels it before any
/// further write is issued.
pub(crate) async fn bounded<T, F>(operation: &'static str, timeout: Duration, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::Timeout { operation, timeout }),
    }
}
