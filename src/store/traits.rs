//! Backing collection trait

use async_trait::async_trait;

use crate::error::SessionError;
use crate::expiry::TtlIndex;
use crate::id::SessionId;
use crate::record::SessionRecord;

/// A document collection holding one record per session.
///
/// Every method touches at most one document, so implementations only need
/// single-document atomicity from their database.
#[async_trait]
pub trait SessionCollection: Send + Sync + 'static {
    /// Check the database is reachable
    async fn ping(&self) -> Result<(), SessionError>;

    /// Create the automatic-expiry index. Must be idempotent.
    async fn ensure_ttl_index(&self, index: &TtlIndex) -> Result<(), SessionError>;

    /// Get a record by ID
    ///
    /// Returns None if the record doesn't exist
    async fn find_one(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError>;

    /// Insert or replace the record with `record.id`
    async fn upsert_one(&self, record: &SessionRecord) -> Result<(), SessionError>;

    /// Delete a record by ID
    ///
    /// Returns whether a record was removed
    async fn delete_one(&self, id: &SessionId) -> Result<bool, SessionError>;
}
