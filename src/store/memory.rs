//! In-memory session collection
//!
//! This is primarily for development and testing.
//! For production, use MongoCollection or another persistent collection.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::SessionCollection;
use crate::error::SessionError;
use crate::expiry::TtlIndex;
use crate::id::SessionId;
use crate::record::SessionRecord;

#[derive(Default)]
struct Inner {
    records: HashMap<SessionId, SessionRecord>,
    ttl_index: Option<TtlIndex>,
}

/// In-memory session collection
///
/// Once a TTL index is provisioned, records older than its horizon are
/// invisible to reads and dropped by [`MemoryCollection::purge_expired`],
/// mirroring a database's background expiry sweep.
///
/// Warning: This collection is not suitable for production use because:
/// - Sessions are lost on server restart
/// - Sessions are not shared across multiple server instances
/// - Memory usage grows with number of sessions
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryCollection {
    /// Create a new memory collection
    pub fn new() -> Self {
        Self::default()
    }

    /// The provisioned TTL index, if any
    pub fn ttl_index(&self) -> Option<TtlIndex> {
        self.inner.read().ttl_index.clone()
    }

    /// Remove expired records, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.inner.write();
        let Some(ttl) = inner.ttl_index.as_ref().map(expire_after) else {
            return 0;
        };

        let now = Utc::now();
        let before = inner.records.len();
        inner.records.retain(|_, record| !record.is_expired_at(ttl, now));
        before - inner.records.len()
    }

    /// Number of stored records, expired or not
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Check if the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

fn expire_after(index: &TtlIndex) -> chrono::Duration {
    chrono::Duration::seconds(index.expire_after_secs as i64)
}

#[async_trait]
impl SessionCollection for MemoryCollection {
    async fn ping(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn ensure_ttl_index(&self, index: &TtlIndex) -> Result<(), SessionError> {
        self.inner.write().ttl_index = Some(index.clone());
        Ok(())
    }

    async fn find_one(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        let inner = self.inner.read();
        let Some(record) = inner.records.get(id) else {
            return Ok(None);
        };

        if let Some(index) = &inner.ttl_index {
            if record.is_expired_at(expire_after(index), Utc::now()) {
                return Ok(None);
            }
        }
        Ok(Some(record.clone()))
    }

    async fn upsert_one(&self, record: &SessionRecord) -> Result<(), SessionError> {
        self.inner.write().records.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_one(&self, id: &SessionId) -> Result<bool, SessionError> {
        Ok(self.inner.write().records.remove(id).is_some())
    }
}
