//! Durable session record

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::codec::{encode_multi, Codec};
use crate::error::SessionError;
use crate::id::SessionId;
use crate::session::Session;

/// One stored session: `{_id, data, last_modified}`.
///
/// `data` is the codec-encoded values map and is never interpreted by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub data: String,
    pub last_modified: DateTime<Utc>,
}

impl SessionRecord {
    /// Translate a facade into a record, encoding its values under the
    /// session's name. Fails on a malformed ID before anything is encoded.
    pub fn from_session(session: &Session, codecs: &[Arc<dyn Codec>]) -> Result<Self, SessionError> {
        let id = SessionId::parse_str(session.id())?;
        let data = encode_multi(session.name(), session.values(), codecs)?;

        Ok(Self {
            id,
            data,
            last_modified: Utc::now(),
        })
    }

    /// Whether the record outlived `ttl` as of `now`
    pub fn is_expired_at(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.last_modified + ttl <= now
    }
}
