//! Session identifiers
//!
//! IDs use the document-store ObjectId layout: 4 bytes of big-endian Unix
//! seconds followed by 8 random bytes, rendered as 24 lowercase hex chars.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::SessionError;

/// Number of raw bytes in a session ID
pub const ID_LEN: usize = 12;

/// A validated session identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId([u8; ID_LEN]);

impl SessionId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_LEN];
        let secs = chrono::Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..ID_LEN - 4]);
        Self(bytes)
    }

    /// Parse a 24 character hex string
    pub fn parse_str(s: &str) -> Result<Self, SessionError> {
        if s.len() != ID_LEN * 2 {
            return Err(SessionError::InvalidSessionId(s.to_string()));
        }

        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| SessionError::InvalidSessionId(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Wrap raw bytes
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}
