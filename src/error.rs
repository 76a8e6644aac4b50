//! Session error types

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configured TTL is zero or negative
    #[error("ttl cannot be 0 or fewer seconds; supplied ttl: {}", .0.num_seconds())]
    InvalidTtl(chrono::Duration),

    /// The backing store could not be reached
    #[error("Session store connection failed: {0}")]
    Connection(String),

    /// Invalid session ID format
    #[error("Invalid session ID: {0}")]
    InvalidSessionId(String),

    /// Token encoding or verification failed
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Session not found
    #[error("Session not found")]
    NotFound,

    /// Error from the session store
    #[error("Session store error: {0}")]
    Store(String),

    /// A store operation did not complete in time
    #[error("Session store operation `{operation}` timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// MongoDB error (when mongodb-store feature is enabled)
    #[cfg(feature = "mongodb-store")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

impl SessionError {
    /// Whether this error came from invalid store configuration.
    ///
    /// Configuration errors are the only construction failures a caller can
    /// fix by retrying with different options.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SessionError::InvalidTtl(_))
    }

    /// Whether the requested session does not exist in the store
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::NotFound)
    }
}

/// Errors raised by the codec adapter.
///
/// Verification failures are deliberately opaque: they never say which
/// configured codec rejected the token.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No configured codec could verify the token
    #[error("session token could not be verified")]
    Unverified,

    /// The payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No configured codec could produce a token
    #[error("session token could not be encoded: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}
