//! Store and cookie configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SessionError;
use crate::expiry;

/// Default bound on a single collection operation made on behalf of a request
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the session store
#[derive(Clone, Debug, PartialEq)]
pub struct StoreOptions {
    /// How long an unrefreshed session lives in the store.
    /// Must be at least one second.
    pub ttl: chrono::Duration,

    /// Whether to provision the automatic-expiry index on `last_modified`
    /// when the store is created (default: true)
    pub ensure_ttl_index: bool,

    /// Whether the store emits log lines (default: true).
    /// When false, every log call goes to a no-op sink.
    pub enable_logging: bool,

    /// Upper bound for each find/upsert/delete call (default: 10 seconds)
    pub operation_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::days(1),
            ensure_ttl_index: true,
            enable_logging: true,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl StoreOptions {
    /// Create store options with the given TTL
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            ttl,
            ..Default::default()
        }
    }

    /// Set the TTL in seconds
    pub fn with_ttl_secs(mut self, secs: i64) -> Self {
        self.ttl = chrono::Duration::seconds(secs);
        self
    }

    /// Set whether to provision the TTL index (default: true)
    pub fn with_ensure_ttl_index(mut self, ensure: bool) -> Self {
        self.ensure_ttl_index = ensure;
        self
    }

    /// Set whether logging is enabled (default: true)
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Set the per-operation timeout (default: 10 seconds)
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Check the options are usable
    pub fn validate(&self) -> Result<(), SessionError> {
        expiry::validate_ttl(self.ttl)
    }
}

/// SameSite cookie attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    /// Strict - cookie only sent for same-site requests
    Strict,
    /// Lax - cookie sent for same-site requests and top-level navigations
    Lax,
    /// None - cookie sent for all requests (requires Secure)
    None,
}

/// Cookie attributes attached to a session.
///
/// `max_age` doubles as the session's lifetime switch: a value of zero or
/// less asks the store to delete the session on the next save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    /// Cookie path
    pub path: String,

    /// Cookie domain (None - current domain only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Max age in seconds
    pub max_age: i64,

    /// Secure flag
    #[serde(default)]
    pub secure: bool,

    /// HttpOnly flag
    #[serde(default)]
    pub http_only: bool,

    /// SameSite attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

impl CookieOptions {
    /// Create cookie options with a path and max age in seconds.
    /// The cookie is HttpOnly by default.
    pub fn new<S: Into<String>>(path: S, max_age: i64) -> Self {
        Self {
            path: path.into(),
            domain: None,
            max_age,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }

    /// Options used when the store is created without explicit cookie options:
    /// root path, max age equal to the TTL.
    pub fn from_ttl(ttl: chrono::Duration) -> Self {
        Self::new("/", ttl.num_seconds())
    }

    /// Set the cookie path
    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain
    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set max age in seconds
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the Secure flag
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the HttpOnly flag
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the SameSite attribute
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}
