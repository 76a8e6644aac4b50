//! Per-request session facade

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::config::CookieOptions;

/// Session values as stored (encoded) in the backing collection
pub type SessionValues = HashMap<String, Value>;

/// The in-memory view of a session handed to application code.
///
/// A `Session` belongs to a single request. Only its encoded values are ever
/// persisted; the ID travels to the client inside the cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) values: SessionValues,
    pub(crate) options: CookieOptions,
    pub(crate) is_new: bool,
}

impl Session {
    /// Create an empty, new session under `name`
    pub fn new<S: Into<String>>(name: S, options: CookieOptions) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            values: HashMap::new(),
            options,
            is_new: true,
        }
    }

    /// Get the session ID (empty until one is assigned)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the session ID.
    ///
    /// The ID is validated when the session is saved.
    pub fn set_id<S: Into<String>>(&mut self, id: S) {
        self.id = id.into();
    }

    /// Get the session (cookie) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this session has not been persisted yet
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Cookie options for this session
    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    /// Mutable cookie options for this session
    pub fn options_mut(&mut self) -> &mut CookieOptions {
        &mut self.options
    }

    /// All session values
    pub fn values(&self) -> &SessionValues {
        &self.values
    }

    /// Mutable access to all session values
    pub fn values_mut(&mut self) -> &mut SessionValues {
        &mut self.values
    }

    /// Get a value from the session
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the session.
    ///
    /// Values that cannot be represented as JSON are ignored.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.values.insert(key.to_string(), v);
        }
    }

    /// Remove a value from the session
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Check if a key exists in the session
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Clear all session values
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Check if the session holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ask the store to delete this session on the next save
    pub fn expire(&mut self) {
        self.options.max_age = -1;
    }
}
