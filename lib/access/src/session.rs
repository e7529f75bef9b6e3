//! Client-local session record and its store.
//!
//! The session record is the client's cached belief about who is logged in.
//! It is unsigned and never expires locally, so it only gates views; every
//! privileged call is still authorized server-side.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::error::SessionStoreError;

/// Storage key holding the serialized session record.
pub const SESSION_KEY: &str = "user";

/// Cached "who is logged in" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub is_logged_in: bool,
    /// Onboarding marker: whether the account already has event data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_data: Option<bool>,
}

impl SessionRecord {
    /// Creates a logged-in record.
    #[must_use]
    pub fn logged_in(email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            email: email.into(),
            display_name,
            is_logged_in: true,
            has_data: None,
        }
    }

    #[must_use]
    pub fn with_has_data(mut self, has_data: bool) -> Self {
        self.has_data = Some(has_data);
        self
    }
}

/// Key/value string storage, shaped like the browser Web Storage API.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStoreError>;

    fn remove_item(&self, key: &str);
}

/// In-process storage backend.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let mut items = self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.remove(key);
    }
}

/// Loads, saves and clears the session record.
#[derive(Debug, Clone)]
pub struct SessionStore<B> {
    backend: B,
}

impl<B: StorageBackend> SessionStore<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Writes the record under [`SESSION_KEY`].
    pub fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let json = serde_json::to_string(record).map_err(|e| SessionStoreError::Serialize {
            reason: e.to_string(),
        })?;
        self.backend.set_item(SESSION_KEY, &json)
    }

    /// Reads the record. Absent or malformed content yields `None`.
    #[must_use]
    pub fn load(&self) -> Option<SessionRecord> {
        let raw = self.backend.get_item(SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "ignoring malformed session record");
                None
            }
        }
    }

    /// Removes the record.
    pub fn clear(&self) {
        self.backend.remove_item(SESSION_KEY);
    }

    /// UX gate: true if a logged-in record is present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.load().is_some_and(|record| record.is_logged_in)
    }

    /// Reads an auxiliary onboarding flag. Anything but `"true"` is false.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.backend.get_item(name).as_deref() == Some("true")
    }

    /// Writes an auxiliary onboarding flag.
    pub fn set_flag(&self, name: &str, value: bool) -> Result<(), SessionStoreError> {
        self.backend
            .set_item(name, if value { "true" } else { "false" })
    }
}
