//! Browser `localStorage` backend for the session store.

use crate::error::SessionStoreError;
use crate::session::StorageBackend;

/// Storage backend over `window.localStorage`.
///
/// The storage handle is looked up on every call, so the backend works (as
/// an always-empty store) when no window is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

fn describe(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| "storage rejected write".to_string())
}

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let storage = Self::storage().ok_or(SessionStoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| SessionStoreError::WriteFailed {
                key: key.to_string(),
                reason: describe(&e),
            })
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}
