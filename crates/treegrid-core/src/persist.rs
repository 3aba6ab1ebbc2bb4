//! Persisted UI state.
//!
//! Persistence is keyed by a caller-supplied storage key. Blobs are JSON; a
//! missing key means "use defaults", and a malformed blob is logged and
//! treated the same way.

use crate::error::CoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// String key/value storage for persisted table state.
pub trait StateStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: String);
}

/// In-memory [`StateStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Load and decode a JSON blob; malformed blobs read as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring malformed persisted state under {key}: {err}");
            None
        }
    }
}

/// Encode and store a JSON blob.
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn StateStore,
    key: &str,
    value: &T,
) -> CoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw);
    Ok(())
}
