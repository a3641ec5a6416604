//! Key/value storage capability.
//!
//! Browser-hosted consoles lean on browser-local storage as an ambient
//! global. Here persistence is an injected capability: hosts hand the flows
//! whatever [`KeyValueStore`] fits their environment (browser storage, a
//! config file, a database row), and the flows stay oblivious to where the
//! bytes live. [`MemoryStore`] is provided for tests and for hosts that do
//! not need persistence across restarts.

use std::sync::Arc;

use dashmap::DashMap;

/// A string key/value store with no expiry semantics.
///
/// Implementations must tolerate concurrent access; the flows only require
/// that a completed `set` is visible to subsequent `get` calls.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }
}

/// An in-memory [`KeyValueStore`] backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }
}
