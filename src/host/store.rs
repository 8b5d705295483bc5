//! Scoped key/value storage interface.

use std::collections::HashMap;
use std::sync::Mutex;

/// Host-provided key/value store. Used by the resolver's session token
/// cache; values are opaque strings.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, or `None` when the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: String);
}

/// In-process store for the CLI host and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }
}
