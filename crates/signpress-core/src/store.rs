//! The key-value storage seam the persistence codec writes through.
//!
//! Values are text payloads and can be large: a base64-encoded source PDF
//! runs to tens of megabytes. Backends must not assume small values.

use std::collections::HashMap;

use crate::error::StoreError;

/// Abstract put/get storage. A missing key is `Ok(None)`, never an error.
pub trait KeyValueStore {
    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// In-memory store, the default session backend and the one tests use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }
}
