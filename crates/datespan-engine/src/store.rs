//! Key-value storage the result log persists into.
//!
//! The engine only needs string keys mapped to string values, the shape
//! of a browser's `localStorage`. Front ends supply the backing store.

use std::collections::HashMap;

use crate::error::Result;

/// A string-to-string store scoped to one user profile.
pub trait KeyValueStore {
    /// Read the value at `key`, `None` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value at `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-process store, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("results").unwrap(), None);
        store.set("results", "[]").unwrap();
        assert_eq!(store.get("results").unwrap().as_deref(), Some("[]"));
        store.set("results", "[\"a\"]").unwrap();
        assert_eq!(store.get("results").unwrap().as_deref(), Some("[\"a\"]"));
    }

    #[test]
    fn test_mut_ref_delegates() {
        fn write<S: KeyValueStore>(mut store: S) {
            store.set("k", "v").unwrap();
        }

        let mut store = MemoryStore::new();
        write(&mut store);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
