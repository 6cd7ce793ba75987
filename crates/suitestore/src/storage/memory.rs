//! In-memory substrate.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::trace;

use super::{check_quota, KeyValueStore, DEFAULT_MAX_VALUE_BYTES};
use crate::error::{Error, Result};

/// `BTreeMap`-backed substrate. Clones share the same map.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    max_value_bytes: Option<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with the default quota.
    #[must_use]
    pub fn new() -> Self {
        Self::with_quota(Some(DEFAULT_MAX_VALUE_BYTES))
    }

    /// Create an empty store with a custom per-value quota (`None` = unlimited).
    #[must_use]
    pub fn with_quota(max_value_bytes: Option<usize>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            max_value_bytes,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Error::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        check_quota(key, value, self.max_value_bytes)?;
        let mut entries = self.entries.write().map_err(|_| Error::LockPoisoned)?;
        trace!("memory set {} ({} bytes)", key, value.len());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| Error::LockPoisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| Error::LockPoisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("a", "[1]").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("[1]"));

        store.set("a", "[2]").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("shared", "[]").unwrap();
        assert_eq!(other.get("shared").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_remove_and_keys() {
        let store = MemoryStore::new();
        store.set("b", "[]").unwrap();
        store.set("a", "[]").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_quota_keeps_previous_value() {
        let store = MemoryStore::with_quota(Some(8));
        store.set("k", "[1,2]").unwrap();

        let err = store.set("k", "[1,2,3,4,5]").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_unlimited_quota() {
        let store = MemoryStore::with_quota(None);
        let big = "x".repeat(DEFAULT_MAX_VALUE_BYTES + 1);
        assert!(store.set("big", &big).is_ok());
    }
}
