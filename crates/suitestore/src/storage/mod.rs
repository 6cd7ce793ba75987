//! Persistence substrate for suitestore.
//!
//! Collections are persisted as JSON text under string keys. The substrate
//! only knows about keys and strings; all record semantics live in
//! [`crate::store`]. Two backends are provided: [`MemoryStore`] for tests and
//! ephemeral use, and [`SqliteStore`] for durable storage.

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StorageStats};

use crate::error::{Error, Result};

/// Default per-value quota, matching the capacity of a browser origin store.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

/// A synchronous string-keyed, string-valued store.
///
/// Implementations never interpret the values they hold.
pub trait KeyValueStore {
    /// Read the value at `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExceeded`] if the value is over the backend's
    /// quota (the previous value is kept), or a backend error.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;

    /// List stored keys in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Reject `value` if it is larger than `limit` bytes.
pub(crate) fn check_quota(key: &str, value: &str, limit: Option<usize>) -> Result<()> {
    match limit {
        Some(limit) if value.len() > limit => Err(Error::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            limit,
        }),
        _ => Ok(()),
    }
}
