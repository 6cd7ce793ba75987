//! `SQLite`-backed substrate.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{check_quota, migrations, KeyValueStore, DEFAULT_MAX_VALUE_BYTES};
use crate::error::{Error, Result};

/// Durable substrate storing one row per collection key.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Per-value quota in bytes, `None` for unlimited.
    max_value_bytes: Option<usize>,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema to the current version.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn,
            max_value_bytes: Some(DEFAULT_MAX_VALUE_BYTES),
        })
    }

    /// Create an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            max_value_bytes: Some(DEFAULT_MAX_VALUE_BYTES),
        })
    }

    /// Replace the per-value quota (`None` = unlimited).
    #[must_use]
    pub fn with_quota(mut self, max_value_bytes: Option<usize>) -> Self {
        self.max_value_bytes = max_value_bytes;
        self
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When `key` was last written, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM collections WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (collections, total_value_bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(CAST(value AS BLOB))), 0) FROM collections",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let last_write: Option<String> = self
            .conn
            .query_row(
                "SELECT MAX(updated_at) FROM collections WHERE updated_at != ''",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            collections: usize::try_from(collections).unwrap_or(0),
            total_value_bytes: u64::try_from(total_value_bytes).unwrap_or(0),
            last_write: last_write
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            db_size_bytes,
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM collections WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        check_quota(key, value, self.max_value_bytes)?;

        self.conn.execute(
            r"
            INSERT INTO collections (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        debug!("Wrote {} bytes to {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM collections WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM collections ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// Statistics about the substrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of stored collections.
    pub collections: usize,
    /// Sum of all stored value sizes in bytes.
    pub total_value_bytes: u64,
    /// Most recent collection write.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        store.set("suite:leads", r#"[{"id":"1"}]"#).unwrap();

        assert_eq!(
            store.get("suite:leads").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[test]
    fn test_get_nonexistent() {
        let store = create_test_store();
        assert!(store.get("suite:nothing").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let store = create_test_store();
        store.set("k", "[1]").unwrap();
        store.set("k", "[2]").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.keys().unwrap().len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.set("k", "[]").unwrap();

        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_keys_sorted() {
        let store = create_test_store();
        store.set("suite:leads", "[]").unwrap();
        store.set("suite:customers", "[]").unwrap();

        assert_eq!(
            store.keys().unwrap(),
            vec!["suite:customers".to_string(), "suite:leads".to_string()]
        );
    }

    #[test]
    fn test_quota_rejects_and_keeps_previous() {
        let store = create_test_store().with_quota(Some(4));
        store.set("k", "[]").unwrap();

        let err = store.set("k", "[1,2,3]").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_updated_at_recorded() {
        let store = create_test_store();
        assert!(store.updated_at("k").unwrap().is_none());

        let before = Utc::now();
        store.set("k", "[]").unwrap();
        let stamp = store.updated_at("k").unwrap().unwrap();
        assert!(stamp >= before - chrono::Duration::seconds(1));
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.collections, 0);
        assert_eq!(stats.total_value_bytes, 0);
        assert!(stats.last_write.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let store = create_test_store();
        store.set("a", "[1]").unwrap();
        store.set("b", "[22]").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.collections, 2);
        assert_eq!(stats.total_value_bytes, 7);
        assert!(stats.last_write.is_some());
    }

    #[test]
    fn test_unicode_value() {
        let store = create_test_store();
        let value = r#"[{"id":"1","name":"Société Générale 世界"}]"#;
        store.set("k", value).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(value));
    }

    #[test]
    fn test_open_file_based_persists() {
        let db_path =
            std::env::temp_dir().join(format!("suitestore_test_{}.db", std::process::id()));

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.set("suite:customers", r#"[{"id":"c1"}]"#).unwrap();
            assert_eq!(store.path(), db_path);
            assert!(store.stats().unwrap().db_size_bytes > 0);
        }

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            reopened.get("suite:customers").unwrap().as_deref(),
            Some(r#"[{"id":"c1"}]"#)
        );

        drop(reopened);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("suitestore_test_{}", std::process::id()));
        let nested_path = root.join("nested/store.sqlite");
        let _ = std::fs::remove_dir_all(&root);

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }
}
