//! Error types for suitestore.
//!
//! This module defines all error types used throughout the suitestore crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for suitestore operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A collection write was larger than the substrate allows.
    #[error("collection '{key}' is {size} bytes, exceeding the {limit} byte quota")]
    QuotaExceeded {
        /// Storage key that was being written.
        key: String,
        /// Serialized size of the rejected value.
        size: usize,
        /// Configured per-value limit.
        limit: usize,
    },

    /// The in-memory substrate lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,

    // === Collection Errors ===
    /// Stored collection content could not be parsed.
    #[error("collection '{key}' is corrupt: {source}")]
    CorruptCollection {
        /// Storage key holding the unreadable content.
        key: String,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// An update patch was not a JSON object, or a record did not serialize to one.
    #[error("invalid patch for record '{id}': {message}")]
    InvalidPatch {
        /// Id of the record being patched.
        id: String,
        /// Description of the problem.
        message: String,
    },

    /// A record handed to a collection cannot carry an id.
    #[error("invalid record for collection '{key}': {message}")]
    InvalidRecord {
        /// Storage key of the target collection.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// A status change is not allowed by the entity's transition table.
    #[error("cannot move {entity} '{id}' from '{from}' to '{to}'")]
    InvalidTransition {
        /// Entity kind, e.g. "sales order".
        entity: &'static str,
        /// Record id.
        id: String,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// A collection name did not match any registered key.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for suitestore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid patch error.
    #[must_use]
    pub fn invalid_patch(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPatch {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create an invalid transition error.
    #[must_use]
    pub fn invalid_transition(
        entity: &'static str,
        id: impl Into<String>,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            id: id.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Check if this error is a rejected status change.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if this error is a quota rejection.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}
