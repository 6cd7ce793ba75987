//! Record id generation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How new record ids are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Time-ordered UUID v7.
    #[default]
    Uuid,
    /// Epoch milliseconds as a decimal string.
    ///
    /// Two records created in the same millisecond get the same id.
    Timestamp,
}

impl std::fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uuid => write!(f, "uuid"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Generate a new record id.
#[must_use]
pub fn generate_id(strategy: IdStrategy) -> String {
    match strategy {
        IdStrategy::Uuid => Uuid::now_v7().to_string(),
        IdStrategy::Timestamp => Utc::now().timestamp_millis().to_string(),
    }
}
