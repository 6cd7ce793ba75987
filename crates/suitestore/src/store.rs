//! Generic collection store and record mutators.
//!
//! Every operation reads the whole collection, changes it in memory and
//! writes the whole collection back. There is no locking and no merge:
//! two interleaved read-modify-write sequences on the same key lose one of
//! the writes.
//!
//! Plain reads follow the store's [`CorruptPolicy`]. Mutators always read
//! strictly: a collection whose text does not parse is reported as
//! [`Error::CorruptCollection`] and never overwritten.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::id::{generate_id, IdStrategy};
use crate::storage::KeyValueStore;

/// A persisted entity with a string id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// The record's id; empty when not yet assigned.
    fn id(&self) -> &str;

    /// Assign the record's id.
    fn set_id(&mut self, id: String);
}

/// Untyped records: any JSON object with an `"id"` string field.
impl Record for Value {
    fn id(&self) -> &str {
        self.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    fn set_id(&mut self, id: String) {
        if let Value::Object(map) = self {
            map.insert("id".to_string(), Value::String(id));
        }
    }
}

/// A shallow JSON patch: top-level fields replace the record's fields.
pub type Patch = Map<String, Value>;

/// What to do when a stored collection cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptPolicy {
    /// Log a warning and return the seed, leaving the stored bytes in place.
    #[default]
    Fallback,
    /// Fail with [`Error::CorruptCollection`].
    Error,
}

/// Behavioural knobs for a [`Store`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Id generation for records added without one.
    pub id_strategy: IdStrategy,
    /// Handling of unparsable stored collections.
    pub on_corrupt: CorruptPolicy,
}

/// Outcome of an id-addressed mutation.
///
/// Both variants carry the full collection as it stands after the call.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// The id matched and the collection was written back.
    Found(Vec<T>),
    /// No record had the id; nothing was written.
    NotFound(Vec<T>),
}

impl<T> Mutation<T> {
    /// Whether the id matched a record.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The collection, regardless of outcome.
    #[must_use]
    pub fn records(&self) -> &[T] {
        match self {
            Self::Found(records) | Self::NotFound(records) => records,
        }
    }

    /// Consume the outcome and return the collection.
    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Found(records) | Self::NotFound(records) => records,
        }
    }
}

/// Typed collection store over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Store<S> {
    kv: S,
    options: StoreOptions,
}

impl<S: KeyValueStore> Store<S> {
    /// Wrap a substrate with default options.
    pub fn new(kv: S) -> Self {
        Self::with_options(kv, StoreOptions::default())
    }

    /// Wrap a substrate with explicit options.
    pub fn with_options(kv: S, options: StoreOptions) -> Self {
        Self { kv, options }
    }

    /// The underlying substrate.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// The active options.
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Read the collection at `key`.
    ///
    /// If the key is absent, `initial` is written to it and returned. If it
    /// is present, the stored records are returned as parsed.
    ///
    /// # Errors
    ///
    /// Returns a substrate error, or [`Error::CorruptCollection`] when the
    /// stored text is unparsable and the policy is [`CorruptPolicy::Error`].
    pub fn get_stored_data<T: Record>(&self, key: &str, initial: Vec<T>) -> Result<Vec<T>> {
        self.read_collection(key, initial, self.options.on_corrupt)
    }

    /// Read the collection at `key` under an explicit corrupt-data policy.
    pub(crate) fn read_collection<T: Record>(
        &self,
        key: &str,
        initial: Vec<T>,
        on_corrupt: CorruptPolicy,
    ) -> Result<Vec<T>> {
        let Some(raw) = self.kv.get(key)? else {
            info!("Seeding {} with {} records", key, initial.len());
            self.store_data(key, &initial)?;
            return Ok(initial);
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => {
                debug!("Read {} records from {}", records.len(), key);
                Ok(records)
            }
            Err(source) => match on_corrupt {
                CorruptPolicy::Fallback => {
                    warn!(
                        "Collection {} is unreadable ({}); using seed data",
                        key, source
                    );
                    Ok(initial)
                }
                CorruptPolicy::Error => Err(Error::CorruptCollection {
                    key: key.to_string(),
                    source,
                }),
            },
        }
    }

    /// Read the collection a mutator is about to rewrite.
    fn read_for_write<T: Record>(&self, key: &str) -> Result<Vec<T>> {
        self.read_collection(key, Vec::new(), CorruptPolicy::Error)
    }

    /// Overwrite the collection at `key`.
    ///
    /// # Errors
    ///
    /// Returns a serialization or substrate error, including
    /// [`Error::QuotaExceeded`].
    pub fn store_data<T: Serialize>(&self, key: &str, data: &[T]) -> Result<()> {
        let raw = serde_json::to_string(data)?;
        self.kv.set(key, &raw)?;
        debug!("Stored {} records under {}", data.len(), key);
        Ok(())
    }

    /// Append `record`, assigning a fresh id if it has none.
    ///
    /// Duplicate ids are not checked. Returns the full collection with the
    /// new record last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the record cannot hold an id (a
    /// JSON value that is not an object), [`Error::CorruptCollection`] if
    /// the stored collection does not parse, or a substrate error.
    pub fn add_record<T: Record>(&self, key: &str, mut record: T) -> Result<Vec<T>> {
        if record.id().is_empty() {
            record.set_id(generate_id(self.options.id_strategy));
        }
        if record.id().is_empty() {
            return Err(Error::InvalidRecord {
                key: key.to_string(),
                message: "record must be a JSON object".to_string(),
            });
        }

        let mut records = self.read_for_write(key)?;
        debug!("Adding record {} to {}", record.id(), key);
        records.push(record);
        self.store_data(key, &records)?;
        Ok(records)
    }

    /// Shallow-merge `updates` into the record with `id`.
    ///
    /// Every field present in `updates` replaces the record's field; other
    /// records pass through unchanged. The `id` field itself is never
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPatch`] if the merged record no longer
    /// deserializes, [`Error::CorruptCollection`] if the stored collection
    /// does not parse, or a substrate error.
    pub fn update_record<T: Record>(
        &self,
        key: &str,
        id: &str,
        updates: &Patch,
    ) -> Result<Mutation<T>> {
        let mut records: Vec<T> = self.read_for_write(key)?;

        let Some(position) = records.iter().position(|r| r.id() == id) else {
            warn!("Update of {} in {} matched no record", id, key);
            return Ok(Mutation::NotFound(records));
        };

        records[position] = merge(&records[position], updates)?;
        self.store_data(key, &records)?;
        debug!("Updated record {} in {}", id, key);
        Ok(Mutation::Found(records))
    }

    /// Remove the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptCollection`] if the stored collection does
    /// not parse, or a substrate error.
    pub fn delete_record<T: Record>(&self, key: &str, id: &str) -> Result<Mutation<T>> {
        let mut records: Vec<T> = self.read_for_write(key)?;
        let before = records.len();
        records.retain(|r| r.id() != id);

        if records.len() == before {
            warn!("Delete of {} in {} matched no record", id, key);
            return Ok(Mutation::NotFound(records));
        }

        self.store_data(key, &records)?;
        debug!("Deleted record {} from {}", id, key);
        Ok(Mutation::Found(records))
    }

    /// Find the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn find_record<T: Record>(&self, key: &str, id: &str) -> Result<Option<T>> {
        let records: Vec<T> = self.get_stored_data(key, Vec::new())?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }
}

/// Apply a shallow patch to a record through its JSON form.
pub(crate) fn merge<T: Record>(record: &T, updates: &Patch) -> Result<T> {
    let Value::Object(mut fields) = serde_json::to_value(record)? else {
        return Err(Error::invalid_patch(
            record.id(),
            "record does not serialize to a JSON object",
        ));
    };

    for (field, value) in updates {
        if field == "id" {
            continue;
        }
        fields.insert(field.clone(), value.clone());
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| Error::invalid_patch(record.id(), e.to_string()))
}
