//! Typed collection readers with migration-on-read.
//!
//! A hydrated read always goes through the same steps: read the raw
//! collection (seeding it on first use), let serde fill fields the stored
//! record predates, then re-derive computed fields. The hydrated values are
//! handed to the caller and never written back by the read itself, so the
//! stored bytes stay as they were and every read recomputes from scratch.
//!
//! Records are decoded one at a time. A record that does not fit its type
//! (an unknown status, a wrongly typed field) is skipped with a warning
//! instead of taking the rest of the collection down with it. The typed
//! mutators work on the raw JSON array, so such records are written back
//! exactly as they were found.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    initial_customers, initial_invoices, initial_leads, initial_opportunities,
    initial_pos_sessions, initial_sales_orders, Customer, Invoice, Lead, Opportunity,
    OpportunityStage, PosSession, SalesOrder, SalesOrderStatus,
};
use crate::error::{Error, Result};
use crate::id::generate_id;
use crate::keys::CollectionKey;
use crate::storage::KeyValueStore;
use crate::store::{self, CorruptPolicy, Mutation, Patch, Record, Store};

/// A record type bound to a registered collection.
pub trait Entity: Record {
    /// Collection the records live in.
    const KEY: CollectionKey;

    /// Seed written when the collection does not exist yet.
    fn initial() -> Vec<Self>;

    /// Re-derive computed fields. Must be deterministic.
    #[must_use]
    fn hydrate(self) -> Self {
        self
    }

    /// Decode one stored record and hydrate it.
    ///
    /// An explicit `null` counts as a missing field and takes the field's
    /// default, at any depth.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the record does not fit the type.
    fn from_json(mut raw: Value) -> serde_json::Result<Self> {
        strip_nulls(&mut raw);
        serde_json::from_value::<Self>(raw).map(Entity::hydrate)
    }
}

/// Remove every `null` object member, recursively.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            fields.retain(|_, field| !field.is_null());
            fields.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Decode every record that fits `E`, warning about the rest.
fn decode_records<E: Entity>(raw: &[Value]) -> Vec<E> {
    raw.iter()
        .filter_map(|value| match E::from_json(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    "Skipping record '{}' in {}: {}",
                    value.id(),
                    E::KEY,
                    e
                );
                None
            }
        })
        .collect()
}

impl Entity for SalesOrder {
    const KEY: CollectionKey = CollectionKey::SalesOrders;

    fn initial() -> Vec<Self> {
        initial_sales_orders()
    }

    fn hydrate(mut self) -> Self {
        self.recompute_totals();
        self
    }
}

impl Entity for Invoice {
    const KEY: CollectionKey = CollectionKey::Invoices;

    fn initial() -> Vec<Self> {
        initial_invoices()
    }

    fn hydrate(mut self) -> Self {
        self.recompute_totals();
        self
    }
}

impl Entity for Opportunity {
    const KEY: CollectionKey = CollectionKey::Opportunities;

    fn initial() -> Vec<Self> {
        initial_opportunities()
    }

    // Closed deals have a settled probability.
    fn hydrate(mut self) -> Self {
        match self.stage {
            OpportunityStage::Won => self.probability = 100.0,
            OpportunityStage::Lost => self.probability = 0.0,
            _ => {}
        }
        self
    }
}

impl Entity for Lead {
    const KEY: CollectionKey = CollectionKey::Leads;

    fn initial() -> Vec<Self> {
        initial_leads()
    }
}

impl Entity for Customer {
    const KEY: CollectionKey = CollectionKey::Customers;

    fn initial() -> Vec<Self> {
        initial_customers()
    }
}

impl Entity for PosSession {
    const KEY: CollectionKey = CollectionKey::PosSessions;

    fn initial() -> Vec<Self> {
        initial_pos_sessions()
    }
}

impl<S: KeyValueStore> Store<S> {
    /// Read and hydrate a typed collection.
    ///
    /// Records that do not decode are left out of the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn load<E: Entity>(&self) -> Result<Vec<E>> {
        let raw = self.read_raw::<E>(self.options().on_corrupt)?;
        Ok(decode_records(&raw))
    }

    /// The stored JSON array behind `E`, seeded on first use.
    fn read_raw<E: Entity>(&self, on_corrupt: CorruptPolicy) -> Result<Vec<Value>> {
        let seed = E::initial()
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        self.read_collection(E::KEY.storage_key(), seed, on_corrupt)
    }

    /// Overwrite a typed collection as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn save<E: Entity>(&self, records: &[E]) -> Result<()> {
        self.store_data(E::KEY.storage_key(), records)
    }

    /// Append a typed record, assigning an id if needed. Returns the hydrated collection.
    ///
    /// Stored records are kept byte for byte, including ones that do not
    /// decode as `E`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptCollection`] if the stored collection does
    /// not parse, or a substrate error.
    pub fn add_entity<E: Entity>(&self, record: E) -> Result<Vec<E>> {
        let mut raw = self.read_raw::<E>(CorruptPolicy::Error)?;
        let mut record = record.hydrate();
        if record.id().is_empty() {
            record.set_id(generate_id(self.options().id_strategy));
        }
        debug!("Adding record {} to {}", record.id(), E::KEY);
        raw.push(serde_json::to_value(&record)?);
        self.store_data(E::KEY.storage_key(), &raw)?;
        Ok(decode_records(&raw))
    }

    /// Shallow-merge `updates` into a typed record and re-derive its fields.
    ///
    /// Only the matched record is rewritten; every other stored record is
    /// kept as found. A patch may repair a record that did not decode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPatch`] if the patched record does not
    /// decode, [`Error::CorruptCollection`] if the stored collection does
    /// not parse, or a substrate error.
    pub fn update_entity<E: Entity>(&self, id: &str, updates: &Patch) -> Result<Mutation<E>> {
        let mut raw = self.read_raw::<E>(CorruptPolicy::Error)?;

        let Some(position) = raw.iter().position(|r| r.id() == id) else {
            warn!("Update of {} in {} matched no record", id, E::KEY);
            return Ok(Mutation::NotFound(decode_records(&raw)));
        };

        let merged = store::merge(&raw[position], updates)?;
        let record = E::from_json(merged).map_err(|e| Error::invalid_patch(id, e.to_string()))?;
        raw[position] = serde_json::to_value(&record)?;
        self.store_data(E::KEY.storage_key(), &raw)?;
        debug!("Updated record {} in {}", id, E::KEY);
        Ok(Mutation::Found(decode_records(&raw)))
    }

    /// Remove a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptCollection`] if the stored collection does
    /// not parse, or a substrate error.
    pub fn delete_entity<E: Entity>(&self, id: &str) -> Result<Mutation<E>> {
        let mut raw = self.read_raw::<E>(CorruptPolicy::Error)?;
        let before = raw.len();
        raw.retain(|r| r.id() != id);

        if raw.len() == before {
            warn!("Delete of {} in {} matched no record", id, E::KEY);
            return Ok(Mutation::NotFound(decode_records(&raw)));
        }

        self.store_data(E::KEY.storage_key(), &raw)?;
        debug!("Deleted record {} from {}", id, E::KEY);
        Ok(Mutation::Found(decode_records(&raw)))
    }

    /// Hydrated opportunities.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get_stored_opportunities(&self) -> Result<Vec<Opportunity>> {
        self.load()
    }

    /// Overwrite the opportunities collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn store_opportunities(&self, records: &[Opportunity]) -> Result<()> {
        self.save(records)
    }

    /// Hydrated leads.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get_stored_leads(&self) -> Result<Vec<Lead>> {
        self.load()
    }

    /// Overwrite the leads collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn store_leads(&self, records: &[Lead]) -> Result<()> {
        self.save(records)
    }

    /// Hydrated customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get_stored_customers(&self) -> Result<Vec<Customer>> {
        self.load()
    }

    /// Overwrite the customers collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn store_customers(&self, records: &[Customer]) -> Result<()> {
        self.save(records)
    }

    /// Hydrated sales orders with every total recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get_stored_sales_orders(&self) -> Result<Vec<SalesOrder>> {
        self.load()
    }

    /// Overwrite the sales orders collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn store_sales_orders(&self, records: &[SalesOrder]) -> Result<()> {
        self.save(records)
    }

    /// Hydrated invoices with every total recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get_stored_invoices(&self) -> Result<Vec<Invoice>> {
        self.load()
    }

    /// Overwrite the invoices collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn store_invoices(&self, records: &[Invoice]) -> Result<()> {
        self.save(records)
    }

    /// Hydrated point-of-sale sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get_stored_pos_sessions(&self) -> Result<Vec<PosSession>> {
        self.load()
    }

    /// Overwrite the point-of-sale sessions collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn store_pos_sessions(&self, records: &[PosSession]) -> Result<()> {
        self.save(records)
    }

    /// Patch a sales order, refusing status changes the transition table forbids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] for a forbidden status change,
    /// [`Error::InvalidPatch`] for an unknown status, or a storage error.
    pub fn update_sales_order(&self, id: &str, updates: &Patch) -> Result<Mutation<SalesOrder>> {
        if let Some(requested) = updates.get("status") {
            let next: SalesOrderStatus = serde_json::from_value(requested.clone())
                .map_err(|e| Error::invalid_patch(id, e.to_string()))?;

            // A record that does not decode has no status to guard.
            let current = self
                .get_stored_sales_orders()?
                .into_iter()
                .find(|order| order.id == id);
            if let Some(order) = current {
                if !order.status.can_transition_to(next) {
                    return Err(Error::invalid_transition(
                        "sales order",
                        id,
                        order.status,
                        next,
                    ));
                }
            }
        }

        self.update_entity(id, updates)
    }

    /// Move a sales order to `next`.
    ///
    /// # Errors
    ///
    /// See [`Store::update_sales_order`].
    pub fn transition_sales_order(
        &self,
        id: &str,
        next: SalesOrderStatus,
    ) -> Result<Mutation<SalesOrder>> {
        let mut updates = Patch::new();
        updates.insert("status".to_string(), serde_json::to_value(next)?);
        self.update_sales_order(id, &updates)
    }
}
