//! Sales order to invoice references.
//!
//! `SalesOrder::linked_invoice_ids` is a weak reference list: it names
//! invoices by id without owning them, and deleting an invoice does not
//! touch the orders pointing at it. [`Store::dangling_invoice_links`] is the
//! explicit validation pass for callers that need referential integrity.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Invoice, SalesOrder};
use crate::error::Result;
use crate::id::generate_id;
use crate::storage::KeyValueStore;
use crate::store::{Mutation, Patch, Store};

/// An order reference to an invoice that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingLink {
    /// Order holding the reference.
    pub sales_order_id: String,
    /// Id that resolves to no invoice.
    pub invoice_id: String,
}

impl<S: KeyValueStore> Store<S> {
    /// Record that `invoice_id` was raised against `order_id`.
    ///
    /// Adding an id that is already linked leaves the order unchanged. The
    /// invoice itself is not looked up. Other stored orders are kept as
    /// found, including ones that do not decode.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn link_invoice(&self, order_id: &str, invoice_id: &str) -> Result<Mutation<SalesOrder>> {
        let orders = self.get_stored_sales_orders()?;

        let Some(order) = orders.iter().find(|o| o.id == order_id) else {
            return Ok(Mutation::NotFound(orders));
        };

        if order.linked_invoice_ids.iter().any(|id| id == invoice_id) {
            debug!("Invoice {} already linked to {}", invoice_id, order_id);
            return Ok(Mutation::Found(orders));
        }

        let mut linked = order.linked_invoice_ids.clone();
        linked.push(invoice_id.to_string());
        let mut updates = Patch::new();
        updates.insert("linkedInvoiceIds".to_string(), serde_json::to_value(linked)?);
        self.update_entity(order_id, &updates)
    }

    /// Raise a draft invoice for every line of an order and link it.
    ///
    /// Returns `None` when no order has `order_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be read or written.
    pub fn create_invoice_for_order(&self, order_id: &str) -> Result<Option<Invoice>> {
        let Some(order) = self
            .get_stored_sales_orders()?
            .into_iter()
            .find(|o| o.id == order_id)
        else {
            return Ok(None);
        };

        let number = format!(
            "INV/{}/{:04}",
            chrono::Utc::now().format("%Y"),
            self.get_stored_invoices()?.len() + 1
        );
        let mut invoice = Invoice::from_sales_order(&order, number);
        invoice.id = generate_id(self.options().id_strategy);

        self.add_entity(invoice.clone())?;
        self.link_invoice(order_id, &invoice.id)?;

        info!(
            "Created invoice {} for sales order {}",
            invoice.invoice_number, order_id
        );
        Ok(Some(invoice))
    }

    /// Invoices that name an order in `sales_order_id` which does not list them back.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be read.
    pub fn unlinked_invoices(&self) -> Result<Vec<Invoice>> {
        let orders = self.get_stored_sales_orders()?;

        Ok(self
            .get_stored_invoices()?
            .into_iter()
            .filter(|invoice| {
                invoice.sales_order_id.as_deref().is_some_and(|order_id| {
                    !orders
                        .iter()
                        .any(|o| o.id == order_id && o.linked_invoice_ids.contains(&invoice.id))
                })
            })
            .collect())
    }

    /// Every order reference that names no existing invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be read.
    pub fn dangling_invoice_links(&self) -> Result<Vec<DanglingLink>> {
        let invoice_ids: HashSet<String> = self
            .get_stored_invoices()?
            .into_iter()
            .map(|invoice| invoice.id)
            .collect();

        let dangling = self
            .get_stored_sales_orders()?
            .into_iter()
            .flat_map(|order| {
                let sales_order_id = order.id;
                order
                    .linked_invoice_ids
                    .into_iter()
                    .filter(|id| !invoice_ids.contains(id))
                    .map(move |invoice_id| DanglingLink {
                        sales_order_id: sales_order_id.clone(),
                        invoice_id,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(dangling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InvoiceStatus;
    use crate::storage::MemoryStore;

    fn create_test_store() -> Store<MemoryStore> {
        Store::new(MemoryStore::new())
    }

    #[test]
    fn test_link_invoice_adds_once() {
        let store = create_test_store();
        store.link_invoice("so-001", "inv-001").unwrap();
        let outcome = store.link_invoice("so-001", "inv-001").unwrap();

        assert!(outcome.is_found());
        assert_eq!(outcome.records()[0].linked_invoice_ids, vec!["inv-001"]);
    }

    #[test]
    fn test_link_invoice_missing_order() {
        let store = create_test_store();
        assert!(!store.link_invoice("nope", "inv-001").unwrap().is_found());
    }

    #[test]
    fn test_create_invoice_for_order() {
        let store = create_test_store();
        let invoice = store.create_invoice_for_order("so-001").unwrap().unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.total, 5292.0);
        assert!(invoice.invoice_number.starts_with("INV/"));

        let order = store.get_stored_sales_orders().unwrap().remove(0);
        assert_eq!(order.linked_invoice_ids, vec![invoice.id.clone()]);
        assert!(store
            .get_stored_invoices()
            .unwrap()
            .iter()
            .any(|i| i.id == invoice.id));
        assert!(store.dangling_invoice_links().unwrap().is_empty());
    }

    #[test]
    fn test_create_invoice_for_missing_order() {
        let store = create_test_store();
        assert!(store.create_invoice_for_order("ghost").unwrap().is_none());
    }

    #[test]
    fn test_deleted_invoice_leaves_dangling_link() {
        let store = create_test_store();
        let invoice = store.create_invoice_for_order("so-002").unwrap().unwrap();
        store.delete_entity::<Invoice>(&invoice.id).unwrap();

        let dangling = store.dangling_invoice_links().unwrap();
        assert_eq!(
            dangling,
            vec![DanglingLink {
                sales_order_id: "so-002".to_string(),
                invoice_id: invoice.id,
            }]
        );
    }

    #[test]
    fn test_unlinked_invoices() {
        let store = create_test_store();
        let mut invoices = store.get_stored_invoices().unwrap();
        invoices[0].sales_order_id = Some("so-001".to_string());
        store.store_invoices(&invoices).unwrap();

        let unlinked = store.unlinked_invoices().unwrap();
        assert_eq!(unlinked.len(), 1);

        store.link_invoice("so-001", &invoices[0].id).unwrap();
        assert!(store.unlinked_invoices().unwrap().is_empty());
    }

    #[test]
    fn test_link_keeps_unmodelled_order_fields() {
        let store = create_test_store();
        store
            .kv()
            .set(
                "suite:salesOrders",
                r#"[{"id":"so-1","customer":"Initech","shippingAddress":"12 Main St"}]"#,
            )
            .unwrap();

        store.link_invoice("so-1", "inv-9").unwrap();

        let stored: Vec<serde_json::Value> = store
            .get_stored_data("suite:salesOrders", Vec::new())
            .unwrap();
        assert_eq!(stored[0]["shippingAddress"], "12 Main St");
        assert_eq!(stored[0]["linkedInvoiceIds"], serde_json::json!(["inv-9"]));
    }
}
