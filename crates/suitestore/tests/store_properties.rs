//! End-to-end checks of the record store contract against both substrates.

use serde_json::{json, Value};

use suitestore::domain::{DeliveryStatus, PaymentStatus};
use suitestore::{
    calculate_order_totals, CollectionKey, Error, Invoice, KeyValueStore, MemoryStore, Mutation,
    Patch, SalesOrder, SalesOrderItem, SqliteStore, Store,
};

fn memory_store() -> Store<MemoryStore> {
    Store::new(MemoryStore::new())
}

fn sqlite_store() -> Store<SqliteStore> {
    Store::new(SqliteStore::open_in_memory().expect("in-memory database"))
}

fn patch(value: Value) -> Patch {
    value.as_object().cloned().expect("patch must be an object")
}

fn round_trip<S: KeyValueStore>(store: &Store<S>) {
    let seed = vec![json!({"id": "a", "name": "first"}), json!({"id": "b"})];
    assert_eq!(store.get_stored_data("things", seed.clone()).unwrap(), seed);

    let replaced = vec![json!({"id": "c", "name": "third"})];
    store.store_data("things", &replaced).unwrap();
    assert_eq!(
        store.get_stored_data("things", seed).unwrap(),
        replaced
    );
}

#[test]
fn test_round_trip_memory() {
    round_trip(&memory_store());
}

#[test]
fn test_round_trip_sqlite() {
    round_trip(&sqlite_store());
}

#[test]
fn test_hydration_is_idempotent() {
    let store = sqlite_store();
    let first = store.get_stored_sales_orders().unwrap();
    let second = store.get_stored_sales_orders().unwrap();

    assert_eq!(first, second);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.total.to_bits(), b.total.to_bits());
        assert_eq!(a.tax_amount.to_bits(), b.tax_amount.to_bits());
    }
}

#[test]
fn test_total_invariant() {
    let cases = [
        (vec![SalesOrderItem::new("p", "P", 3.0, 19.99, None)], 7.5),
        (
            vec![
                SalesOrderItem::new("p", "P", 1.0, 100.0, Some(10.0)),
                SalesOrderItem::new("q", "Q", 4.0, 0.25, Some(0.0)),
            ],
            21.0,
        ),
        (vec![SalesOrderItem::new("p", "P", 0.0, 50.0, None)], 0.0),
    ];

    for (items, rate) in cases {
        let totals = calculate_order_totals(&items, rate);
        let expected_subtotal: f64 = items
            .iter()
            .map(|i| i.quantity * i.unit_price - i.discount.unwrap_or(0.0))
            .sum();
        assert_eq!(totals.total, totals.subtotal_before_tax + totals.tax_amount);
        assert!((totals.subtotal_before_tax - expected_subtotal).abs() < 1e-9);
    }
}

#[test]
fn test_empty_items_total_zero() {
    for rate in [0.0, 8.0, 100.0] {
        let totals = calculate_order_totals::<SalesOrderItem>(&[], rate);
        assert_eq!(totals.subtotal_before_tax, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, 0.0);
    }
}

#[test]
fn test_add_update_delete_contract() {
    let store = sqlite_store();
    let key = CollectionKey::Products.storage_key();
    store.store_data::<Value>(key, &[]).unwrap();

    let added = store.add_record(key, json!({"name": "x"})).unwrap();
    assert_eq!(added.len(), 1);
    let id = added[0]["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    store.add_record(key, json!({"id": "other", "name": "z"})).unwrap();

    let updated = store
        .update_record::<Value>(key, &id, &patch(json!({"name": "y"})))
        .unwrap();
    let Mutation::Found(records) = updated else {
        panic!("update should find the record");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], json!({"id": id, "name": "y"}));
    assert_eq!(records[1], json!({"id": "other", "name": "z"}));

    let deleted = store.delete_record::<Value>(key, &id).unwrap();
    assert!(deleted.is_found());
    assert_eq!(deleted.records(), &[json!({"id": "other", "name": "z"})]);

    let missing = store.delete_record::<Value>(key, &id).unwrap();
    assert!(!missing.is_found());
    assert_eq!(missing.records().len(), 1);
}

#[test]
fn test_defaulting_migration_leaves_bytes_alone() {
    let store = memory_store();
    let key = CollectionKey::SalesOrders.storage_key();
    let legacy = r#"[{"id":"so-9","orderNumber":"SO-9","customer":"Old Co","status":"Quotation","items":[{"productId":"p","productName":"P","quantity":2,"unitPrice":10}],"taxRate":10}]"#;
    store.kv().set(key, legacy).unwrap();

    let orders = store.get_stored_sales_orders().unwrap();
    let order: &SalesOrder = &orders[0];

    assert_eq!(order.delivery_status, DeliveryStatus::PendingDelivery);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(order.currency, "USD");
    assert!(order.linked_invoice_ids.is_empty());
    assert_eq!(order.items[0].subtotal, 20.0);
    assert_eq!(order.total, 22.0);

    assert_eq!(store.kv().get(key).unwrap().as_deref(), Some(legacy));
}

#[test]
fn test_concrete_order_scenario() {
    let items = [
        SalesOrderItem::new("p1", "Desk", 2.0, 1500.0, Some(50.0)),
        SalesOrderItem::new("p2", "Table", 1.0, 2000.0, Some(50.0)),
    ];
    let totals = calculate_order_totals(&items, 8.0);

    assert_eq!(totals.subtotal_before_tax, 4900.0);
    assert_eq!(totals.tax_amount, 392.0);
    assert_eq!(totals.total, 5292.0);
}

#[test]
fn test_file_backed_store_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "suitestore_properties_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let store = Store::new(SqliteStore::open(&path).unwrap());
        store.create_invoice_for_order("so-002").unwrap().unwrap();
    }

    let store = Store::new(SqliteStore::open(&path).unwrap());
    let order = store
        .get_stored_sales_orders()
        .unwrap()
        .into_iter()
        .find(|o| o.id == "so-002")
        .unwrap();
    assert_eq!(order.linked_invoice_ids.len(), 1);
    assert!(store.dangling_invoice_links().unwrap().is_empty());

    drop(store);
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}

#[test]
fn test_null_fields_read_as_defaults() {
    let store = sqlite_store();
    let key = CollectionKey::Invoices.storage_key();
    store
        .kv()
        .set(
            key,
            r#"[{"id":"inv-1","customer":"Hooli","currency":null,"salesOrderId":null,
                "taxRate":null,"amountPaid":null,"items":null}]"#,
        )
        .unwrap();

    let invoices = store.get_stored_invoices().unwrap();
    assert_eq!(invoices.len(), 1);
    let invoice: &Invoice = &invoices[0];
    assert_eq!(invoice.id, "inv-1");
    assert_eq!(invoice.currency, "USD");
    assert!(invoice.sales_order_id.is_none());
    assert!(invoice.items.is_empty());
    assert_eq!(invoice.amount_due, 0.0);
}

#[test]
fn test_unknown_fields_survive_typed_writes() {
    let store = sqlite_store();
    let key = CollectionKey::SalesOrders.storage_key();
    store
        .kv()
        .set(
            key,
            r#"[{"id":"so-1","customer":"Initech","shippingAddress":"12 Main St","portalRef":7}]"#,
        )
        .unwrap();

    store
        .update_sales_order("so-1", &patch(json!({"notes": "rush"})))
        .unwrap();
    store.add_entity(SalesOrder::default()).unwrap();

    let stored: Vec<Value> = store.get_stored_data(key, Vec::new()).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["shippingAddress"], "12 Main St");
    assert_eq!(stored[0]["portalRef"], 7);
    assert_eq!(stored[0]["notes"], "rush");
}

#[test]
fn test_mutation_after_unreadable_collection_keeps_bytes() {
    let store = sqlite_store();
    let key = CollectionKey::SalesOrders.storage_key();
    let damaged = r#"[{"id":"mine","customer":"Real""#;
    store.kv().set(key, damaged).unwrap();

    let fallback = store.get_stored_sales_orders().unwrap();
    assert!(fallback.iter().all(|o| o.id != "mine"));

    let err = store.add_entity(SalesOrder::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptCollection { .. }));
    assert!(store.link_invoice("so-001", "inv-1").is_err());
    assert!(store.add_record(key, json!({"id": "x"})).is_err());

    assert_eq!(store.kv().get(key).unwrap().as_deref(), Some(damaged));
}

#[test]
fn test_record_with_unknown_status_is_kept() {
    let store = memory_store();
    let key = CollectionKey::SalesOrders.storage_key();
    let legacy = json!({"id": "old", "customer": "Legacy", "status": "Confirmed"});
    store
        .store_data(key, &[legacy.clone(), json!({"id": "new", "customer": "Now"})])
        .unwrap();

    let orders = store.get_stored_sales_orders().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, "new");

    store.link_invoice("new", "inv-2").unwrap();
    store.delete_entity::<SalesOrder>("missing").unwrap();

    let stored: Vec<Value> = store.get_stored_data(key, Vec::new()).unwrap();
    assert_eq!(stored[0], legacy);
    assert_eq!(stored[1]["linkedInvoiceIds"], json!(["inv-2"]));
}

#[test]
fn test_non_object_records_rejected() {
    let store = memory_store();
    let key = CollectionKey::Activities.storage_key();

    let err = store.add_record(key, json!(42)).unwrap_err();
    assert!(matches!(err, Error::InvalidRecord { .. }));
    assert!(store
        .get_stored_data::<Value>(key, Vec::new())
        .unwrap()
        .is_empty());
}
