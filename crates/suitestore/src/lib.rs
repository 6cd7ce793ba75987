//! `suitestore` - Persistent record collections for a small business suite
//!
//! Every collection (opportunities, sales orders, invoices, ...) is kept as
//! a single JSON array behind a string key in a [`KeyValueStore`]. The
//! [`Store`] layer seeds empty keys, applies record-level add, update and
//! delete, and the [`hydrate`] layer upgrades old records on read and
//! recomputes derived order totals.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod hydrate;
pub mod id;
pub mod keys;
pub mod links;
pub mod logging;
pub mod storage;
pub mod store;
pub mod totals;

pub use config::Config;
pub use domain::{
    Customer, Invoice, InvoiceStatus, Lead, Opportunity, PosSession, SalesOrder, SalesOrderItem,
    SalesOrderStatus,
};
pub use error::{Error, Result};
pub use hydrate::Entity;
pub use id::{generate_id, IdStrategy};
pub use keys::CollectionKey;
pub use links::DanglingLink;
pub use logging::init_logging;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageStats};
pub use store::{CorruptPolicy, Mutation, Patch, Record, Store, StoreOptions};
pub use totals::{calculate_order_totals, OrderTotals};
