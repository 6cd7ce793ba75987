//! Typed business records.
//!
//! Every record type deserializes with struct-level defaults, so a record
//! persisted before a field existed still parses: the missing field takes
//! its default on read and the stored bytes are left alone.

mod crm;
mod invoice;
mod pos;
mod sales;

pub use crm::{
    initial_customers, initial_leads, initial_opportunities, Customer, Lead, LeadStatus,
    Opportunity, OpportunityStage,
};
pub use invoice::{initial_invoices, Invoice, InvoiceStatus};
pub use pos::{initial_pos_sessions, PosOrderItem, PosSession, PosSessionStatus};
pub use sales::{
    initial_sales_orders, DeliveryStatus, PaymentStatus, SalesOrder, SalesOrderItem,
    SalesOrderStatus,
};

/// Currency assumed for records stored without one.
pub const DEFAULT_CURRENCY: &str = "USD";
