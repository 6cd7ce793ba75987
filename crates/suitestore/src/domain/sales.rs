//! Quotations and sales orders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DEFAULT_CURRENCY;
use crate::store::Record;
use crate::totals::{calculate_order_totals, LineAmounts};

/// Lifecycle of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SalesOrderStatus {
    /// Draft quotation.
    #[default]
    Quotation,
    /// Quotation sent to the customer.
    #[serde(rename = "Quotation Sent")]
    QuotationSent,
    /// Confirmed order.
    #[serde(rename = "Sales Order")]
    SalesOrder,
    /// Fully processed and locked.
    Done,
    /// Cancelled at any point before completion.
    Cancelled,
}

impl SalesOrderStatus {
    /// Statuses reachable in one step from `self`.
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Quotation => &[Self::QuotationSent, Self::SalesOrder, Self::Cancelled],
            Self::QuotationSent => &[Self::Quotation, Self::SalesOrder, Self::Cancelled],
            Self::SalesOrder => &[Self::Done, Self::Cancelled],
            Self::Done => &[],
            Self::Cancelled => &[Self::Quotation],
        }
    }

    /// Whether an order in `self` may move to `next`. Staying put is always allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_transitions().contains(&next)
    }

    /// Display label, identical to the persisted form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Quotation => "Quotation",
            Self::QuotationSent => "Quotation Sent",
            Self::SalesOrder => "Sales Order",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for SalesOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Delivery progress of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Nothing shipped yet.
    #[default]
    #[serde(rename = "Pending Delivery")]
    PendingDelivery,
    /// Some lines shipped.
    #[serde(rename = "Partially Delivered")]
    PartiallyDelivered,
    /// Everything shipped.
    Delivered,
}

/// Payment progress of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Nothing paid.
    #[default]
    Unpaid,
    /// Partially paid.
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    /// Fully paid.
    Paid,
}

/// One priced line of an order or invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrderItem {
    /// Product reference.
    pub product_id: String,
    /// Product name as shown on the order.
    pub product_name: String,
    /// Units ordered.
    pub quantity: f64,
    /// Price per unit.
    pub unit_price: f64,
    /// Flat line discount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    /// Derived: `quantity * unit_price - discount`.
    pub subtotal: f64,
    /// Unmodelled line fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SalesOrderItem {
    /// Create a line with its subtotal already derived.
    #[must_use]
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: f64,
        unit_price: f64,
        discount: Option<f64>,
    ) -> Self {
        let mut item = Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            discount,
            subtotal: 0.0,
            extra: Map::new(),
        };
        item.subtotal = item.line_subtotal();
        item
    }
}

impl LineAmounts for SalesOrderItem {
    fn quantity(&self) -> f64 {
        self.quantity
    }

    fn unit_price(&self) -> f64 {
        self.unit_price
    }

    fn discount(&self) -> Option<f64> {
        self.discount
    }
}

/// A quotation or confirmed sales order.
///
/// `subtotal_before_tax`, `tax_amount` and `total` are derived from `items`
/// and `tax_rate`. `linked_invoice_ids` holds non-owning references into the
/// invoices collection; they should name existing invoices but nothing
/// enforces it (see [`crate::Store::dangling_invoice_links`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrder {
    /// Record id.
    pub id: String,
    /// Human-facing reference, e.g. `SO-001`.
    pub order_number: String,
    /// Customer display name.
    pub customer: String,
    /// Customer record reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Date the order was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: SalesOrderStatus,
    /// Delivery progress.
    pub delivery_status: DeliveryStatus,
    /// Payment progress.
    pub payment_status: PaymentStatus,
    /// ISO currency code.
    pub currency: String,
    /// Order lines.
    pub items: Vec<SalesOrderItem>,
    /// Tax rate in percent.
    pub tax_rate: f64,
    /// Derived: sum of line subtotals.
    pub subtotal_before_tax: f64,
    /// Derived: tax on the subtotal.
    pub tax_amount: f64,
    /// Derived: subtotal plus tax.
    pub total: f64,
    /// Invoices raised against this order.
    pub linked_invoice_ids: Vec<String>,
    /// Responsible salesperson.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SalesOrder {
    fn default() -> Self {
        Self {
            id: String::new(),
            order_number: String::new(),
            customer: String::new(),
            customer_id: None,
            order_date: None,
            status: SalesOrderStatus::default(),
            delivery_status: DeliveryStatus::default(),
            payment_status: PaymentStatus::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            items: Vec::new(),
            tax_rate: 0.0,
            subtotal_before_tax: 0.0,
            tax_amount: 0.0,
            total: 0.0,
            linked_invoice_ids: Vec::new(),
            salesperson: None,
            notes: None,
            extra: Map::new(),
        }
    }
}

impl SalesOrder {
    /// Re-derive every line subtotal and the order totals.
    pub fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.subtotal = item.line_subtotal();
        }
        let totals = calculate_order_totals(&self.items, self.tax_rate);
        self.subtotal_before_tax = totals.subtotal_before_tax;
        self.tax_amount = totals.tax_amount;
        self.total = totals.total;
    }
}

impl Record for SalesOrder {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Seed orders written on first use.
#[must_use]
pub fn initial_sales_orders() -> Vec<SalesOrder> {
    let mut orders = vec![
        SalesOrder {
            id: "so-001".to_string(),
            order_number: "SO-001".to_string(),
            customer: "Acme Corporation".to_string(),
            customer_id: Some("cust-001".to_string()),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            status: SalesOrderStatus::SalesOrder,
            items: vec![
                SalesOrderItem::new("prod-001", "Office Desk", 2.0, 1500.0, Some(50.0)),
                SalesOrderItem::new("prod-002", "Conference Table", 1.0, 2000.0, Some(50.0)),
            ],
            tax_rate: 8.0,
            salesperson: Some("Mitchell Admin".to_string()),
            ..SalesOrder::default()
        },
        SalesOrder {
            id: "so-002".to_string(),
            order_number: "SO-002".to_string(),
            customer: "Globex Industries".to_string(),
            customer_id: Some("cust-002".to_string()),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 22),
            status: SalesOrderStatus::Quotation,
            items: vec![SalesOrderItem::new(
                "prod-003",
                "Ergonomic Chair",
                6.0,
                320.0,
                None,
            )],
            tax_rate: 10.0,
            ..SalesOrder::default()
        },
    ];
    for order in &mut orders {
        order.recompute_totals();
    }
    orders
}
