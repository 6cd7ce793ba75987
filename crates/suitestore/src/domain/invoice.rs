//! Customer invoices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::sales::{SalesOrder, SalesOrderItem};
use super::DEFAULT_CURRENCY;
use crate::store::Record;
use crate::totals::{calculate_order_totals, LineAmounts};

/// Lifecycle of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Not yet posted.
    #[default]
    Draft,
    /// Posted and awaiting payment.
    Posted,
    /// Settled.
    Paid,
    /// Voided.
    Cancelled,
}

/// A customer invoice, optionally raised from a sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    /// Record id.
    pub id: String,
    /// Human-facing reference, e.g. `INV/2024/0001`.
    pub invoice_number: String,
    /// Customer display name.
    pub customer: String,
    /// Order this invoice was raised from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_order_id: Option<String>,
    /// Issue date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,
    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: InvoiceStatus,
    /// ISO currency code.
    pub currency: String,
    /// Invoice lines.
    pub items: Vec<SalesOrderItem>,
    /// Tax rate in percent.
    pub tax_rate: f64,
    /// Derived: sum of line subtotals.
    pub subtotal_before_tax: f64,
    /// Derived: tax on the subtotal.
    pub tax_amount: f64,
    /// Derived: subtotal plus tax.
    pub total: f64,
    /// Amount received so far.
    pub amount_paid: f64,
    /// Derived: `total - amount_paid`.
    pub amount_due: f64,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            id: String::new(),
            invoice_number: String::new(),
            customer: String::new(),
            sales_order_id: None,
            invoice_date: None,
            due_date: None,
            status: InvoiceStatus::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            items: Vec::new(),
            tax_rate: 0.0,
            subtotal_before_tax: 0.0,
            tax_amount: 0.0,
            total: 0.0,
            amount_paid: 0.0,
            amount_due: 0.0,
            extra: Map::new(),
        }
    }
}

impl Invoice {
    /// Draft invoice billing every line of `order`.
    #[must_use]
    pub fn from_sales_order(order: &SalesOrder, invoice_number: impl Into<String>) -> Self {
        let mut invoice = Self {
            invoice_number: invoice_number.into(),
            customer: order.customer.clone(),
            sales_order_id: Some(order.id.clone()),
            invoice_date: Some(chrono::Utc::now().date_naive()),
            currency: order.currency.clone(),
            items: order.items.clone(),
            tax_rate: order.tax_rate,
            ..Self::default()
        };
        invoice.recompute_totals();
        invoice
    }

    /// Re-derive line subtotals, totals and the amount due.
    pub fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.subtotal = item.line_subtotal();
        }
        let totals = calculate_order_totals(&self.items, self.tax_rate);
        self.subtotal_before_tax = totals.subtotal_before_tax;
        self.tax_amount = totals.tax_amount;
        self.total = totals.total;
        self.amount_due = self.total - self.amount_paid;
    }
}

impl Record for Invoice {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Seed invoices written on first use.
#[must_use]
pub fn initial_invoices() -> Vec<Invoice> {
    let mut invoice = Invoice {
        id: "inv-001".to_string(),
        invoice_number: "INV/2024/0001".to_string(),
        customer: "Initech".to_string(),
        invoice_date: NaiveDate::from_ymd_opt(2024, 1, 10),
        due_date: NaiveDate::from_ymd_opt(2024, 2, 9),
        status: InvoiceStatus::Posted,
        items: vec![SalesOrderItem::new(
            "prod-004",
            "Support Plan (annual)",
            1.0,
            1200.0,
            None,
        )],
        tax_rate: 5.0,
        amount_paid: 600.0,
        ..Invoice::default()
    };
    invoice.recompute_totals();
    vec![invoice]
}
