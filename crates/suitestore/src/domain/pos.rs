//! Point-of-sale sessions.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DEFAULT_CURRENCY;
use crate::store::Record;
use crate::totals::LineAmounts;

/// Whether a register session accepts orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PosSessionStatus {
    /// Accepting orders.
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    /// Closing control in progress.
    #[serde(rename = "Closing Control")]
    ClosingControl,
    /// Closed and posted.
    Closed,
}

/// A line in the order currently being rung up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosOrderItem {
    /// Product reference.
    pub product_id: String,
    /// Product name on the ticket.
    pub product_name: String,
    /// Units.
    pub quantity: f64,
    /// Price per unit.
    pub unit_price: f64,
    /// Flat line discount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    /// Unmodelled line fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineAmounts for PosOrderItem {
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

/// A register session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosSession {
    /// Record id.
    pub id: String,
    /// Session reference, e.g. `POS/0001`.
    pub name: String,
    /// Cashier on duty.
    pub cashier: String,
    /// Session status.
    pub status: PosSessionStatus,
    /// When the session was opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    /// When the session was closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Cash in the drawer at opening.
    pub opening_cash: f64,
    /// ISO currency code.
    pub currency: String,
    /// Lines of the order currently on screen.
    pub current_order_items: Vec<PosOrderItem>,
    /// Takings of all validated orders in this session.
    pub total_sales: f64,
    /// Ids of orders validated in this session.
    pub order_ids: Vec<String>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PosSession {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            cashier: String::new(),
            status: PosSessionStatus::default(),
            opened_at: None,
            closed_at: None,
            opening_cash: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
            current_order_items: Vec::new(),
            total_sales: 0.0,
            order_ids: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl PosSession {
    /// Untaxed value of the order currently being rung up.
    #[must_use]
    pub fn current_order_subtotal(&self) -> f64 {
        self.current_order_items
            .iter()
            .fold(0.0, |acc, item| acc + item.line_subtotal())
    }
}

impl Record for PosSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Seed sessions written on first use.
#[must_use]
pub fn initial_pos_sessions() -> Vec<PosSession> {
    vec![PosSession {
        id: "pos-001".to_string(),
        name: "POS/0001".to_string(),
        cashier: "Mitchell Admin".to_string(),
        opened_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).single(),
        opening_cash: 200.0,
        ..PosSession::default()
    }]
}
