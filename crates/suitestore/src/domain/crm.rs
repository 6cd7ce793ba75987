//! CRM records: opportunities, leads and customers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Record;

/// Pipeline stage of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OpportunityStage {
    /// Freshly created.
    #[default]
    New,
    /// Need confirmed.
    Qualified,
    /// Proposal sent.
    Proposition,
    /// Closed and won.
    Won,
    /// Closed and lost.
    Lost,
}

/// A deal in the CRM pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Opportunity {
    /// Record id.
    pub id: String,
    /// Deal name.
    pub name: String,
    /// Customer display name.
    pub customer: String,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expected revenue in the company currency.
    pub expected_revenue: f64,
    /// Win probability in percent.
    pub probability: f64,
    /// Pipeline stage.
    pub stage: OpportunityStage,
    /// Star rating, 0 to 3.
    pub priority: u8,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Expected close date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_closing: Option<NaiveDate>,
    /// Responsible salesperson.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Opportunity {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Qualification status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    /// Not contacted yet.
    #[default]
    New,
    /// Reached out.
    Contacted,
    /// Worth converting.
    Qualified,
    /// Dropped.
    Lost,
}

/// An unqualified prospect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lead {
    /// Record id.
    pub id: String,
    /// Lead title.
    pub name: String,
    /// Contact person.
    pub contact_name: String,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Prospect company.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Where the lead came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Qualification status.
    pub status: LeadStatus,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Opportunity created from this lead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_opportunity_id: Option<String>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Lead {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A customer in the shared directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Whether this is a company rather than a person.
    pub is_company: bool,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Customer {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Seed opportunities written on first use.
#[must_use]
pub fn initial_opportunities() -> Vec<Opportunity> {
    vec![
        Opportunity {
            id: "opp-001".to_string(),
            name: "Office furniture refresh".to_string(),
            customer: "Acme Corporation".to_string(),
            email: Some("purchasing@acme.example".to_string()),
            expected_revenue: 25_000.0,
            probability: 40.0,
            stage: OpportunityStage::Qualified,
            priority: 2,
            tags: vec!["furniture".to_string()],
            expected_closing: NaiveDate::from_ymd_opt(2024, 3, 31),
            salesperson: Some("Mitchell Admin".to_string()),
            ..Opportunity::default()
        },
        Opportunity {
            id: "opp-002".to_string(),
            name: "Warehouse shelving".to_string(),
            customer: "Globex Industries".to_string(),
            expected_revenue: 8_000.0,
            probability: 100.0,
            stage: OpportunityStage::Won,
            ..Opportunity::default()
        },
    ]
}

/// Seed leads written on first use.
#[must_use]
pub fn initial_leads() -> Vec<Lead> {
    vec![Lead {
        id: "lead-001".to_string(),
        name: "Interest in ergonomic chairs".to_string(),
        contact_name: "Dana Whitfield".to_string(),
        email: Some("dana@hooli.example".to_string()),
        company: Some("Hooli".to_string()),
        source: Some("Website".to_string()),
        ..Lead::default()
    }]
}

/// Seed customers written on first use.
#[must_use]
pub fn initial_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "cust-001".to_string(),
            name: "Acme Corporation".to_string(),
            email: Some("billing@acme.example".to_string()),
            is_company: true,
            ..Customer::default()
        },
        Customer {
            id: "cust-002".to_string(),
            name: "Globex Industries".to_string(),
            email: Some("ap@globex.example".to_string()),
            is_company: true,
            ..Customer::default()
        },
    ]
}
