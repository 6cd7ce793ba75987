//! Registry of collection keys.
//!
//! Every collection the suite persists lives under exactly one storage key.
//! Adding a module means adding a variant here and, optionally, a hydrator.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix shared by every persisted collection key.
pub const KEY_PREFIX: &str = "suite:";

/// A named record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKey {
    /// CRM pipeline opportunities.
    Opportunities,
    /// CRM leads.
    Leads,
    /// Customer directory.
    Customers,
    /// Product catalog.
    Products,
    /// Quotations and sales orders.
    SalesOrders,
    /// Customer invoices.
    Invoices,
    /// Point-of-sale sessions.
    PosSessions,
    /// Point-of-sale orders.
    PosOrders,
    /// Rental orders.
    RentalOrders,
    /// Employee directory.
    Employees,
    /// Scheduled activities.
    Activities,
}

impl CollectionKey {
    /// Every registered collection, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Opportunities,
        Self::Leads,
        Self::Customers,
        Self::Products,
        Self::SalesOrders,
        Self::Invoices,
        Self::PosSessions,
        Self::PosOrders,
        Self::RentalOrders,
        Self::Employees,
        Self::Activities,
    ];

    /// Logical collection name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Opportunities => "opportunities",
            Self::Leads => "leads",
            Self::Customers => "customers",
            Self::Products => "products",
            Self::SalesOrders => "salesOrders",
            Self::Invoices => "invoices",
            Self::PosSessions => "posSessions",
            Self::PosOrders => "posOrders",
            Self::RentalOrders => "rentalOrders",
            Self::Employees => "employees",
            Self::Activities => "activities",
        }
    }

    /// Key the collection is persisted under.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Opportunities => "suite:opportunities",
            Self::Leads => "suite:leads",
            Self::Customers => "suite:customers",
            Self::Products => "suite:products",
            Self::SalesOrders => "suite:salesOrders",
            Self::Invoices => "suite:invoices",
            Self::PosSessions => "suite:posSessions",
            Self::PosOrders => "suite:posOrders",
            Self::RentalOrders => "suite:rentalOrders",
            Self::Employees => "suite:employees",
            Self::Activities => "suite:activities",
        }
    }

    /// Resolve a logical name such as `"salesOrders"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCollection`] if no key has that name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == name)
            .ok_or_else(|| Error::UnknownCollection(name.to_string()))
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_storage_keys_are_prefixed_names() {
        for key in CollectionKey::ALL {
            assert_eq!(key.storage_key(), format!("{KEY_PREFIX}{}", key.name()));
        }
    }

    #[test]
    fn test_storage_keys_unique() {
        let keys: HashSet<_> = CollectionKey::ALL.iter().map(|k| k.storage_key()).collect();
        assert_eq!(keys.len(), CollectionKey::ALL.len());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            CollectionKey::from_name("salesOrders").unwrap(),
            CollectionKey::SalesOrders
        );
        assert_eq!(
            CollectionKey::from_name("posSessions").unwrap(),
            CollectionKey::PosSessions
        );
    }

    #[test]
    fn test_from_name_unknown() {
        let err = CollectionKey::from_name("widgets").unwrap_err();
        assert!(matches!(err, Error::UnknownCollection(name) if name == "widgets"));
    }

    #[test]
    fn test_display_and_serde_use_logical_name() {
        assert_eq!(CollectionKey::SalesOrders.to_string(), "salesOrders");
        let json = serde_json::to_string(&CollectionKey::PosSessions).unwrap();
        assert_eq!(json, "\"posSessions\"");
    }
}
