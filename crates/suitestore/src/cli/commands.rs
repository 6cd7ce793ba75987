//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::domain::SalesOrderStatus;
use crate::keys::CollectionKey;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Collection to read
    #[arg(value_enum)]
    pub collection: CollectionArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Collection to append to
    #[arg(value_enum)]
    pub collection: CollectionArg,

    /// Record as a JSON object; an id is generated when absent
    pub json: String,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Collection holding the record
    #[arg(value_enum)]
    pub collection: CollectionArg,

    /// Id of the record to patch
    pub id: String,

    /// Fields to overwrite, as a JSON object
    pub json: String,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Collection holding the record
    #[arg(value_enum)]
    pub collection: CollectionArg,

    /// Id of the record to remove
    pub id: String,
}

/// Link command arguments.
#[derive(Debug, Args)]
pub struct LinkCommand {
    /// Sales order id
    pub order_id: String,

    /// Invoice id to attach
    pub invoice_id: String,
}

/// Invoice command arguments.
#[derive(Debug, Args)]
pub struct InvoiceCommand {
    /// Sales order to invoice
    pub order_id: String,
}

/// Transition command arguments.
#[derive(Debug, Args)]
pub struct TransitionCommand {
    /// Sales order id
    pub order_id: String,

    /// Target status
    #[arg(value_enum)]
    pub status: StatusArg,
}

/// Check-links command arguments.
#[derive(Debug, Args)]
pub struct CheckLinksCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Collection argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollectionArg {
    /// CRM opportunities
    Opportunities,
    /// CRM leads
    Leads,
    /// Customers
    Customers,
    /// Products
    Products,
    /// Quotations and sales orders
    SalesOrders,
    /// Invoices
    Invoices,
    /// Point-of-sale sessions
    PosSessions,
    /// Point-of-sale orders
    PosOrders,
    /// Rental orders
    RentalOrders,
    /// Employees
    Employees,
    /// Activities
    Activities,
}

impl From<CollectionArg> for CollectionKey {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Opportunities => Self::Opportunities,
            CollectionArg::Leads => Self::Leads,
            CollectionArg::Customers => Self::Customers,
            CollectionArg::Products => Self::Products,
            CollectionArg::SalesOrders => Self::SalesOrders,
            CollectionArg::Invoices => Self::Invoices,
            CollectionArg::PosSessions => Self::PosSessions,
            CollectionArg::PosOrders => Self::PosOrders,
            CollectionArg::RentalOrders => Self::RentalOrders,
            CollectionArg::Employees => Self::Employees,
            CollectionArg::Activities => Self::Activities,
        }
    }
}

/// Sales order status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Draft quotation
    Quotation,
    /// Quotation sent to the customer
    QuotationSent,
    /// Confirmed order
    SalesOrder,
    /// Fulfilled
    Done,
    /// Cancelled
    Cancelled,
}

impl From<StatusArg> for SalesOrderStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Quotation => Self::Quotation,
            StatusArg::QuotationSent => Self::QuotationSent,
            StatusArg::SalesOrder => Self::SalesOrder,
            StatusArg::Done => Self::Done,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One id per line
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
