//! Command-line interface for suitestore.
//!
//! This module provides the CLI structure for the `suitectl` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, CheckLinksCommand, CollectionArg, ConfigCommand, DeleteCommand, InvoiceCommand,
    LinkCommand, ListCommand, OutputFormat, StatusArg, TransitionCommand, UpdateCommand,
};

/// suitectl - Inspect and edit the business suite's stored collections
///
/// Reads and writes the same collections the suite persists, applying
/// the same defaulting, total recomputation and status rules.
#[derive(Debug, Parser)]
#[command(name = "suitectl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered collections and their storage keys
    Keys,

    /// Print the records of a collection
    List(ListCommand),

    /// Append a record to a collection
    Add(AddCommand),

    /// Patch a record by id
    Update(UpdateCommand),

    /// Remove a record by id
    Delete(DeleteCommand),

    /// Attach an invoice id to a sales order
    Link(LinkCommand),

    /// Raise a draft invoice from a sales order
    Invoice(InvoiceCommand),

    /// Move a sales order to another status
    Transition(TransitionCommand),

    /// Report order references to missing invoices
    CheckLinks(CheckLinksCommand),

    /// Show database statistics
    Stats,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
