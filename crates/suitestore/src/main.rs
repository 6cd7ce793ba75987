//! `suitectl` - CLI for suitestore
//!
//! This binary opens the configured collection database and exposes the
//! record store operations from the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::Value;

use suitestore::cli::{
    AddCommand, Cli, Command, ConfigCommand, DeleteCommand, ListCommand, OutputFormat,
    UpdateCommand,
};
use suitestore::{
    init_logging, CollectionKey, Config, Customer, Entity, Invoice, KeyValueStore, Lead,
    Mutation, Opportunity, Patch, PosSession, Record, SalesOrder, SalesOrderStatus, SqliteStore,
    Store,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => {
            let store = open_store(&config)?;
            run(&store, command)
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<Store<SqliteStore>> {
    let path = config.database_path();
    let kv = SqliteStore::open(&path)
        .with_context(|| format!("opening {}", path.display()))?
        .with_quota(config.max_value_bytes());
    Ok(Store::with_options(kv, config.store_options()))
}

fn run(store: &Store<SqliteStore>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Keys => handle_keys(store),
        Command::List(cmd) => handle_list(store, &cmd),
        Command::Add(cmd) => handle_add(store, &cmd),
        Command::Update(cmd) => handle_update(store, &cmd),
        Command::Delete(cmd) => handle_delete(store, &cmd),
        Command::Link(cmd) => {
            let outcome = store.link_invoice(&cmd.order_id, &cmd.invoice_id)?;
            require_found(&outcome, CollectionKey::SalesOrders, &cmd.order_id)?;
            println!("Linked {} to {}", cmd.invoice_id, cmd.order_id);
            Ok(())
        }
        Command::Invoice(cmd) => {
            let Some(invoice) = store.create_invoice_for_order(&cmd.order_id)? else {
                bail!("no sales order with id '{}'", cmd.order_id);
            };
            println!(
                "Created {} ({}) total {:.2} {}",
                invoice.invoice_number, invoice.id, invoice.total, invoice.currency
            );
            Ok(())
        }
        Command::Transition(cmd) => {
            let status = SalesOrderStatus::from(cmd.status);
            let outcome = store.transition_sales_order(&cmd.order_id, status)?;
            require_found(&outcome, CollectionKey::SalesOrders, &cmd.order_id)?;
            println!("{} is now {}", cmd.order_id, status);
            Ok(())
        }
        Command::CheckLinks(cmd) => {
            let dangling = store.dangling_invoice_links()?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&dangling)?);
            } else if dangling.is_empty() {
                println!("All invoice links resolve.");
            } else {
                for link in &dangling {
                    println!(
                        "{} -> {} (missing)",
                        link.sales_order_id, link.invoice_id
                    );
                }
            }
            Ok(())
        }
        Command::Stats => handle_stats(store),
        Command::Config(_) => Ok(()),
    }
}

fn handle_keys(store: &Store<SqliteStore>) -> anyhow::Result<()> {
    println!("{:<14} {:<20} {}", "COLLECTION", "KEY", "LAST WRITE");
    for key in CollectionKey::ALL {
        let last_write = match store.kv().updated_at(key.storage_key())? {
            Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "-".to_string(),
        };
        println!("{:<14} {:<20} {}", key.name(), key.storage_key(), last_write);
    }
    Ok(())
}

fn handle_list(store: &Store<SqliteStore>, cmd: &ListCommand) -> anyhow::Result<()> {
    let key = CollectionKey::from(cmd.collection);
    match key {
        CollectionKey::Opportunities => print_records(&store.load::<Opportunity>()?, cmd.format),
        CollectionKey::Leads => print_records(&store.load::<Lead>()?, cmd.format),
        CollectionKey::Customers => print_records(&store.load::<Customer>()?, cmd.format),
        CollectionKey::SalesOrders => print_records(&store.load::<SalesOrder>()?, cmd.format),
        CollectionKey::Invoices => print_records(&store.load::<Invoice>()?, cmd.format),
        CollectionKey::PosSessions => print_records(&store.load::<PosSession>()?, cmd.format),
        _ => print_records(
            &store.get_stored_data::<Value>(key.storage_key(), Vec::new())?,
            cmd.format,
        ),
    }
}

fn handle_add(store: &Store<SqliteStore>, cmd: &AddCommand) -> anyhow::Result<()> {
    let key = CollectionKey::from(cmd.collection);
    let id = match key {
        CollectionKey::Opportunities => add_typed::<Opportunity>(store, &cmd.json)?,
        CollectionKey::Leads => add_typed::<Lead>(store, &cmd.json)?,
        CollectionKey::Customers => add_typed::<Customer>(store, &cmd.json)?,
        CollectionKey::SalesOrders => add_typed::<SalesOrder>(store, &cmd.json)?,
        CollectionKey::Invoices => add_typed::<Invoice>(store, &cmd.json)?,
        CollectionKey::PosSessions => add_typed::<PosSession>(store, &cmd.json)?,
        _ => {
            let record: Value = serde_json::from_str(&cmd.json).context("parsing record")?;
            if !record.is_object() {
                bail!("record must be a JSON object");
            }
            last_id(&store.add_record(key.storage_key(), record)?)
        }
    };
    println!("Added {id} to {key}");
    Ok(())
}

fn add_typed<E: Entity>(store: &Store<SqliteStore>, json: &str) -> anyhow::Result<String> {
    let raw: Value = serde_json::from_str(json).context("parsing record")?;
    let record = E::from_json(raw).with_context(|| format!("record does not fit {}", E::KEY))?;
    Ok(last_id(&store.add_entity(record)?))
}

fn last_id<T: Record>(records: &[T]) -> String {
    records
        .last()
        .map(|record| record.id().to_string())
        .unwrap_or_default()
}

fn handle_update(store: &Store<SqliteStore>, cmd: &UpdateCommand) -> anyhow::Result<()> {
    let key = CollectionKey::from(cmd.collection);
    let updates = parse_patch(&cmd.json)?;
    let id = cmd.id.as_str();
    let found = match key {
        CollectionKey::Opportunities => store.update_entity::<Opportunity>(id, &updates)?.is_found(),
        CollectionKey::Leads => store.update_entity::<Lead>(id, &updates)?.is_found(),
        CollectionKey::Customers => store.update_entity::<Customer>(id, &updates)?.is_found(),
        CollectionKey::SalesOrders => store.update_sales_order(id, &updates)?.is_found(),
        CollectionKey::Invoices => store.update_entity::<Invoice>(id, &updates)?.is_found(),
        CollectionKey::PosSessions => store.update_entity::<PosSession>(id, &updates)?.is_found(),
        _ => store
            .update_record::<Value>(key.storage_key(), id, &updates)?
            .is_found(),
    };
    if !found {
        bail!("no record with id '{id}' in {key}");
    }
    println!("Updated {id} in {key}");
    Ok(())
}

fn handle_delete(store: &Store<SqliteStore>, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let key = CollectionKey::from(cmd.collection);
    let id = cmd.id.as_str();
    let found = match key {
        CollectionKey::Opportunities => store.delete_entity::<Opportunity>(id)?.is_found(),
        CollectionKey::Leads => store.delete_entity::<Lead>(id)?.is_found(),
        CollectionKey::Customers => store.delete_entity::<Customer>(id)?.is_found(),
        CollectionKey::SalesOrders => store.delete_entity::<SalesOrder>(id)?.is_found(),
        CollectionKey::Invoices => store.delete_entity::<Invoice>(id)?.is_found(),
        CollectionKey::PosSessions => store.delete_entity::<PosSession>(id)?.is_found(),
        _ => store
            .delete_record::<Value>(key.storage_key(), id)?
            .is_found(),
    };
    if !found {
        bail!("no record with id '{id}' in {key}");
    }
    println!("Deleted {id} from {key}");
    Ok(())
}

fn parse_patch(json: &str) -> anyhow::Result<Patch> {
    match serde_json::from_str(json).context("parsing patch")? {
        Value::Object(fields) => Ok(fields),
        _ => bail!("patch must be a JSON object"),
    }
}

fn require_found<T>(outcome: &Mutation<T>, key: CollectionKey, id: &str) -> anyhow::Result<()> {
    if !outcome.is_found() {
        bail!("no record with id '{id}' in {key}");
    }
    Ok(())
}

fn print_records<T: Record>(records: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Plain => {
            for record in records {
                println!("{}", record.id());
            }
        }
        OutputFormat::Table => {
            println!("{:<38} RECORD", "ID");
            for record in records {
                let mut summary = serde_json::to_string(record)?;
                if summary.chars().count() > 80 {
                    summary = summary.chars().take(77).collect::<String>() + "...";
                }
                println!("{:<38} {}", record.id(), summary);
            }
            println!("({} records)", records.len());
        }
    }
    Ok(())
}

fn handle_stats(store: &Store<SqliteStore>) -> anyhow::Result<()> {
    let kv = store.kv();
    let stats = kv.stats()?;
    println!("suitectl stats");
    println!("--------------");
    println!("Database:      {}", kv.path().display());
    println!("Collections:   {} of {}", stats.collections, CollectionKey::ALL.len());
    println!("Stored keys:   {}", kv.keys()?.join(", "));
    println!("Value bytes:   {}", stats.total_value_bytes);
    println!("File size:     {}", stats.db_size_bytes);
    match stats.last_write {
        Some(at) => println!("Last write:    {}", at.to_rfc3339()),
        None => println!("Last write:    never"),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                match config.max_value_bytes() {
                    Some(limit) => println!("  Max value bytes:    {limit}"),
                    None => println!("  Max value bytes:    unlimited"),
                }
                println!();
                println!("[Store]");
                println!("  Id strategy:        {}", config.store.id_strategy);
                println!("  On corrupt data:    {:?}", config.store.on_corrupt);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
