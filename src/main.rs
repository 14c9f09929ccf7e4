use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use rust_recordbook::{
    gather_metrics, suggest_export_path, CsvMode, FieldKind, FieldValues, Record, RecordStore,
    SchemaKind, SearchMode, StoreConfig, AMOUNT_FIELD, NAME_FIELD, TIMESTAMP_FORMAT,
};

#[derive(Parser)]
#[clap(name = "recordbook")]
#[clap(version)]
#[clap(about = "Attendance, customer and visitor logs in a local SQLite file")]
struct Cli {
    /// JSON config file (db_path, schema, cache_capacity, csv_mode, search_mode)
    #[clap(short, long, env = "RECORDBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Database file; defaults to the preset's file (attendance.db, customers.db, visitors.db)
    #[clap(short, long, env = "RECORDBOOK_DB")]
    db: Option<PathBuf>,

    /// Which log to open when no config file is given
    #[clap(short, long, value_enum, default_value = "attendance")]
    schema: SchemaKind,

    /// Print records as JSON
    #[clap(long)]
    json: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a record: FIELD=VALUE pairs. Timestamp fields default to now.
    Add {
        #[clap(required = true)]
        values: Vec<String>,
    },

    /// List every record in insertion order
    List,

    /// Substring search (SQL LIKE semantics unless --literal)
    Search {
        pattern: String,

        #[clap(long, default_value = NAME_FIELD)]
        field: String,

        /// Treat % and _ as plain characters
        #[clap(long)]
        literal: bool,
    },

    /// Show the details of one record
    Show { id: i64 },

    /// Delete every record (ids are not reused)
    Clear {
        /// Confirm the irreversible delete
        #[clap(long)]
        yes: bool,
    },

    /// Sum a decimal field over all records
    Sum {
        #[clap(long, default_value = AMOUNT_FIELD)]
        field: String,
    },

    /// Replace the amount of an existing customer record
    UpdateAmount { id: i64, amount: String },

    /// Export all records to a CSV file
    Export {
        /// Destination; ".csv" is appended when there is no extension
        path: Option<PathBuf>,

        /// Quote values containing commas, quotes or newlines
        #[clap(long)]
        quoted: bool,
    },

    /// Amount per customer name (the data behind the purchase chart)
    Totals {
        #[clap(long, default_value = AMOUNT_FIELD)]
        field: String,
    },

    /// Print operation metrics in Prometheus text format
    Metrics,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)?,
        None => StoreConfig::for_preset(cli.schema),
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }

    let store = config
        .open_store()
        .with_context(|| format!("cannot open {}", config.db_path.display()))?;

    run(&cli, &config, &store)?;
    store.close()?;
    Ok(())
}

fn run(cli: &Cli, config: &StoreConfig, store: &RecordStore) -> Result<()> {
    match &cli.command {
        Commands::Add { values } => {
            let mut input = FieldValues::new();
            for assignment in values {
                input.parse_assignment(assignment)?;
            }
            // как DateTime picker в формах: по умолчанию текущее время
            for field in &store.schema().fields {
                if field.kind == FieldKind::Timestamp && !input.contains(&field.name) {
                    input.set(&field.name, Local::now().format(TIMESTAMP_FORMAT).to_string());
                }
            }
            let record = store.insert(&input)?;
            print_records(cli, store, &[record])?;
        }
        Commands::List => print_records(cli, store, &store.list_all()?)?,
        Commands::Search {
            pattern,
            field,
            literal,
        } => {
            let mode = if *literal {
                SearchMode::Literal
            } else {
                store.search_mode()
            };
            print_records(cli, store, &store.search_with(field, pattern, mode)?)?;
        }
        Commands::Show { id } => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&store.get(*id)?)?);
            } else {
                println!("{}", store.details(*id)?);
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to clear all records without --yes (this cannot be undone)");
            }
            let deleted = store.clear_all()?;
            println!("All records cleared ({deleted}).");
        }
        Commands::Sum { field } => {
            println!("Total {field}: {}", format_total(store.sum(field)?));
        }
        Commands::UpdateAmount { id, amount } => {
            let record = store.update_amount(*id, amount)?;
            print_records(cli, store, &[record])?;
        }
        Commands::Export { path, quoted } => {
            let path = path
                .clone()
                .unwrap_or_else(|| suggest_export_path(&store.schema().table));
            let mode = if *quoted { CsvMode::Quoted } else { config.csv_mode };
            store.export_table()?.write_csv(&path, mode)?;
            println!("Exported {} data to {}", store.schema().table, path.display());
        }
        Commands::Totals { field } => {
            for (name, amount) in store.amount_by_name(field)? {
                println!("{name}\t{}", format_total(amount));
            }
        }
        Commands::Metrics => print!("{}", gather_metrics()),
    }
    Ok(())
}

fn print_records(cli: &Cli, store: &RecordStore, records: &[Record]) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    println!("{}", store.schema().column_names().join("\t"));
    for record in records {
        println!("{}", record.to_row().join("\t"));
    }
    Ok(())
}

/// Итог с той же точностью, что и хранимые суммы
fn format_total(total: f64) -> String {
    format!("{total:.2}")
}
