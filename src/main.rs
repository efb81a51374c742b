//! Tracker CLI - Command-line interface for the parcel record store

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracker::config::{self, TrackerConfig};
use tracker::storage;
use tracker::ui::{self, Icons};
use tracker::{Parcel, ParcelService, ParcelStatus, ParcelStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(version)]
#[command(about = "Parcel tracker - register, follow and update parcels")]
#[command(long_about = r#"
Tracker keeps parcel records in a SQLite database.

Example usage:
  tracker init
  tracker register --client 1000 --address "Lenina 1"
  tracker list --client 1000
  tracker advance 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database schema
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Register a new parcel
    Register {
        /// Client identifier
        #[arg(long)]
        client: i64,

        /// Delivery address
        #[arg(long)]
        address: String,
    },

    /// Show a single parcel
    Show {
        number: i64,
    },

    /// List all parcels of a client
    List {
        /// Client identifier
        #[arg(long)]
        client: i64,
    },

    /// Change the address of a parcel that has not been sent
    SetAddress {
        number: i64,
        address: String,
    },

    /// Overwrite the status of a parcel (registered, sent, delivered)
    SetStatus {
        number: i64,
        status: String,
    },

    /// Move a parcel to its next status
    Advance {
        number: i64,
    },

    /// Delete a parcel that has not been sent
    Delete {
        number: i64,
    },

    /// Show database statistics
    Stats,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_FILE));
    let loaded = TrackerConfig::load(&config_path)?;
    let db_path = config::resolve_database_path(cli.database.as_deref(), loaded.as_ref());

    match cli.command {
        Commands::Init { force } => run_init(&config_path, &db_path, force, cli.json),
        command => run_command(command, &db_path, cli.json),
    }
}

fn run_init(config_path: &Path, db_path: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    // refuse before the database file is touched
    config::ensure_writable(config_path, force)?;
    storage::open(db_path)?;

    let tracker_config = TrackerConfig {
        database: Some(db_path.to_string_lossy().to_string()),
    };
    tracker_config.save(config_path, force)?;
    tracing::info!("Initialized tracker at {}", db_path.display());

    if json {
        emit_json("init", &tracker_config)?;
    } else {
        ui::success("Tracker initialized");
        ui::info("Config", &config_path.display().to_string());
        ui::info("Database", &db_path.display().to_string());
    }
    Ok(())
}

fn run_command(command: Commands, db_path: &Path, json: bool) -> anyhow::Result<()> {
    let conn = storage::open(db_path)?;
    let store = ParcelStore::new(&conn);
    let service = ParcelService::new(&store);

    match command {
        Commands::Init { .. } => unreachable!("init is dispatched before the database is opened"),

        Commands::Register { client, address } => {
            let parcel = service.register(client, &address)?;
            if json {
                emit_json("register", &parcel)?;
            } else {
                ui::success(&format!("Registered parcel {}", parcel.number));
                print_parcel(&parcel);
            }
        }

        Commands::Show { number } => {
            let parcel = service.parcel(number)?;
            if json {
                emit_json("show", &parcel)?;
            } else {
                print_parcel(&parcel);
            }
        }

        Commands::List { client } => {
            let parcels = service.client_parcels(client)?;
            if json {
                emit_json("list", &parcels)?;
            } else if parcels.is_empty() {
                println!("{} {}", Icons::EMPTY, ui::dim(&format!("No parcels for client {}", client)));
            } else {
                ui::header(&format!("Parcels of client {}", client));
                println!("{}", ui::parcel_table(&parcels));
            }
        }

        Commands::SetAddress { number, address } => {
            service.change_address(number, &address)?;
            if json {
                emit_json("set-address", &serde_json::json!({ "number": number, "address": address }))?;
            } else {
                ui::success(&format!("Parcel {} will be delivered to {}", number, address));
            }
        }

        Commands::SetStatus { number, status } => {
            let status: ParcelStatus = status.parse()?;
            let current = service.parcel(number)?;
            if status < current.status && !json {
                ui::warn(&format!(
                    "Moving parcel {} back from {} to {}",
                    number, current.status, status
                ));
            }
            store.set_status(number, status)?;
            if json {
                emit_json("set-status", &serde_json::json!({ "number": number, "status": status }))?;
            } else {
                ui::success(&format!("Parcel {} is now {}", number, ui::status_label(status)));
            }
        }

        Commands::Advance { number } => {
            let status = service.next_status(number)?;
            if json {
                emit_json("advance", &serde_json::json!({ "number": number, "status": status }))?;
            } else {
                println!("{} Parcel {} is now {}", Icons::TRUCK, number, ui::status_label(status));
            }
        }

        Commands::Delete { number } => {
            service.delete(number)?;
            if json {
                emit_json("delete", &serde_json::json!({ "number": number }))?;
            } else {
                println!("{} Deleted parcel {}", Icons::DEL, number);
            }
        }

        Commands::Stats => {
            let count = store.count()?;
            if json {
                emit_json("stats", &serde_json::json!({
                    "database": db_path.display().to_string(),
                    "parcels": count,
                }))?;
            } else {
                ui::section(&format!("{} Tracker Statistics", Icons::STATS));
                ui::summary_row(&format!("{} Database:", Icons::DATABASE), &db_path.display().to_string());
                ui::summary_row(&format!("{} Parcels:", Icons::PACKAGE), &count.to_string());
            }
        }
    }

    Ok(())
}

fn print_parcel(parcel: &Parcel) {
    ui::section(&format!("Parcel {}", parcel.number));
    ui::summary_row(&format!("{} Client:", Icons::PERSON), &parcel.client.to_string());
    ui::summary_row(&format!("{} Status:", Icons::TRUCK), &ui::status_label(parcel.status));
    ui::summary_row(&format!("{} Address:", Icons::HOUSE), &parcel.address);
    ui::summary_row(&format!("{} Created:", Icons::CLOCK), &parcel.created_at);
}

fn emit_json<T: Serialize>(command: &str, data: &T) -> anyhow::Result<()> {
    let payload = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
