//! Live visitors CLI - inspect the live report from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Who is online across all shops
//! vo-cli report
//!
//! # One shop, as JSON
//! vo-cli report --shop 1 --json
//!
//! # Show the maintenance IPs currently hidden from the report
//! vo-cli maintenance-ips
//!
//! # Check how a hand-edited list would be parsed
//! vo-cli maintenance-ips --raw "10.0.0.1, 10.0.0.2,typo"
//! ```
//!
//! # Commands
//!
//! - `report` - Print the customers and visitors currently online
//! - `maintenance-ips` - Print the normalized maintenance IP list

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vo-cli")]
#[command(author, version, about = "Live visitors report tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the customers and visitors currently online
    Report {
        /// Restrict to one shop
        #[arg(long, conflicts_with = "shop_group")]
        shop: Option<i32>,

        /// Restrict to one shop group
        #[arg(long)]
        shop_group: Option<i32>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the normalized maintenance IP list
    MaintenanceIps {
        /// Parse this value instead of reading the shop setting
        #[arg(long)]
        raw: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), commands::CommandError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Report {
            shop,
            shop_group,
            json,
        } => {
            let scope = commands::report::scope(shop, shop_group);
            commands::report::run(scope, json).await?;
        }
        Commands::MaintenanceIps { raw } => match raw {
            Some(raw) => commands::maintenance_ips::print_raw(&raw),
            None => commands::maintenance_ips::print_configured().await?,
        },
    }
    Ok(())
}
