use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

mod config;
mod db;
mod error;
mod import;
mod models;
mod report;
mod shell;

#[derive(Parser)]
#[command(name = "cane-harvest-tracker")]
#[command(about = "Data entry and loss reporting for sugarcane harvests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive menu (the default when no command is given)
    Shell,
    /// Create the records table if it is missing
    InitDb,
    /// Register one harvest without entering the shell
    Register {
        #[arg(long)]
        area: Decimal,
        #[arg(long)]
        harvester: String,
        #[arg(long)]
        total: Decimal,
        #[arg(long)]
        lost: Decimal,
    },
    /// Print aggregate loss statistics
    Stats,
    /// List all records, oldest harvest first
    List,
    /// Bulk-import records from a JSON array
    Import {
        #[arg(long)]
        json: PathBuf,
    },
    /// Write all records as a JSON array in the import format
    Export {
        #[arg(long, default_value = "colheitas.json")]
        out: PathBuf,
    },
    /// Write a markdown loss report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cane_harvest_tracker=info,sqlx=warn".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = config::DatabaseConfig::from_env();

    // Lazy pool: nothing connects until the first query, so a missing
    // database degrades to per-operation storage errors instead of
    // preventing the shell from starting.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&config.connect_url())
        .context("invalid database connection settings")?;

    if let Err(err) = db::ensure_schema(&pool).await {
        tracing::warn!("schema bootstrap failed, storage operations will report errors: {err}");
    }

    match cli.command {
        None | Some(Commands::Shell) => shell::run(&pool).await,
        Some(Commands::InitDb) => {
            db::ensure_schema(&pool).await?;
            println!("Schema ready.");
        }
        Some(Commands::Register {
            area,
            harvester,
            total,
            lost,
        }) => {
            let record = shell::registration_record(area, harvester.trim(), total, lost)?;
            db::insert_record(&pool, &record).await?;
            println!(
                "Harvest registered for {}: {:.2}% loss.",
                record.harvester_id, record.loss_percentage
            );
        }
        Some(Commands::Stats) => shell::statistics(&pool).await?,
        Some(Commands::List) => shell::list(&pool).await?,
        Some(Commands::Import { json }) => {
            let outcome = import::import_json(&pool, &json).await?;
            println!(
                "Imported {} records from {}, {} failed.",
                outcome.imported,
                json.display(),
                outcome.failed
            );
        }
        Some(Commands::Export { out }) => {
            let records = db::fetch_records(&pool).await?;
            let json = serde_json::to_string_pretty(&records)?;
            std::fs::write(&out, json)?;
            println!("Exported {} records to {}.", records.len(), out.display());
        }
        Some(Commands::Report { out }) => {
            let records = db::fetch_records(&pool).await?;
            let report = report::build_report(&records);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
