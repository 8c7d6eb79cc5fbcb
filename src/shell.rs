use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::db;
use crate::error::HarvestError;
use crate::import;
use crate::models::HarvestRecord;
use crate::report;

/// The blocking menu loop. Every failure inside an iteration is printed and
/// the menu comes back; the loop only ends on the exit option or when stdin
/// closes.
pub async fn run(pool: &PgPool) {
    let stdin = io::stdin();
    let mut input = stdin.lock().lines();

    loop {
        println!();
        println!("=== Sugarcane Harvest Tracker ===");
        println!("1. Register new harvest");
        println!("2. View loss statistics");
        println!("3. List all records");
        println!("4. Import records from JSON");
        println!("5. Exit");

        let Some(choice) = prompt(&mut input, "Select an option: ") else {
            break;
        };

        let outcome = match choice.as_str() {
            "1" => register(pool, &mut input).await,
            "2" => statistics(pool).await,
            "3" => list(pool).await,
            "4" => import_file(pool, &mut input).await,
            "5" => {
                println!("Closing the tracker.");
                break;
            }
            _ => {
                println!("Invalid option, try again.");
                continue;
            }
        };

        if let Err(err) = outcome {
            if let HarvestError::Storage(_) = err {
                tracing::error!("{err}");
            }
            println!("Error: {err}");
        }
    }
}

async fn register(
    pool: &PgPool,
    input: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(), HarvestError> {
    let Some(area) = prompt(input, "Harvested area (hectares): ") else {
        return Ok(());
    };
    let area = positive(parse_decimal(&area)?, "area")?;

    let Some(harvester) = prompt(input, "Harvester id: ") else {
        return Ok(());
    };
    if harvester.is_empty() {
        return Err(HarvestError::EmptyHarvesterId);
    }

    let Some(total) = prompt(input, "Total tons harvested: ") else {
        return Ok(());
    };
    let total = positive(parse_decimal(&total)?, "total tonnage")?;

    let Some(lost) = prompt(input, "Estimated tons lost: ") else {
        return Ok(());
    };
    let lost = parse_decimal(&lost)?;

    let record = registration_record(area, &harvester, total, lost)?;
    db::insert_record(pool, &record).await?;
    println!(
        "Harvest registered for {}: {:.2}% loss.",
        record.harvester_id, record.loss_percentage
    );
    Ok(())
}

/// Input-layer validation shared by the shell and the `register` subcommand:
/// area and total must be positive, the harvester id non-empty; the record
/// constructor enforces the loss bounds.
pub(crate) fn registration_record(
    area: Decimal,
    harvester: &str,
    total: Decimal,
    lost: Decimal,
) -> Result<HarvestRecord, HarvestError> {
    let area = positive(area, "area")?;
    if harvester.is_empty() {
        return Err(HarvestError::EmptyHarvesterId);
    }
    let total = positive(total, "total tonnage")?;
    HarvestRecord::new(area, harvester, total, lost)
}

pub(crate) async fn statistics(pool: &PgPool) -> Result<(), HarvestError> {
    let records = db::fetch_records(pool).await?;
    let summary = report::loss_summary(&records);
    println!();
    println!("Total tonnage lost: {:.2} t", summary.total_lost_tons);
    println!(
        "Average loss percentage: {:.2}%",
        summary.average_loss_percentage
    );
    Ok(())
}

pub(crate) async fn list(pool: &PgPool) -> Result<(), HarvestError> {
    let records = db::fetch_records(pool).await?;
    if records.is_empty() {
        println!("No harvests recorded.");
        return Ok(());
    }

    for record in records.iter() {
        println!(
            "- {} harvester {}: {:.2} ha, {:.2} t collected, {:.2} t lost ({:.2}%)",
            record.date,
            record.harvester_id,
            record.area_hectares,
            record.total_tons,
            record.lost_tons,
            record.loss_percentage
        );
    }
    Ok(())
}

async fn import_file(
    pool: &PgPool,
    input: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(), HarvestError> {
    let Some(path) = prompt(input, "Path to JSON file: ") else {
        return Ok(());
    };

    let outcome = import::import_json(pool, &PathBuf::from(path)).await?;
    println!(
        "Imported {} records, {} failed.",
        outcome.imported, outcome.failed
    );
    Ok(())
}

/// Prints the label and reads one trimmed line. `None` means stdin is gone
/// (closed or unreadable), which the caller treats as exit.
fn prompt(input: &mut impl Iterator<Item = io::Result<String>>, label: &str) -> Option<String> {
    print!("{label}");
    let _ = io::stdout().flush();

    match input.next() {
        Some(Ok(line)) => Some(line.trim().to_string()),
        Some(Err(err)) => {
            tracing::warn!("stdin read failed: {err}");
            None
        }
        None => None,
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, HarvestError> {
    text.parse::<Decimal>()
        .map_err(|_| HarvestError::InvalidNumber(text.to_string()))
}

fn positive(value: Decimal, field: &'static str) -> Result<Decimal, HarvestError> {
    if value <= Decimal::ZERO {
        return Err(HarvestError::NonPositive { field });
    }
    Ok(value)
}
