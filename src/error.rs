use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure classes for every fallible operation in the tracker.
///
/// Validation variants are recovered at the shell boundary (the current
/// operation is abandoned, the menu continues); `Storage` is logged and
/// recovered the same way; the two import variants abort an import attempt
/// before any record is processed.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("lost tonnage {lost} exceeds harvested total {total}")]
    LossExceedsTotal { total: Decimal, lost: Decimal },

    #[error("lost tonnage cannot be negative")]
    NegativeLoss,

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("harvester id must not be empty")]
    EmptyHarvesterId,

    #[error("expected a number, got {0:?}")]
    InvalidNumber(String),

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("cannot read import file {}: {source}", path.display())]
    ImportFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid import file: {0}")]
    ImportFormat(String),
}
