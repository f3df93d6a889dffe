use std::num::ParseIntError;

use thiserror::Error;
use uuid::Uuid;

/// Failure decoding a single keyed sub-field out of `ext_data`.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field not found")]
    Missing,

    #[error("field is empty")]
    Empty,

    #[error("field JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A record-scoped decode failure; carries the record fuid for diagnostics.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("[{record}] ext_data field '{field}': {source}")]
    Field {
        record: Uuid,
        field: &'static str,
        source: FieldError,
    },

    #[error("[{record}] product number '{key}' is not an unsigned integer: {source}")]
    ProductNumber {
        record: Uuid,
        key: String,
        source: ParseIntError,
    },
}

impl NormalizeError {
    /// Fuid of the record that failed to normalize.
    pub fn record(&self) -> Uuid {
        match self {
            NormalizeError::Field { record, .. } => *record,
            NormalizeError::ProductNumber { record, .. } => *record,
        }
    }
}
