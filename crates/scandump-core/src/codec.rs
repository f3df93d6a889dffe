//! Decoding of the per-product keyed sub-fields.
//!
//! Each sub-field lives in the record's `ext_data` collection as a JSON
//! object mapping product identifiers to scalar strings, e.g.
//! `room_name = {"1": "Standard Room", "2": "Twin Room"}`.

use std::collections::HashMap;

use crate::errors::FieldError;

/// Decodes a required keyed sub-field. An absent or empty value is an error.
pub fn decode_field(
    ext_data: &HashMap<String, String>,
    field: &str,
) -> Result<HashMap<String, String>, FieldError> {
    match ext_data.get(field) {
        Some(raw) => parse_keyed_map(raw),
        None => Err(FieldError::Missing),
    }
}

/// Decodes an optional keyed sub-field. Absence yields `None`; a present but
/// empty or malformed value is still an error.
pub fn decode_field_opt(
    ext_data: &HashMap<String, String>,
    field: &str,
) -> Result<Option<HashMap<String, String>>, FieldError> {
    match ext_data.get(field) {
        Some(raw) => parse_keyed_map(raw).map(Some),
        None => Ok(None),
    }
}

fn parse_keyed_map(raw: &str) -> Result<HashMap<String, String>, FieldError> {
    if raw.is_empty() {
        return Err(FieldError::Empty);
    }
    Ok(serde_json::from_str(raw)?)
}
