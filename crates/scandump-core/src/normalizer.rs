//! Expansion of one wide scan record into flat room rows.

use std::collections::HashMap;

use crate::codec::{decode_field, decode_field_opt};
use crate::errors::{FieldError, NormalizeError};
use crate::model::{canonical_channel, RoomRow, WideScanRecord, HOTEL_CODE_FIELD, NOT_AVAILABLE};

/// Expands `record` into one row per entry of its shown-price map, or a single
/// placeholder row when the record is not purchasable.
///
/// Rows come back sorted by product number, so output is deterministic even
/// though the source maps are unordered. Any decode failure aborts this record
/// only and carries its fuid.
pub fn normalize(record: &WideScanRecord) -> Result<Vec<RoomRow>, NormalizeError> {
    let base = base_row(record);

    if record.availability == NOT_AVAILABLE {
        return Ok(vec![base]);
    }

    let room_name = decode_field(&record.ext_data, "room_name")
        .map_err(|source| field_error(record, "room_name", source))?;

    // rate_name is preferred but optional; when it is absent, empty, or
    // unparsable, description takes over and becomes required.
    let description = match decode_field_opt(&record.ext_data, "rate_name") {
        Ok(Some(map)) => map,
        Ok(None) | Err(_) => decode_field(&record.ext_data, "description")
            .map_err(|source| field_error(record, "description", source))?,
    };

    let tab_name = decode_field(&record.ext_data, "tab_name")
        .map_err(|source| field_error(record, "tab_name", source))?;

    let mut products: Vec<(u32, &str)> = Vec::with_capacity(record.shown_price.len());
    for key in record.shown_price.keys() {
        let num: u32 = key.parse().map_err(|source| NormalizeError::ProductNumber {
            record: record.fuid,
            key: key.clone(),
            source,
        })?;
        products.push((num, key));
    }
    products.sort_unstable_by_key(|(num, _)| *num);

    let mut rooms = Vec::with_capacity(products.len());
    for (num, key) in products {
        let mut room = base.clone();
        room.product_num = Some(num);
        room.rate = record.shown_price[key].clone();
        room.room_name = lookup(&room_name, key);
        room.description = lookup(&description, key);
        room.tab_name = lookup(&tab_name, key);
        rooms.push(room);
    }

    Ok(rooms)
}

/// Record-level fields shared by every row of this record.
fn base_row(record: &WideScanRecord) -> RoomRow {
    RoomRow {
        hotel_name: record.hotel_name.clone(),
        hotel_code: record
            .ext_data
            .get(HOTEL_CODE_FIELD)
            .cloned()
            .unwrap_or_default(),
        ci_date: record.ci_date.date(),
        los: (record.co_date - record.ci_date).num_days(),
        channel: canonical_channel(&record.provider),
        room_name: String::new(),
        product_num: None,
        rate: String::new(),
        currency: record.currency.to_uppercase(),
        description: String::new(),
        tab_name: String::new(),
        snapshot: record.snapshot_urls.first().cloned().unwrap_or_default(),
    }
}

// A product key missing from a secondary map is not an error; the field is
// just empty for that row.
fn lookup(map: &HashMap<String, String>, key: &str) -> String {
    map.get(key).cloned().unwrap_or_default()
}

fn field_error(record: &WideScanRecord, field: &'static str, source: FieldError) -> NormalizeError {
    NormalizeError::Field {
        record: record.fuid,
        field,
        source,
    }
}
