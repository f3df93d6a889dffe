use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Availability value that marks a record as non-purchasable.
pub const NOT_AVAILABLE: &str = "Not available";

/// Side-field key carrying the customer-facing hotel code.
pub const HOTEL_CODE_FIELD: &str = "aux_data_customer_hotel_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Marriott,
    Booking,
    Expedia,
    Ctrip,
    Priceline,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Marriott,
        Channel::Booking,
        Channel::Expedia,
        Channel::Ctrip,
        Channel::Priceline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Marriott => "Marriott",
            Channel::Booking => "Booking",
            Channel::Expedia => "Expedia",
            Channel::Ctrip => "Ctrip",
            Channel::Priceline => "Priceline",
        }
    }

    /// Exact, case-sensitive lookup against the canonical labels.
    pub fn from_label(label: &str) -> Option<Channel> {
        Channel::ALL.iter().copied().find(|ch| ch.as_str() == label)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical channel label for a free-text provider name: the first letter of
/// every whitespace-separated word is uppercased, the rest is left untouched.
pub fn canonical_channel(provider: &str) -> String {
    let mut label = String::with_capacity(provider.len());
    let mut at_word_start = true;
    for ch in provider.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            label.push(ch);
        } else if at_word_start {
            at_word_start = false;
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
    }
    label
}

/// One denormalized scan row: a hotel/date/provider snapshot with several room
/// products packed into the JSON-encoded keyed sub-fields of `ext_data`.
#[derive(Debug, Clone)]
pub struct WideScanRecord {
    pub fuid: Uuid,
    pub hotel_name: String,
    pub provider: String,
    pub availability: String,
    pub ci_date: NaiveDateTime,
    pub co_date: NaiveDateTime,
    pub shown_price: HashMap<String, String>,
    pub currency: String,
    pub snapshot_urls: Vec<String>,
    pub ext_data: HashMap<String, String>,
}

/// One flat room-product row. Immutable once built by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomRow {
    #[serde(rename = "Hotel name")]
    pub hotel_name: String,
    #[serde(rename = "Hotel Code")]
    pub hotel_code: String,
    #[serde(rename = "CI date", serialize_with = "serialize_dmy")]
    pub ci_date: NaiveDate,
    #[serde(rename = "LOS")]
    pub los: i64,
    #[serde(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Room name")]
    pub room_name: String,
    #[serde(rename = "Product #")]
    pub product_num: Option<u32>,
    #[serde(rename = "Rate")]
    pub rate: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Tab name")]
    pub tab_name: String,
    #[serde(rename = "Snapshot")]
    pub snapshot: String,
}

/// Per-(hotel code, check-in date) room counts split by channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotelCounters {
    #[serde(rename = "Hotel name")]
    pub hotel_name: String,
    #[serde(rename = "Hotel Code")]
    pub hotel_code: String,
    #[serde(rename = "CI date", serialize_with = "serialize_dmy")]
    pub ci_date: NaiveDate,
    #[serde(rename = "Marriott")]
    pub marriott: u64,
    #[serde(rename = "Booking")]
    pub booking: u64,
    #[serde(rename = "Expedia")]
    pub expedia: u64,
    #[serde(rename = "Ctrip")]
    pub ctrip: u64,
    #[serde(rename = "Priceline")]
    pub priceline: u64,
}

impl HotelCounters {
    pub fn increment(&mut self, channel: Channel) {
        match channel {
            Channel::Marriott => self.marriott += 1,
            Channel::Booking => self.booking += 1,
            Channel::Expedia => self.expedia += 1,
            Channel::Ctrip => self.ctrip += 1,
            Channel::Priceline => self.priceline += 1,
        }
    }

    /// Per-channel addition; identity fields keep their current values.
    pub fn absorb(&mut self, other: &HotelCounters) {
        self.marriott += other.marriott;
        self.booking += other.booking;
        self.expedia += other.expedia;
        self.ctrip += other.ctrip;
        self.priceline += other.priceline;
    }
}

/// Output order for room rows: hotel name, check-in date (calendar order),
/// LOS, channel, product number.
pub fn sort_rooms(rooms: &mut [RoomRow]) {
    rooms.sort_by(room_order);
}

fn room_order(a: &RoomRow, b: &RoomRow) -> Ordering {
    a.hotel_name
        .cmp(&b.hotel_name)
        .then_with(|| a.ci_date.cmp(&b.ci_date))
        .then_with(|| a.los.cmp(&b.los))
        .then_with(|| a.channel.cmp(&b.channel))
        .then_with(|| a.product_num.cmp(&b.product_num))
}

pub(crate) fn serialize_dmy<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format("%d/%m/%Y"))
}
