//! Streaming per-hotel channel counters.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;

use crate::model::{Channel, HotelCounters, RoomRow};

/// A room row named a channel outside the five known labels. Counters are
/// untouched; the caller decides whether and where to log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel {
    pub channel: String,
    pub hotel_code: String,
    pub ci_date: NaiveDate,
}

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown channel '{}' (hotel_code: {}, ci: {})",
            self.channel,
            self.hotel_code,
            self.ci_date.format("%d/%m/%Y")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CounterKey {
    hotel_code: String,
    ci_date: NaiveDate,
}

/// Accumulates room rows into per-(hotel code, check-in date) channel counts.
///
/// Entries are created lazily on the first row for a key and only ever
/// incremented afterward. Not safe for concurrent writers; wrap it in a lock
/// or merge per-worker aggregators instead.
#[derive(Debug, Default)]
pub struct ChannelAggregator {
    hotels: HashMap<CounterKey, HotelCounters>,
}

impl ChannelAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one row. Returns the warning event when the row's channel is
    /// not one of the known labels; such a row never creates an entry.
    #[must_use]
    pub fn add_row(&mut self, room: &RoomRow) -> Option<UnknownChannel> {
        let Some(channel) = Channel::from_label(&room.channel) else {
            return Some(UnknownChannel {
                channel: room.channel.clone(),
                hotel_code: room.hotel_code.clone(),
                ci_date: room.ci_date,
            });
        };

        let key = CounterKey {
            hotel_code: room.hotel_code.clone(),
            ci_date: room.ci_date,
        };
        let entry = self.hotels.entry(key).or_insert_with(|| HotelCounters {
            hotel_name: room.hotel_name.clone(),
            hotel_code: room.hotel_code.clone(),
            ci_date: room.ci_date,
            marriott: 0,
            booking: 0,
            expedia: 0,
            ctrip: 0,
            priceline: 0,
        });
        entry.increment(channel);
        None
    }

    /// Counts a batch of rows, collecting the unknown-channel warnings.
    pub fn add_rows(&mut self, rooms: &[RoomRow]) -> Vec<UnknownChannel> {
        rooms
            .iter()
            .filter_map(|room| self.add_row(room))
            .collect()
    }

    /// Folds `other` into `self` by per-key, per-channel addition. The first
    /// aggregator to have seen a key keeps its recorded hotel name.
    pub fn merge(&mut self, other: ChannelAggregator) {
        for (key, counters) in other.hotels {
            match self.hotels.entry(key) {
                std::collections::hash_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().absorb(&counters);
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(counters);
                }
            }
        }
    }

    /// Independent copies of all entries, sorted by hotel name and then by
    /// check-in date in calendar order. Hotel code breaks the remaining tie
    /// so the order never depends on map iteration.
    pub fn snapshot(&self) -> Vec<HotelCounters> {
        let mut counts: Vec<HotelCounters> = self.hotels.values().cloned().collect();
        counts.sort_by(|a, b| {
            a.hotel_name
                .cmp(&b.hotel_name)
                .then_with(|| a.ci_date.cmp(&b.ci_date))
                .then_with(|| a.hotel_code.cmp(&b.hotel_code))
        });
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }
}
