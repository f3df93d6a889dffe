pub mod aggregator;
pub mod codec;
pub mod errors;
pub mod model;
pub mod normalizer;

pub use aggregator::{ChannelAggregator, UnknownChannel};
pub use errors::{FieldError, NormalizeError};
pub use model::{sort_rooms, Channel, HotelCounters, RoomRow, WideScanRecord};
pub use normalizer::normalize;
