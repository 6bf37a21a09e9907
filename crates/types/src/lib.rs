//! Shared value types for the price list service.
//!
//! - `prices`: the persisted `PriceRecord` and its composite identity `RecordKey`.
//! - `stats`: per-upload `Stats` and the store-side `PersistOutcome` they are built from.
//! - `filter`: optional range bounds for exports.
//! - `archive`: supported container kinds.

pub mod archive;
pub mod filter;
pub mod prices;
pub mod stats;

pub use archive::ArchiveKind;
pub use filter::PriceFilter;
pub use prices::{Decimal, NaiveDate, Price, PriceRecord, RecordKey};
pub use stats::{PersistOutcome, Stats};
