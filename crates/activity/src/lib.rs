mod completion;
mod defaults;
mod draw;
mod sequencer;
mod store;
mod window;

pub mod visitor;

pub use completion::*;
pub use defaults::*;
pub use draw::*;
pub use sequencer::*;
pub use store::*;
pub use window::*;

use time::{Date, OffsetDateTime};

/// Unix timestamp of the given day at 00:00 UTC, the storage key for dates.
pub fn day_timestamp(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

pub fn timestamp_day(timestamp: i64) -> advent_shared::Result<Date> {
    Ok(OffsetDateTime::from_unix_timestamp(timestamp)?.date())
}

pub(crate) fn now_timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
