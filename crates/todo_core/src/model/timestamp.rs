//! Epoch-millisecond timestamp codec.
//!
//! # Responsibility
//! - Convert task dates to the 64-bit millisecond integers stored in SQLite.
//! - Convert stored integers back into UTC points in time.
//!
//! # Invariants
//! - `timestamp_to_date(date_to_timestamp(d)) == d` for every
//!   millisecond-aligned `d`.
//! - Out-of-range integers are reported, never clamped.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for stored integers that cannot be represented as a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    OutOfRange(i64),
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange(millis) => {
                write!(f, "timestamp {millis}ms is outside the representable date range")
            }
        }
    }
}

impl Error for TimestampError {}

/// Returns milliseconds since the Unix epoch for `date`.
pub fn date_to_timestamp(date: DateTime<Utc>) -> i64 {
    date.timestamp_millis()
}

/// Returns the UTC point in time `millis` milliseconds after the Unix epoch.
///
/// # Errors
/// - Returns `TimestampError::OutOfRange` when chrono cannot represent it.
pub fn timestamp_to_date(millis: i64) -> Result<DateTime<Utc>, TimestampError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(TimestampError::OutOfRange(millis))
}

/// Drops sub-millisecond precision so the value survives a storage round-trip.
pub fn truncate_to_millis(date: DateTime<Utc>) -> DateTime<Utc> {
    date.trunc_subsecs(3)
}

/// Serde adapter that writes dates as epoch-millisecond integers.
pub mod epoch_millis {
    use super::{date_to_timestamp, timestamp_to_date};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date_to_timestamp(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        timestamp_to_date(millis).map_err(D::Error::custom)
    }
}
