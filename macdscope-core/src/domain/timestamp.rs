//! Timestamp — an instant with the offset it was reported in.
//!
//! The backend emits bar and trade times in several textual shapes depending on
//! which layer serialized them (pandas index strings, Flask HTTP dates, ISO 8601).
//! All of them parse into the same type and compare as instants, so a bar stamped
//! `08:00:00+08:00` equals a trade stamped `00:00:00 GMT`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized timestamp: {0:?}")]
pub struct TimestampError(pub String);

/// A point in time carrying its original UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

impl Timestamp {
    pub fn new(inner: DateTime<FixedOffset>) -> Self {
        Self(inner)
    }

    /// Construct from epoch milliseconds (UTC).
    pub fn from_millis(ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(ms).map(|dt| Self(dt.fixed_offset()))
    }

    pub fn parse(text: &str) -> Result<Self, TimestampError> {
        let s = text.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt));
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Ok(Self(dt));
            }
        }
        // Naive strings are the backend's UTC default.
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self(Utc.from_utc_datetime(&naive).fixed_offset()));
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Ok(Self(dt));
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self(Utc.from_utc_datetime(&naive).fixed_offset()));
            }
        }

        Err(TimestampError(text.to_string()))
    }

    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Short display form for tables and axis labels.
    pub fn short(&self) -> String {
        self.0.format("%m-%d %H:%M").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%:z"))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(text) => Timestamp::parse(&text).map_err(serde::de::Error::custom),
            RawTimestamp::Millis(ms) => Timestamp::from_millis(ms).ok_or_else(|| {
                serde::de::Error::custom(format!("epoch milliseconds out of range: {ms}"))
            }),
        }
    }
}
