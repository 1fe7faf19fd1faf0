//! Timestamp utilities.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// From a DateTime.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// ISO 8601 string with millisecond precision and a `Z` suffix,
    /// e.g. `2024-03-01T09:30:00.000Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse an RFC 3339 string.
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_serialization() {
        let ts = Timestamp::now();
        let json = serde_json::to_string(&ts).unwrap();
        let deserialized: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, deserialized);
    }

    #[test]
    fn test_timestamp_iso_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts.to_iso8601(), "2024-03-01T09:30:00.000Z");
        assert_eq!(ts.to_string(), "2024-03-01T09:30:00.000Z");
    }

    #[test]
    fn test_timestamp_parse_roundtrip() {
        let ts = Timestamp::parse("2024-03-01T09:30:00.000Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-03-01T09:30:00.000Z");
        assert!(Timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_iso_strings_sort_chronologically() {
        let early = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        let late = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 11, 2, 3, 4, 5).unwrap());
        assert!(early < late);
        assert!(early.to_iso8601() < late.to_iso8601());
    }
}
