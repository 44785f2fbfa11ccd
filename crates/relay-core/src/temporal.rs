//! # UTC Timestamps
//!
//! Defines `Timestamp`, the UTC instant recorded in transport metadata.
//!
//! ## Invariant
//!
//! Request timestamps are exchanged between services written in different
//! languages, so they are always UTC and always rendered with the `Z`
//! suffix. Sub-second precision is kept; gateways stamp requests with
//! millisecond resolution.
//!
//! [`Timestamp::parse`] rejects any explicit offset, including `+00:00`.
//! [`Timestamp::parse_lenient`] accepts any offset and converts to UTC.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// A UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap a `chrono::DateTime<Utc>`.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC 3339 string with the `Z` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MalformedPayload`] if the string is not RFC 3339
    /// or uses a numeric offset.
    pub fn parse(s: &str) -> Result<Self, RelayError> {
        if !s.ends_with('Z') {
            return Err(RelayError::MalformedPayload(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, RelayError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            RelayError::MalformedPayload(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO 8601 with the `Z` suffix, keeping only the sub-second
    /// digits that carry information.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn to_iso8601_whole_seconds() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(Timestamp::from_utc(dt).to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn to_iso8601_keeps_milliseconds() {
        let dt = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
            .unwrap()
            .with_nanosecond(761_000_000)
            .unwrap();
        assert_eq!(Timestamp::from_utc(dt).to_iso8601(), "2026-01-15T12:00:00.761Z");
    }

    #[test]
    fn parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2016-04-12T02:49:05.761Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2016-04-12T02:49:05.761Z");
    }

    #[test]
    fn parse_offset_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
    }

    #[test]
    fn parse_lenient_converts_offset() {
        let ts = Timestamp::parse_lenient("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
