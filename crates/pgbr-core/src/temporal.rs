//! # Backup Timestamps
//!
//! A base backup is named after the instant the agent took it. The agent
//! sends an RFC 3339 date-time with an offset; the stored name is that
//! instant truncated to whole seconds, keeping the agent's offset:
//!
//! ```text
//! 2023-05-01T12:34:56.789+02:00  ->  2023-05-01T12:34:56+02:00
//! 2023-01-01T00:00:00.5Z         ->  2023-01-01T00:00:00Z
//! ```
//!
//! Seconds are always rendered so every name has the same width and a
//! byte-wise sort of names is a chronological sort (for a fixed offset).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, SecondsFormat, Timelike};
use thiserror::Error;

/// The `date` value could not be parsed as an RFC 3339 date-time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid backup timestamp {value:?}: {reason}")]
pub struct TimestampError {
    /// The rejected input.
    pub value: String,
    /// Parser diagnostic.
    pub reason: String,
}

/// A date-time with offset, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackupTimestamp(DateTime<FixedOffset>);

impl BackupTimestamp {
    /// Wrap a date-time, discarding sub-second precision.
    ///
    /// A leap second (`:60`) is rejected: truncating it would yield the name
    /// of the preceding second.
    pub fn from_datetime(dt: DateTime<FixedOffset>) -> Result<Self, TimestampError> {
        if dt.nanosecond() >= 1_000_000_000 {
            return Err(TimestampError {
                value: dt.to_rfc3339(),
                reason: "leap seconds are not accepted".to_string(),
            });
        }
        Ok(Self(dt.with_nanosecond(0).unwrap_or(dt)))
    }

    /// Parse an RFC 3339 date-time.
    ///
    /// Query strings decode `+` as a space, so `12:34:56 02:00` is read as
    /// `12:34:56+02:00` when the plain parse fails.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        let s = s.trim();
        let dt = match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt,
            Err(err) => restore_plus_offset(s)
                .and_then(|repaired| DateTime::parse_from_rfc3339(&repaired).ok())
                .ok_or_else(|| TimestampError {
                    value: s.to_string(),
                    reason: err.to_string(),
                })?,
        };
        Self::from_datetime(dt).map_err(|e| TimestampError {
            value: s.to_string(),
            ..e
        })
    }

    /// The inner date-time.
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Canonical artifact name: `YYYY-MM-DDTHH:MM:SS` plus `Z` or `±HH:MM`.
    pub fn to_artifact_name(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// `2023-05-01T12:34:56 02:00` -> `2023-05-01T12:34:56+02:00`.
fn restore_plus_offset(s: &str) -> Option<String> {
    let idx = s.rfind(' ')?;
    let offset = &s[idx + 1..];
    let b = offset.as_bytes();
    let looks_like_offset = b.len() == 5
        && b[2] == b':'
        && [b[0], b[1], b[3], b[4]].iter().all(u8::is_ascii_digit);
    looks_like_offset.then(|| format!("{}+{}", &s[..idx], offset))
}

impl FromStr for BackupTimestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BackupTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_artifact_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_subseconds_and_keeps_offset() {
        let ts = BackupTimestamp::parse("2023-05-01T12:34:56.789+02:00").unwrap();
        assert_eq!(ts.to_artifact_name(), "2023-05-01T12:34:56+02:00");
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn truncates_rather_than_rounds() {
        let ts = BackupTimestamp::parse("2023-05-01T12:34:56.999999999Z").unwrap();
        assert_eq!(ts.to_artifact_name(), "2023-05-01T12:34:56Z");
    }

    #[test]
    fn utc_renders_with_z() {
        let ts = BackupTimestamp::parse("2023-01-01T00:00:00+00:00").unwrap();
        assert_eq!(ts.to_artifact_name(), "2023-01-01T00:00:00Z");
    }

    #[test]
    fn zero_seconds_are_rendered() {
        let ts = BackupTimestamp::parse("2023-06-01T08:30:00Z").unwrap();
        assert_eq!(ts.to_artifact_name(), "2023-06-01T08:30:00Z");
    }

    #[test]
    fn negative_offset_is_kept() {
        let ts = BackupTimestamp::parse("2022-12-31T23:59:59.1-05:00").unwrap();
        assert_eq!(ts.to_string(), "2022-12-31T23:59:59-05:00");
    }

    #[test]
    fn repairs_space_decoded_plus() {
        let ts = BackupTimestamp::parse("2023-05-01T12:34:56.789 02:00").unwrap();
        assert_eq!(ts.to_artifact_name(), "2023-05-01T12:34:56+02:00");
    }

    #[test]
    fn rejects_missing_offset() {
        assert!(BackupTimestamp::parse("2023-05-01T12:34:56").is_err());
    }

    #[test]
    fn rejects_garbage() {
        let err = BackupTimestamp::parse("yesterday").unwrap_err();
        assert_eq!(err.value, "yesterday");
        assert!(BackupTimestamp::parse("").is_err());
        assert!(BackupTimestamp::parse("2023-05-01").is_err());
    }

    #[test]
    fn rejects_leap_second() {
        let err = BackupTimestamp::parse("2023-05-01T12:34:60Z").unwrap_err();
        assert_eq!(err.value, "2023-05-01T12:34:60Z");
        assert!(err.reason.contains("leap second"));
        assert!(BackupTimestamp::parse("2016-12-31T23:59:60.5+00:00").is_err());
        // The neighbouring real second is unaffected.
        let ts = BackupTimestamp::parse("2023-05-01T12:34:59Z").unwrap();
        assert_eq!(ts.to_artifact_name(), "2023-05-01T12:34:59Z");
    }

    #[test]
    fn from_str_matches_parse() {
        let a: BackupTimestamp = "2023-05-01T12:34:56Z".parse().unwrap();
        let b = BackupTimestamp::parse("2023-05-01T12:34:56Z").unwrap();
        assert_eq!(a, b);
    }
}
