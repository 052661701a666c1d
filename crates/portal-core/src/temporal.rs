//! # Temporal Types — Naive-UTC Timestamps
//!
//! Defines `Timestamp`, the canonical timestamp type for request records:
//! naive UTC, truncated to seconds precision, rendered as
//! `YYYY-MM-DDTHH:MM:SS`.
//!
//! ## Accepted Input Forms
//!
//! Request payloads arrive with dates in three shapes, all normalized to
//! the same canonical form:
//!
//! - RFC 3339 with offset or `Z` suffix (`2023-01-01T00:00:00Z`,
//!   `2023-01-01T05:30:00+05:30`) — converted to UTC, offset dropped.
//! - Naive ISO 8601 (`2023-01-01T00:00:00`) — taken as UTC.
//! - Bare date (`2023-01-01`) — taken as UTC midnight.
//!
//! Sub-second components are truncated in every form. Two timestamps
//! compare equal iff their canonical renderings are equal.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A naive-UTC timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a timestamp from any of the accepted input forms.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTimestamp` when the input matches none
    /// of the accepted forms.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        // RFC 3339 first: it is the strictest form and the only one
        // carrying an offset that needs conversion.
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(truncate(dt.naive_utc())));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self(truncate(dt)));
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            // Midnight always exists, but chrono still returns Option.
            let dt = d.and_hms_opt(0, 0, 0).ok_or_else(|| CoreError::InvalidTimestamp {
                input: s.to_string(),
                reason: "date has no midnight representation".to_string(),
            })?;
            return Ok(Self(dt));
        }
        Err(CoreError::InvalidTimestamp {
            input: s.to_string(),
            reason: "expected RFC 3339, YYYY-MM-DDTHH:MM:SS, or YYYY-MM-DD".to_string(),
        })
    }

    /// Create a timestamp from a `chrono::NaiveDateTime`, truncating
    /// sub-seconds.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self(truncate(dt))
    }

    /// Access the inner `NaiveDateTime`.
    pub fn as_datetime(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Render in the canonical `YYYY-MM-DDTHH:MM:SS` form.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `NaiveDateTime` to seconds precision.
fn truncate(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}
