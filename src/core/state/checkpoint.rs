//! Checkpoint model for incremental exports
//!
//! A checkpoint is the `updatedAt` boundary between rows already exported for
//! a cube and rows still to come. It is stored with second precision as
//! `yyyy-MM-ddTHH:mm:ss`.

use crate::domain::ids::CubeName;
use chrono::{DateTime, NaiveDateTime, Timelike};
use std::fmt;

/// On-disk and wire format of a checkpoint timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a timestamp as found in checkpoint files, config and row values
///
/// Accepts `2025-03-01T10:00:00`, fractional seconds (`...10:00:00.000`), a
/// space instead of `T`, and RFC 3339 values with an offset (converted to
/// UTC). Sub-second precision is dropped.
///
/// # Examples
///
/// ```
/// use cubex::core::state::checkpoint::{format_timestamp, parse_timestamp};
///
/// let ts = parse_timestamp("2025-03-01T10:00:00.123").unwrap();
/// assert_eq!(format_timestamp(&ts), "2025-03-01T10:00:00");
/// ```
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();

    let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_utc()))
        .map_err(|_| format!("expected yyyy-MM-ddTHH:mm:ss, got '{value}'"))?;

    Ok(parsed.with_nanosecond(0).unwrap_or(parsed))
}

/// Format a timestamp the way checkpoint files and filters carry it
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Incremental progress marker for one cube
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Cube this checkpoint belongs to
    pub cube: CubeName,

    /// Latest `updatedAt` already exported
    pub timestamp: NaiveDateTime,
}

impl Checkpoint {
    pub fn new(cube: CubeName, timestamp: NaiveDateTime) -> Self {
        Self { cube, timestamp }
    }

    /// Fold an observed `updatedAt` into the checkpoint, keeping the maximum
    ///
    /// Returns true if the checkpoint moved forward.
    pub fn observe(&mut self, updated_at: NaiveDateTime) -> bool {
        if updated_at > self.timestamp {
            self.timestamp = updated_at;
            true
        } else {
            false
        }
    }

    /// Timestamp formatted as `yyyy-MM-ddTHH:mm:ss`
    pub fn formatted(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.cube, self.formatted())
    }
}
