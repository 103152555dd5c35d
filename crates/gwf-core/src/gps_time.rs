//! GPS ↔ UTC time conversion
//!
//! Event times arrive as GPS seconds (continuous, no leap seconds). Reports and
//! the space-weather table work in UTC, so every conversion goes through the
//! GPS−UTC leap-second table below.
//!
//! # Example
//!
//! ```rust
//! use gwf_core::gps_time::GpsTime;
//!
//! let t = GpsTime::new(1242442967.4);
//! assert_eq!(t.utc_date(), "2019-05-21");
//! assert_eq!(t.format_utc(), "2019-05-21 03:02:29.400000 UTC");
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use crate::types::GpsSeconds;

/// GPS epoch (January 6, 1980 00:00:00 UTC) as a Unix timestamp
const GPS_EPOCH_UNIX: i64 = 315_964_800;

/// UTC dates (year, month) on which a leap second took effect, with the
/// resulting GPS−UTC offset in seconds. Always the first of the month.
const LEAP_SECONDS: [(i32, u32, i64); 18] = [
    (1981, 7, 1),
    (1982, 7, 2),
    (1983, 7, 3),
    (1985, 7, 4),
    (1988, 1, 5),
    (1990, 1, 6),
    (1991, 1, 7),
    (1992, 7, 8),
    (1993, 7, 9),
    (1994, 7, 10),
    (1996, 1, 11),
    (1997, 7, 12),
    (1999, 1, 13),
    (2006, 1, 14),
    (2009, 1, 15),
    (2012, 7, 16),
    (2015, 7, 17),
    (2017, 1, 18),
];

/// Unix timestamp of midnight UTC on the first day of `year`-`month`.
fn month_start_unix(year: i32, month: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(i64::MIN)
}

/// GPS−UTC offset in effect at the given GPS time.
pub fn leap_seconds_at(gps: GpsSeconds) -> i64 {
    let mut offset = 0;
    for &(year, month, after) in LEAP_SECONDS.iter() {
        // The leap second lands at UTC midnight; in GPS seconds that instant
        // already includes the new offset.
        let gps_at_leap = (month_start_unix(year, month) - GPS_EPOCH_UNIX + after) as f64;
        if gps >= gps_at_leap {
            offset = after;
        } else {
            break;
        }
    }
    offset
}

/// A point on the GPS time scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct GpsTime(pub GpsSeconds);

impl GpsTime {
    pub fn new(gps: GpsSeconds) -> Self {
        Self(gps)
    }

    pub fn seconds(&self) -> GpsSeconds {
        self.0
    }

    /// Shift by `seconds` (may be negative).
    pub fn offset(&self, seconds: f64) -> Self {
        Self(self.0 + seconds)
    }

    /// Convert to a Unix timestamp (UTC seconds since 1970).
    pub fn to_unix_timestamp(&self) -> f64 {
        self.0 + GPS_EPOCH_UNIX as f64 - leap_seconds_at(self.0) as f64
    }

    /// Convert to a UTC datetime (microsecond resolution).
    pub fn to_utc(&self) -> DateTime<Utc> {
        let unix = self.to_unix_timestamp();
        let micros = (unix * 1e6).round() as i64;
        DateTime::from_timestamp_micros(micros).unwrap_or_default()
    }

    /// UTC calendar date, `YYYY-MM-DD`.
    pub fn utc_date(&self) -> String {
        self.to_utc().format("%Y-%m-%d").to_string()
    }

    /// Human-readable UTC timestamp, `YYYY-MM-DD HH:MM:SS.ffffff UTC`.
    pub fn format_utc(&self) -> String {
        self.to_utc().format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string()
    }
}

impl From<GpsSeconds> for GpsTime {
    fn from(gps: GpsSeconds) -> Self {
        Self(gps)
    }
}

impl fmt::Display for GpsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_utc())
    }
}
