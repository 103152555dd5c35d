//! Space-weather veto lookup
//!
//! Maps an event time onto the historical geomagnetic conditions recorded for
//! its UTC calendar day. The table is static for a run; dates that are not
//! listed resolve to [`ActivityStatus::Unknown`] with a Kp index of 0.
//!
//! # Example
//!
//! ```
//! use gwf_core::space_weather::{ActivityStatus, SpaceWeatherTable};
//!
//! let table = SpaceWeatherTable::reference();
//! let (record, date) = table.lookup(1188729600.0);
//! assert_eq!(date, "2017-09-06");
//! assert_eq!(record.status, ActivityStatus::Storm);
//! assert_eq!(record.kp_index, 8);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::gps_time::GpsTime;
use crate::types::{ConfigError, GpsSeconds};

/// Geomagnetic activity category for a UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityStatus {
    Quiet,
    Storm,
    Active,
    Unknown,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Quiet => "QUIET",
            ActivityStatus::Storm => "STORM",
            ActivityStatus::Active => "ACTIVE",
            ActivityStatus::Unknown => "UNKNOWN",
        }
    }

    /// Storm or active conditions, where magnetometer excursions are
    /// expected to be solar in origin.
    pub fn is_disturbed(&self) -> bool {
        matches!(self, ActivityStatus::Storm | ActivityStatus::Active)
    }
}

impl Default for ActivityStatus {
    fn default() -> Self {
        ActivityStatus::Unknown
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditions recorded for one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpaceWeatherRecord {
    pub status: ActivityStatus,
    /// Planetary Kp index (0-9)
    #[serde(default)]
    pub kp_index: u8,
}

impl SpaceWeatherRecord {
    pub fn new(status: ActivityStatus, kp_index: u8) -> Self {
        Self { status, kp_index }
    }
}

/// Static date → conditions table, keyed by `YYYY-MM-DD` (UTC).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceWeatherTable {
    days: BTreeMap<String, SpaceWeatherRecord>,
}

impl SpaceWeatherTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The historical conditions for the reference target list.
    pub fn reference() -> Self {
        let mut table = Self::new();
        table.insert("2019-11-10", SpaceWeatherRecord::new(ActivityStatus::Quiet, 1));
        table.insert("2019-05-21", SpaceWeatherRecord::new(ActivityStatus::Quiet, 2));
        // X9.3 flare calibration day
        table.insert("2017-09-06", SpaceWeatherRecord::new(ActivityStatus::Storm, 8));
        table
    }

    pub fn insert(&mut self, date: impl Into<String>, record: SpaceWeatherRecord) {
        self.days.insert(date.into(), record);
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Conditions for a UTC date string, defaulting to UNKNOWN/0.
    pub fn get(&self, date: &str) -> SpaceWeatherRecord {
        self.days.get(date).copied().unwrap_or_default()
    }

    /// Conditions for the UTC day containing `gps`, plus the date key used.
    pub fn lookup(&self, gps: GpsSeconds) -> (SpaceWeatherRecord, String) {
        let date = GpsTime::new(gps).utc_date();
        (self.get(&date), date)
    }

    /// Reject malformed keys and out-of-range Kp values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (date, record) in &self.days {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(ConfigError::Validation(format!(
                    "space_weather key '{}' is not a YYYY-MM-DD date",
                    date
                )));
            }
            if record.kp_index > 9 {
                return Err(ConfigError::Validation(format!(
                    "space_weather {}: kp_index {} outside 0-9",
                    date, record.kp_index
                )));
            }
        }
        Ok(())
    }
}
