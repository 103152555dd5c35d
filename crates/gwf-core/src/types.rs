//! Core types for strain analysis
//!
//! This module defines the data model shared by every stage of the audit
//! pipelines: uniformly sampled strain series, candidate events, detector
//! identifiers, and the error types for each failure domain.
//!
//! ## Failure Domains
//!
//! ```text
//!   acquisition ──► AcquisitionError   (degraded field, never fatal)
//!   transform   ──► TransformError     (fail-soft defaults, never fatal)
//!   config      ──► ConfigError        (aborts the run)
//! ```
//!
//! Only configuration problems stop a run. A noisy or missing detector only
//! degrades the row it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A real-valued strain sample
pub type Sample = f64;

/// GPS seconds since 1980-01-06 00:00:00 UTC
pub type GpsSeconds = f64;

/// Fraction of a sample tolerated when mapping GPS times onto sample indices
const SAMPLE_SNAP: f64 = 1e-3;

/// Uniformly sampled time series with an absolute start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Sample values
    pub samples: Vec<Sample>,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// GPS time of the first sample
    pub t0: GpsSeconds,
}

impl TimeSeries {
    pub fn new(samples: Vec<Sample>, sample_rate: f64, t0: GpsSeconds) -> Self {
        Self {
            samples,
            sample_rate,
            t0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Span covered by the series in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// GPS time just past the last sample
    pub fn end_time(&self) -> GpsSeconds {
        self.t0 + self.duration()
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// GPS time of sample `index`
    pub fn time_at(&self, index: usize) -> GpsSeconds {
        self.t0 + index as f64 / self.sample_rate
    }

    /// True when every sample is finite
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Copy out the samples that fall inside `[start, end)`.
    ///
    /// Returns `None` when the span does not overlap the series.
    pub fn crop(&self, start: GpsSeconds, end: GpsSeconds) -> Option<TimeSeries> {
        if end <= start || start >= self.end_time() || end <= self.t0 {
            return None;
        }
        // GPS offsets near 1e9 s carry ~1e-7 s of rounding; snap to the sample grid
        let first = ((start - self.t0) * self.sample_rate - SAMPLE_SNAP).ceil().max(0.0) as usize;
        let last = (((end - self.t0) * self.sample_rate - SAMPLE_SNAP).ceil() as usize).min(self.len());
        if first >= last {
            return None;
        }
        Some(TimeSeries {
            samples: self.samples[first..last].to_vec(),
            sample_rate: self.sample_rate,
            t0: self.time_at(first),
        })
    }
}

/// Interferometer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Detector {
    /// LIGO Hanford
    H1,
    /// LIGO Livingston
    L1,
    /// Virgo
    V1,
    /// KAGRA
    K1,
    /// GEO600
    G1,
}

impl Detector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Detector::H1 => "H1",
            Detector::L1 => "L1",
            Detector::V1 => "V1",
            Detector::K1 => "K1",
            Detector::G1 => "G1",
        }
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Detector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H1" => Ok(Detector::H1),
            "L1" => Ok(Detector::L1),
            "V1" => Ok(Detector::V1),
            "K1" => Ok(Detector::K1),
            "G1" => Ok(Detector::G1),
            other => Err(ConfigError::Validation(format!("unknown detector '{}'", other))),
        }
    }
}

/// A candidate event from the target list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier, unique within a run
    pub id: String,
    /// Reference time in GPS seconds
    pub gps: GpsSeconds,
    /// Free-form classification hint (not authoritative)
    #[serde(default)]
    pub category: String,
}

impl Event {
    pub fn new(id: impl Into<String>, gps: GpsSeconds, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gps,
            category: category.into(),
        }
    }
}

/// Failure to obtain strain data from an archive.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("detector {0} has no data for this event")]
    DetectorUnavailable(Detector),

    #[error("no {detector} data in GPS range [{start}, {end})")]
    RangeUnavailable {
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Failure inside the time-frequency transform.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("too few samples: expected at least {expected}, got {actual}")]
    InsufficientSamples { expected: usize, actual: usize },

    #[error("window [{start}, {end}) is not inside the series span [{series_start}, {series_end})")]
    WindowOutOfRange {
        start: GpsSeconds,
        end: GpsSeconds,
        series_start: GpsSeconds,
        series_end: GpsSeconds,
    },

    #[error("band [{low}, {high}] Hz is not inside (0, {nyquist}) Hz")]
    BandOutOfRange { low: f64, high: f64, nyquist: f64 },

    #[error("series contains non-finite samples")]
    NonFiniteInput,

    #[error("no time-frequency tiles fit the requested band")]
    EmptyTiling,
}

/// Errors in run configuration. The only fatal class.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {0}")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    Read(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_series_geometry() {
        let ts = TimeSeries::new(vec![0.0; 4096], 1024.0, 100.0);
        assert_relative_eq!(ts.duration(), 4.0);
        assert_relative_eq!(ts.end_time(), 104.0);
        assert_relative_eq!(ts.nyquist(), 512.0);
        assert_relative_eq!(ts.time_at(512), 100.5);
    }

    #[test]
    fn test_crop_inside() {
        let samples: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let ts = TimeSeries::new(samples, 100.0, 10.0);
        let cropped = ts.crop(11.0, 12.0).unwrap();
        assert_eq!(cropped.len(), 100);
        assert_relative_eq!(cropped.t0, 11.0);
        assert_eq!(cropped.samples[0], 100.0);
    }

    #[test]
    fn test_crop_clamps_and_rejects() {
        let ts = TimeSeries::new(vec![1.0; 100], 10.0, 0.0);
        assert_eq!(ts.crop(-5.0, 2.0).unwrap().len(), 20);
        assert!(ts.crop(20.0, 30.0).is_none());
        assert!(ts.crop(5.0, 5.0).is_none());
    }

    #[test]
    fn test_detector_parse() {
        assert_eq!("h1".parse::<Detector>().unwrap(), Detector::H1);
        assert_eq!(" V1 ".parse::<Detector>().unwrap(), Detector::V1);
        assert!("X9".parse::<Detector>().is_err());
        assert_eq!(Detector::L1.to_string(), "L1");
    }

    #[test]
    fn test_error_messages() {
        let err = AcquisitionError::DetectorUnavailable(Detector::V1);
        assert_eq!(err.to_string(), "detector V1 has no data for this event");
        let err = TransformError::InsufficientSamples { expected: 64, actual: 3 };
        assert!(err.to_string().contains("64"));
    }
}
