//! Amplitude asymmetry scoring
//!
//! Compares the largest positive excursion of a band-limited segment with its
//! largest negative one. Oscillatory signals swing about equally both ways and
//! score near 1; a unipolar kick pushes the ratio well above it.
//!
//! ```text
//!   x ──► drop |x| > kσ ──► max, min ──► |max / min| ──► ≥ 1 ? r : 1/r
//!                                      (min == 0 → ε)
//! ```
//!
//! A score is either a measurement (always ≥ 1.0) or
//! [`AsymmetryScore::Unavailable`]. Unavailable scores are non-votes in the
//! symmetry verdict and render as the −1.0 sentinel in numeric output.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CalibrationConfig;
use crate::types::ConfigError;

/// Numeric stand-in for an unavailable score
pub const UNAVAILABLE_SENTINEL: f64 = -1.0;

/// Result of scoring one detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum AsymmetryScore {
    /// Normalized ratio, ≥ 1.0
    Measured(f64),
    /// No data or no usable statistics
    Unavailable,
}

impl AsymmetryScore {
    /// The score, or −1.0 when unavailable.
    pub fn as_f64(&self) -> f64 {
        match *self {
            AsymmetryScore::Measured(v) => v,
            AsymmetryScore::Unavailable => UNAVAILABLE_SENTINEL,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match *self {
            AsymmetryScore::Measured(v) => Some(v),
            AsymmetryScore::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AsymmetryScore::Measured(_))
    }

    /// Measured and strictly above `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.value().map_or(false, |v| v > threshold)
    }
}

impl From<AsymmetryScore> for f64 {
    fn from(score: AsymmetryScore) -> Self {
        score.as_f64()
    }
}

impl From<f64> for AsymmetryScore {
    /// Values below 1.0 (the sentinel included) or non-finite are unavailable.
    fn from(value: f64) -> Self {
        if value.is_finite() && value >= 1.0 {
            AsymmetryScore::Measured(value)
        } else {
            AsymmetryScore::Unavailable
        }
    }
}

impl fmt::Display for AsymmetryScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsymmetryScore::Measured(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            AsymmetryScore::Unavailable => f.write_str("N/A"),
        }
    }
}

/// Outlier-filtered max/min amplitude ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymmetryScorer {
    outlier_sigma: f64,
    epsilon: f64,
}

impl AsymmetryScorer {
    /// `outlier_sigma` and `epsilon` must be finite and positive.
    pub fn new(outlier_sigma: f64, epsilon: f64) -> Result<Self, ConfigError> {
        if !(outlier_sigma.is_finite() && outlier_sigma > 0.0) {
            return Err(ConfigError::Validation(format!(
                "outlier_sigma must be finite and > 0, got {}",
                outlier_sigma
            )));
        }
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(ConfigError::Validation(format!(
                "epsilon must be finite and > 0, got {}",
                epsilon
            )));
        }
        Ok(Self {
            outlier_sigma,
            epsilon,
        })
    }

    pub fn from_calibration(calibration: &CalibrationConfig) -> Result<Self, ConfigError> {
        Self::new(
            calibration.outlier_sigma,
            calibration.reconstruction_noise_epsilon,
        )
    }

    /// Score a band-limited segment.
    pub fn score(&self, samples: &[f64]) -> AsymmetryScore {
        let Some(sigma) = std_dev(samples) else {
            return AsymmetryScore::Unavailable;
        };
        let limit = self.outlier_sigma * sigma;

        let mut kept = samples.iter().copied().filter(|x| x.abs() <= limit);
        let Some(first) = kept.next() else {
            return AsymmetryScore::Unavailable;
        };
        let (max, min) = kept.fold((first, first), |(hi, lo), x| (hi.max(x), lo.min(x)));

        let min = if min == 0.0 { self.epsilon } else { min };
        let ratio = (max / min).abs();
        let normalized = if ratio < 1.0 { 1.0 / ratio } else { ratio };

        // Flat segments give 0/ε and then 1/0
        if normalized.is_finite() {
            AsymmetryScore::Measured(normalized)
        } else {
            AsymmetryScore::Unavailable
        }
    }
}

impl Default for AsymmetryScorer {
    fn default() -> Self {
        Self {
            outlier_sigma: 8.0,
            epsilon: 1e-15,
        }
    }
}

/// Population standard deviation; `None` for empty or non-finite input.
fn std_dev(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let sigma = var.sqrt();
    sigma.is_finite().then_some(sigma)
}
