//! Counterpart delay model
//!
//! Predicts when an electromagnetic counterpart should arrive after the
//! gravitational peak with a linear model in signal strength:
//!
//! ```text
//!   delay = base_lag + strength × viscosity_coefficient
//!   flash = peak_time + delay
//! ```

use serde::Serialize;

use crate::config::CalibrationConfig;
use crate::gps_time::GpsTime;
use crate::types::GpsSeconds;

/// Predicted counterpart arrival.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashPrediction {
    /// Seconds after the peak
    pub delay_s: f64,
    /// GPS time of the predicted flash
    pub flash_gps: GpsSeconds,
    /// `YYYY-MM-DD HH:MM:SS.ffffff UTC`
    pub flash_utc: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayEstimator {
    base_lag_s: f64,
    viscosity_coefficient: f64,
}

impl DelayEstimator {
    pub fn new(base_lag_s: f64, viscosity_coefficient: f64) -> Self {
        Self {
            base_lag_s,
            viscosity_coefficient,
        }
    }

    pub fn from_calibration(calibration: &CalibrationConfig) -> Self {
        Self::new(calibration.base_lag_s, calibration.viscosity_coefficient)
    }

    pub fn predicted_delay(&self, strength: f64) -> f64 {
        self.base_lag_s + strength * self.viscosity_coefficient
    }

    pub fn flash_time(&self, peak_time: GpsSeconds, strength: f64) -> FlashPrediction {
        let delay_s = self.predicted_delay(strength);
        let flash = GpsTime::new(peak_time).offset(delay_s);
        FlashPrediction {
            delay_s,
            flash_gps: flash.seconds(),
            flash_utc: flash.format_utc(),
        }
    }
}

impl Default for DelayEstimator {
    fn default() -> Self {
        Self::from_calibration(&CalibrationConfig::default())
    }
}
