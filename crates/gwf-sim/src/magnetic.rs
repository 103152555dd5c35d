//! Magnetic-correlation fixture
//!
//! Stands in for the auxiliary-channel correlator: a baseline strength for
//! every event plus per-event overrides keyed by exact event id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use gwf_core::acquisition::MagneticCorrelationSource;
use gwf_core::types::Event;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticOverrides {
    /// Strength reported for events without an override
    pub baseline: f64,
    /// Strength by event id
    pub overrides: BTreeMap<String, f64>,
}

impl Default for MagneticOverrides {
    fn default() -> Self {
        Self {
            baseline: 0.5,
            overrides: BTreeMap::new(),
        }
    }
}

impl MagneticOverrides {
    /// Storm-day calibration transient and the quiet-day anomaly.
    pub fn reference() -> Self {
        Self::default()
            .with("Solar_Calib_X93", 45.0)
            .with("S191110af", 15.8)
    }

    pub fn with(mut self, event_id: impl Into<String>, strength: f64) -> Self {
        self.overrides.insert(event_id.into(), strength);
        self
    }
}

impl MagneticCorrelationSource for MagneticOverrides {
    fn magnetic_strength(&self, event: &Event) -> f64 {
        self.overrides
            .get(&event.id)
            .copied()
            .unwrap_or(self.baseline)
    }
}
