//! Scenario configuration
//!
//! Describes what the synthetic archive holds: a noise floor shared by every
//! detector, plus per-event overrides that inject a waveform or break the data
//! in one of the ways real archives do.
//!
//! ```yaml
//! sample_rate: 4096.0
//! noise_sigma: 1.0
//! seed: 42
//! injections:
//!   - gps: 1242442967.4
//!     mode: sine_gaussian
//!     amplitude: 2.0
//!     frequency_hz: 60.0
//!   - gps: 1257416400.0
//!     detectors: [H1]
//!     mode: flatline
//! magnetic:
//!   baseline: 0.5
//!   overrides: { S191110af: 15.8 }
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

use gwf_core::types::{ConfigError, Detector, GpsSeconds};

use crate::magnetic::MagneticOverrides;

/// What the archive returns around one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DataMode {
    /// Gaussian noise only
    Noise,
    /// Noise plus a sine-Gaussian burst. Amplitude is in units of the noise sigma.
    SineGaussian {
        amplitude: f64,
        #[serde(default = "default_frequency")]
        frequency_hz: f64,
        #[serde(default = "default_tau")]
        tau_s: f64,
        /// Burst centre relative to the event time
        #[serde(default)]
        offset_s: f64,
    },
    /// Noise plus a train of narrow one-sided pulses
    UnipolarPulse {
        amplitude: f64,
        #[serde(default = "default_pulse_width")]
        width_s: f64,
        #[serde(default = "default_pulse_period")]
        period_s: f64,
        /// Span of the train, centred on the event time
        #[serde(default = "default_train_duration")]
        duration_s: f64,
    },
    /// Every sample exactly zero
    Flatline,
    /// Every sample NaN
    Gap,
    /// The fetch fails
    Unavailable,
}

fn default_frequency() -> f64 {
    120.0
}

fn default_tau() -> f64 {
    0.05
}

fn default_pulse_width() -> f64 {
    0.001
}

fn default_pulse_period() -> f64 {
    0.02
}

fn default_train_duration() -> f64 {
    1.0
}

impl DataMode {
    /// Deterministic waveform value at `t` seconds from the event time, in
    /// units of the noise sigma.
    pub fn waveform(&self, t: f64) -> f64 {
        match *self {
            DataMode::SineGaussian {
                amplitude,
                frequency_hz,
                tau_s,
                offset_s,
            } => {
                let dt = t - offset_s;
                amplitude * (-(dt / tau_s).powi(2)).exp() * (2.0 * PI * frequency_hz * dt).sin()
            }
            DataMode::UnipolarPulse {
                amplitude,
                width_s,
                period_s,
                duration_s,
            } => {
                if t.abs() > duration_s / 2.0 + 3.0 * width_s {
                    return 0.0;
                }
                let nearest = (t / period_s).round() * period_s;
                amplitude * (-((t - nearest) / width_s).powi(2)).exp()
            }
            _ => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataMode::Noise => "noise",
            DataMode::SineGaussian { .. } => "sine_gaussian",
            DataMode::UnipolarPulse { .. } => "unipolar_pulse",
            DataMode::Flatline => "flatline",
            DataMode::Gap => "gap",
            DataMode::Unavailable => "unavailable",
        }
    }
}

/// Override of the archive contents around one event time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Injection {
    /// Event time the override is anchored to
    pub gps: GpsSeconds,
    /// Detectors affected; empty means all
    #[serde(default)]
    pub detectors: Vec<Detector>,
    #[serde(flatten)]
    pub mode: DataMode,
}

impl Injection {
    pub fn new(gps: GpsSeconds, detectors: Vec<Detector>, mode: DataMode) -> Self {
        Self {
            gps,
            detectors,
            mode,
        }
    }

    pub fn applies_to(&self, detector: Detector, start: GpsSeconds, end: GpsSeconds) -> bool {
        (self.detectors.is_empty() || self.detectors.contains(&detector))
            && self.gps >= start
            && self.gps < end
    }
}

/// Configuration for the synthetic archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Sample rate of every detector in Hz
    pub sample_rate: f64,
    /// Standard deviation of the detector noise
    pub noise_sigma: f64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Per-event overrides; the first match wins
    pub injections: Vec<Injection>,
    /// Magnetic-correlation fixture
    pub magnetic: MagneticOverrides,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 4096.0,
            noise_sigma: 1.0,
            seed: 42,
            injections: Vec::new(),
            magnetic: MagneticOverrides::default(),
        }
    }
}

impl ScenarioConfig {
    /// Data for the reference target list.
    ///
    /// - `S191110af`: censored (flatline) H1 strain, magnetic transient on a quiet day
    /// - `GW190521`: sine-Gaussian burst in every detector
    /// - `Solar_Calib_X93`: pulse trains in H1 and L1, no V1 data, magnetic storm
    pub fn demo() -> Self {
        let s191110af = 1_257_416_400.0;
        let gw190521 = 1_242_442_967.4;
        let solar_calib = 1_188_729_600.0;
        Self {
            injections: vec![
                Injection::new(s191110af, vec![Detector::H1], DataMode::Flatline),
                Injection::new(
                    gw190521,
                    Vec::new(),
                    DataMode::SineGaussian {
                        amplitude: 2.0,
                        frequency_hz: 60.0,
                        tau_s: 0.05,
                        offset_s: 0.1,
                    },
                ),
                Injection::new(solar_calib, vec![Detector::V1], DataMode::Unavailable),
                Injection::new(
                    solar_calib,
                    vec![Detector::H1, Detector::L1],
                    DataMode::UnipolarPulse {
                        amplitude: 20.0,
                        width_s: 0.001,
                        period_s: 0.02,
                        duration_s: 1.0,
                    },
                ),
            ],
            magnetic: MagneticOverrides::reference(),
            ..Default::default()
        }
    }

    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::Validation(
                "scenario sample_rate must be positive".to_string(),
            ));
        }
        if !(self.noise_sigma.is_finite() && self.noise_sigma > 0.0) {
            return Err(ConfigError::Validation(
                "scenario noise_sigma must be positive".to_string(),
            ));
        }
        for injection in &self.injections {
            let ok = match injection.mode {
                DataMode::SineGaussian {
                    frequency_hz,
                    tau_s,
                    ..
                } => frequency_hz > 0.0 && frequency_hz < self.sample_rate / 2.0 && tau_s > 0.0,
                DataMode::UnipolarPulse {
                    width_s, period_s, ..
                } => width_s > 0.0 && period_s > 0.0,
                _ => true,
            };
            if !ok || !injection.gps.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "invalid {} injection at {}",
                    injection.mode.name(),
                    injection.gps
                )));
            }
        }
        Ok(())
    }

    /// First injection covering `detector` in `[start, end)`.
    pub fn injection_for(
        &self,
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    ) -> Option<&Injection> {
        self.injections
            .iter()
            .find(|inj| inj.applies_to(detector, start, end))
    }
}
