//! Synthetic strain archive
//!
//! Every detector carries white Gaussian noise at the scenario's sample rate.
//! A fetch whose span contains an injection's event time gets that
//! injection's treatment instead: a waveform added to the noise, the whole
//! span flattened or blanked, or the fetch refused.
//!
//! Noise is a pure function of `(seed, detector, first sample index)`, so the
//! same request always returns the same samples regardless of what was
//! fetched before it or on which thread.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use gwf_core::acquisition::StrainSource;
use gwf_core::types::{AcquisitionError, ConfigError, Detector, GpsSeconds, TimeSeries};

use crate::scenario::{DataMode, ScenarioConfig};

#[derive(Debug, Clone)]
pub struct SyntheticArchive {
    config: ScenarioConfig,
    noise: Normal<f64>,
}

impl SyntheticArchive {
    pub fn new(config: ScenarioConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let noise = Normal::new(0.0, config.noise_sigma)
            .map_err(|e| ConfigError::Validation(format!("noise_sigma: {}", e)))?;
        Ok(Self { config, noise })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    fn rng_for(&self, detector: Detector, first_sample: i64) -> StdRng {
        let salt = (detector as u64).wrapping_mul(0xA24B_AED4_963E_E407);
        let state = splitmix64(self.config.seed ^ salt);
        StdRng::seed_from_u64(splitmix64(state ^ first_sample as u64))
    }
}

/// SplitMix64 finalizer
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl StrainSource for SyntheticArchive {
    fn fetch(
        &self,
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    ) -> Result<TimeSeries, AcquisitionError> {
        let fs = self.config.sample_rate;
        if !(start.is_finite() && end.is_finite() && end > start) {
            return Err(AcquisitionError::RangeUnavailable {
                detector,
                start,
                end,
            });
        }
        let injection = self.config.injection_for(detector, start, end);
        let mode = injection.map(|inj| &inj.mode).unwrap_or(&DataMode::Noise);
        debug!(%detector, start, end, mode = mode.name(), "synthetic fetch");

        let n = ((end - start) * fs).round() as usize;
        let samples = match mode {
            DataMode::Unavailable => return Err(AcquisitionError::DetectorUnavailable(detector)),
            DataMode::Flatline => vec![0.0; n],
            DataMode::Gap => vec![f64::NAN; n],
            _ => {
                let first_sample = (start * fs).round() as i64;
                let mut rng = self.rng_for(detector, first_sample);
                let sigma = self.config.noise_sigma;
                let anchor = injection.map(|inj| inj.gps).unwrap_or(start);
                (0..n)
                    .map(|i| {
                        let t = start + i as f64 / fs - anchor;
                        self.noise.sample(&mut rng) + sigma * mode.waveform(t)
                    })
                    .collect()
            }
        };
        Ok(TimeSeries::new(samples, fs, start))
    }
}
