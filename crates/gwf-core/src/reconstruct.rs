//! Degenerate-segment reconstruction
//!
//! Archives return missing or censored strain as all-NaN or all-zero blocks.
//! Both break the downstream transforms: a constant series has no spectrum to
//! whiten and normalized tile energies become 0/0. The reconstructor replaces
//! such a segment with zero-mean Gaussian noise of negligible amplitude so the
//! pipeline keeps running.
//!
//! **The output is synthetic.** Nothing about the original signal is
//! recovered. Callers must carry the returned flag into the result record so
//! any classification built on reconstructed data is marked as such.
//!
//! ```text
//!   [NaN NaN NaN ... NaN]  ──►  [ε₀ ε₁ ε₂ ... εₙ]    εᵢ ~ N(0, σ²), σ ≈ 1e-20
//!   [0.0 0.0 0.0 ... 0.0]  ──►  [ε₀ ε₁ ε₂ ... εₙ]
//!   [x₀  x₁  x₂  ... xₙ ]  ──►  unchanged
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gwf_core::reconstruct::Reconstructor;
//! use gwf_core::types::TimeSeries;
//!
//! let mut recon = Reconstructor::new(1e-20, 42).unwrap();
//! let mut flat = TimeSeries::new(vec![f64::NAN; 64], 4096.0, 0.0);
//! assert!(recon.reconstruct(&mut flat));
//! assert!(flat.is_finite());
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::types::{ConfigError, TimeSeries};

/// True when no sample carries information: every sample is NaN or exactly
/// zero. Empty series are not degenerate, there is nothing to fill.
pub fn is_degenerate(samples: &[f64]) -> bool {
    !samples.is_empty() && samples.iter().all(|&s| s.is_nan() || s == 0.0)
}

/// Noise-injection reconstructor with a reproducible random stream.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    noise: Normal<f64>,
    seed: u64,
    rng: StdRng,
}

impl Reconstructor {
    /// `noise_sigma` must be finite and strictly positive.
    pub fn new(noise_sigma: f64, seed: u64) -> Result<Self, ConfigError> {
        if !(noise_sigma.is_finite() && noise_sigma > 0.0) {
            return Err(ConfigError::Validation(format!(
                "reconstruction_noise_sigma must be finite and > 0, got {}",
                noise_sigma
            )));
        }
        let noise = Normal::new(0.0, noise_sigma)
            .map_err(|e| ConfigError::Validation(format!("reconstruction noise: {}", e)))?;
        Ok(Self {
            noise,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn noise_sigma(&self) -> f64 {
        self.noise.std_dev()
    }

    /// Repair `series` in place if it is degenerate.
    ///
    /// Returns `true` when synthetic content was injected. Non-degenerate
    /// series are left untouched.
    pub fn reconstruct(&mut self, series: &mut TimeSeries) -> bool {
        if !is_degenerate(&series.samples) {
            return false;
        }
        for sample in series.samples.iter_mut() {
            if sample.is_nan() {
                *sample = 0.0;
            }
            *sample += self.noise.sample(&mut self.rng);
        }
        tracing::warn!(
            samples = series.len(),
            sigma = self.noise_sigma(),
            "degenerate segment replaced with synthetic noise"
        );
        true
    }

    /// Restart the random stream from the construction seed.
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}
