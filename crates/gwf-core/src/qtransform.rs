//! Q-transform time-frequency peak extraction
//!
//! Multi-resolution constant-Q analysis of a strain segment. Each Q plane
//! tiles the band with log-spaced frequency rows whose bandwidth scales with
//! frequency (Δf = f/Q'), so short high-frequency transients and long
//! low-frequency ones are both resolved. The plane with the loudest tile wins.
//!
//! ## Processing Chain
//!
//! ```text
//! x[n] ──► FFT ──► ÷ ASD(f) ──► for each Q plane, for each row f:
//!                  (Welch)         bisquare window around f
//!                                  IFFT to 2^k tile samples
//!                                  |·|² / (median / ln 2)   = normalized energy
//!                               ──► resample rows onto the output time grid
//!                               ──► keep the plane with the largest tile
//! ```
//!
//! Normalized energy of stationary Gaussian noise is exponentially distributed
//! with unit mean; a coherent transient of matched-filter SNR ρ peaks near
//! ρ²/2.
//!
//! ## Peak Convention
//!
//! The map is stored time-major (`energy[t * n_freq + f]`). The reported peak
//! is the first strict maximum in that scan order, so exact ties resolve to
//! the earliest time bin, then the lowest frequency row.
//!
//! ## Example
//!
//! ```rust
//! use gwf_core::qtransform::{PeakExtractor, QTransformConfig};
//! use gwf_core::types::TimeSeries;
//! use rand::{rngs::StdRng, SeedableRng};
//! use rand_distr::{Distribution, Normal};
//!
//! let fs = 1024.0;
//! let mut rng = StdRng::seed_from_u64(1);
//! let noise = Normal::new(0.0, 1.0).unwrap();
//! let samples: Vec<f64> = (0..4096)
//!     .map(|i| {
//!         let t = i as f64 / fs - 2.0;
//!         let burst = 3.0 * (-(t / 0.05).powi(2)).exp() * (2.0 * std::f64::consts::PI * 100.0 * t).sin();
//!         burst + noise.sample(&mut rng)
//!     })
//!     .collect();
//! let series = TimeSeries::new(samples, fs, 0.0);
//!
//! let extractor = PeakExtractor::new(QTransformConfig::default());
//! let peak = extractor.extract(&series, (1.5, 2.5), (20.0, 300.0)).unwrap();
//! assert!((peak.peak_time - 2.0).abs() < 0.1);
//! ```

use rustfft::{num_complex::Complex64, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f64::consts::{LN_2, PI};

use crate::types::{GpsSeconds, TimeSeries, TransformError};

/// Q-transform tiling and output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QTransformConfig {
    /// Lowest and highest quality factor
    pub q_range: (f64, f64),
    /// Maximum fractional energy loss between adjacent tiles
    pub mismatch: f64,
    /// Number of output time columns across the window
    pub time_bins: usize,
    /// Divide the spectrum by the Welch ASD before tiling
    pub whiten: bool,
    /// Welch segment length in seconds (rounded to a power of two in samples)
    pub whitening_segment_s: f64,
    /// Shortest series accepted
    pub min_samples: usize,
}

impl Default for QTransformConfig {
    fn default() -> Self {
        Self {
            q_range: (4.0, 64.0),
            mismatch: 0.2,
            time_bins: 1000,
            whiten: true,
            whitening_segment_s: 2.0,
            min_samples: 256,
        }
    }
}

/// Time-frequency energy map for one Q plane, restricted to the output window.
#[derive(Debug, Clone, PartialEq)]
pub struct TfMap {
    /// GPS time of each column
    pub times: Vec<GpsSeconds>,
    /// Centre frequency of each row in Hz
    pub frequencies: Vec<f64>,
    /// Quality factor of the plane
    pub q: f64,
    /// Normalized energy, time-major: `energy[t * frequencies.len() + f]`
    pub energy: Vec<f64>,
}

impl TfMap {
    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    pub fn n_freqs(&self) -> usize {
        self.frequencies.len()
    }

    pub fn at(&self, time_idx: usize, freq_idx: usize) -> f64 {
        self.energy[time_idx * self.n_freqs() + freq_idx]
    }

    /// First strict maximum in row-major (time-major) order.
    ///
    /// Returns `(time_idx, freq_idx, energy)`, or `None` for an empty map.
    pub fn argmax(&self) -> Option<(usize, usize, f64)> {
        let nf = self.n_freqs();
        if nf == 0 || self.energy.is_empty() {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for (idx, &e) in self.energy.iter().enumerate() {
            if e.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if e <= b => {}
                _ => best = Some((idx, e)),
            }
        }
        best.map(|(idx, e)| (idx / nf, idx % nf, e))
    }

    /// Largest energy in the map (0.0 when empty).
    pub fn max(&self) -> f64 {
        self.argmax().map(|(_, _, e)| e).unwrap_or(0.0)
    }

    pub fn peak(&self) -> Option<TfPeak> {
        self.argmax().map(|(ti, fi, e)| TfPeak {
            strength: e,
            peak_time: self.times[ti],
            peak_frequency: self.frequencies[fi],
            q: self.q,
        })
    }
}

/// Loudest tile of a Q-transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfPeak {
    /// Peak normalized energy (nonnegative)
    pub strength: f64,
    /// GPS time of the column holding the peak
    pub peak_time: GpsSeconds,
    /// Row frequency of the peak in Hz
    pub peak_frequency: f64,
    /// Quality factor of the winning plane
    pub q: f64,
}

impl TfPeak {
    /// Fail-soft value used when no transform could be computed: zero
    /// strength, peak placed at the reference instant.
    pub fn fallback(reference: GpsSeconds) -> Self {
        Self {
            strength: 0.0,
            peak_time: reference,
            peak_frequency: 0.0,
            q: 0.0,
        }
    }
}

/// One Q plane of the tiling.
#[derive(Debug, Clone, PartialEq)]
pub struct QPlane {
    pub q: f64,
    pub frequencies: Vec<f64>,
}

/// Compute the Q planes covering `band` for a segment of `duration` seconds.
pub fn q_tiling(
    q_range: (f64, f64),
    mismatch: f64,
    band: (f64, f64),
    duration: f64,
    sample_rate: f64,
) -> Vec<QPlane> {
    let (qmin, qmax) = q_range;
    let deltam = 2.0 * (mismatch / 3.0).sqrt();
    let qcum = (qmax / qmin).ln() / 2f64.sqrt();
    let nplanes = ((qcum / deltam).ceil() as usize).max(1);
    let dq = qcum / nplanes as f64;
    let fstepmin = 1.0 / duration;

    let mut planes = Vec::with_capacity(nplanes);
    for i in 0..nplanes {
        let q = qmin * (2f64.sqrt() * dq * (i as f64 + 0.5)).exp();
        let qprime = q / 11f64.sqrt();
        let fmin = band.0.max(50.0 * q / (2.0 * PI * duration));
        let fmax = band.1.min(sample_rate / 2.0 / (1.0 + 1.0 / qprime));
        if fmin >= fmax {
            continue;
        }

        let qfactor = (2.0 + q * q).sqrt();
        let fcum = (fmax / fmin).ln() * qfactor / 2.0;
        let nfreq = ((fcum / deltam).ceil() as usize).max(1);
        let fstep = fcum / nfreq as f64;

        let mut frequencies: Vec<f64> = Vec::with_capacity(nfreq);
        for j in 0..nfreq {
            let f = fmin * (2.0 / qfactor * (j as f64 + 0.5) * fstep).exp();
            // Snap to the segment's frequency resolution
            let f = (f / fstepmin).floor() * fstepmin;
            if f > 0.0 && frequencies.last().map_or(true, |&last| f > last) {
                frequencies.push(f);
            }
        }
        if !frequencies.is_empty() {
            planes.push(QPlane { q, frequencies });
        }
    }
    planes
}

/// Q-transform peak extractor.
#[derive(Debug, Clone)]
pub struct PeakExtractor {
    config: QTransformConfig,
}

impl PeakExtractor {
    pub fn new(config: QTransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QTransformConfig {
        &self.config
    }

    /// Loudest tile of the best plane within `window` and `band`.
    pub fn extract(
        &self,
        series: &TimeSeries,
        window: (GpsSeconds, GpsSeconds),
        band: (f64, f64),
    ) -> Result<TfPeak, TransformError> {
        self.q_transform(series, window, band)?
            .peak()
            .ok_or(TransformError::EmptyTiling)
    }

    /// Full energy map of the best Q plane over `window` × `band`.
    pub fn q_transform(
        &self,
        series: &TimeSeries,
        window: (GpsSeconds, GpsSeconds),
        band: (f64, f64),
    ) -> Result<TfMap, TransformError> {
        self.validate(series, window, band)?;

        let n = series.len();
        let fs = series.sample_rate;
        let duration = series.duration();
        let mut planner = FftPlanner::<f64>::new();

        let spectrum = self.conditioned_spectrum(&series.samples, fs, &mut planner);

        let planes = q_tiling(self.config.q_range, self.config.mismatch, band, duration, fs);
        if planes.is_empty() {
            return Err(TransformError::EmptyTiling);
        }

        let nt = self.config.time_bins.max(1);
        let dt = (window.1 - window.0) / nt as f64;
        let times: Vec<GpsSeconds> = (0..nt).map(|j| window.0 + j as f64 * dt).collect();
        // Fractional position of each output column within the segment
        let positions: Vec<f64> = times.iter().map(|&t| (t - series.t0) / duration).collect();

        let mut best: Option<TfMap> = None;
        for plane in &planes {
            let nf = plane.frequencies.len();
            let mut energy = vec![0.0; nt * nf];
            for (fi, &f) in plane.frequencies.iter().enumerate() {
                let row = tile_energy(&spectrum, n, plane.q, f, duration, &mut planner);
                for (ti, &pos) in positions.iter().enumerate() {
                    energy[ti * nf + fi] = interpolate_circular(&row, pos);
                }
            }
            let map = TfMap {
                times: times.clone(),
                frequencies: plane.frequencies.clone(),
                q: plane.q,
                energy,
            };
            let peak = map.max();
            tracing::debug!(q = plane.q, rows = nf, peak, "q plane");
            if best.as_ref().map_or(true, |b| peak > b.max()) {
                best = Some(map);
            }
        }

        best.ok_or(TransformError::EmptyTiling)
    }

    fn validate(
        &self,
        series: &TimeSeries,
        window: (GpsSeconds, GpsSeconds),
        band: (f64, f64),
    ) -> Result<(), TransformError> {
        let min = self.config.min_samples.max(4);
        if series.len() < min {
            return Err(TransformError::InsufficientSamples {
                expected: min,
                actual: series.len(),
            });
        }
        // Allow sub-sample slop from GPS rounding at the edges
        let slop = 0.5 / series.sample_rate;
        if !(window.0 < window.1)
            || window.0 < series.t0 - slop
            || window.1 > series.end_time() + slop
        {
            return Err(TransformError::WindowOutOfRange {
                start: window.0,
                end: window.1,
                series_start: series.t0,
                series_end: series.end_time(),
            });
        }
        let nyquist = series.nyquist();
        if !(band.0 > 0.0 && band.0 < band.1 && band.1 < nyquist) {
            return Err(TransformError::BandOutOfRange {
                low: band.0,
                high: band.1,
                nyquist,
            });
        }
        if !series.is_finite() {
            return Err(TransformError::NonFiniteInput);
        }
        Ok(())
    }

    /// One-sided spectrum (`n/2 + 1` bins), whitened when configured.
    fn conditioned_spectrum(
        &self,
        samples: &[f64],
        fs: f64,
        planner: &mut FftPlanner<f64>,
    ) -> Vec<Complex64> {
        let n = samples.len();
        let mut buffer: Vec<Complex64> = samples.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        planner.plan_fft_forward(n).process(&mut buffer);
        buffer.truncate(n / 2 + 1);

        if !self.config.whiten {
            return buffer;
        }
        let Some((asd, seglen)) = welch_asd(samples, fs, self.config.whitening_segment_s, planner)
        else {
            tracing::debug!(samples = n, "no whitening estimate, using raw spectrum");
            return buffer;
        };

        for (k, bin) in buffer.iter_mut().enumerate() {
            // Welch bin spacing is fs/seglen; series bin spacing is fs/n
            let pos = k as f64 * seglen as f64 / n as f64;
            let a = interpolate_clamped(&asd, pos);
            *bin = if a.is_finite() && a > 0.0 {
                *bin / a
            } else {
                Complex64::new(0.0, 0.0)
            };
        }
        buffer
    }
}

/// Median-averaged Welch amplitude spectral density (Hann window, 50 % overlap).
///
/// The per-bin median keeps a loud transient in one or two segments from
/// inflating the noise estimate it is later divided by. Returns the one-sided
/// ASD and the segment length used, or `None` when the series cannot hold one
/// 16-sample segment.
pub fn welch_asd(
    samples: &[f64],
    fs: f64,
    segment_s: f64,
    planner: &mut FftPlanner<f64>,
) -> Option<(Vec<f64>, usize)> {
    let n = samples.len();
    let target = segment_s * fs;
    if !target.is_finite() || target <= 0.0 || n == 0 {
        return None;
    }
    let mut seglen = (target.clamp(1.0, n as f64) as usize).next_power_of_two();
    while seglen > n {
        seglen /= 2;
    }
    if seglen < 16 {
        return None;
    }
    let hop = seglen / 2;
    let window: Vec<f64> = (0..seglen)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (seglen - 1) as f64).cos()))
        .collect();
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let fft = planner.plan_fft_forward(seglen);

    let nbins = seglen / 2 + 1;
    let mut periodograms: Vec<Vec<f64>> = Vec::new();
    let mut start = 0;
    let mut buffer = vec![Complex64::new(0.0, 0.0); seglen];
    while start + seglen <= n {
        for (i, b) in buffer.iter_mut().enumerate() {
            *b = Complex64::new(samples[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);
        periodograms.push(buffer[..nbins].iter().map(|c| c.norm_sqr()).collect());
        start += hop;
    }

    // Median of an exponential variate is ln 2 times its mean
    let scale = 2.0 / (fs * window_power * LN_2);
    let mut column = vec![0.0; periodograms.len()];
    let asd = (0..nbins)
        .map(|k| {
            for (c, p) in column.iter_mut().zip(periodograms.iter()) {
                *c = p[k];
            }
            (median(&column) * scale).sqrt()
        })
        .collect();
    Some((asd, seglen))
}

/// Normalized energy of one frequency row across the whole segment.
fn tile_energy(
    spectrum: &[Complex64],
    n: usize,
    q: f64,
    frequency: f64,
    duration: f64,
    planner: &mut FftPlanner<f64>,
) -> Vec<f64> {
    let qprime = q / 11f64.sqrt();
    let half = (frequency / qprime * duration).floor() as i64;
    let windowsize = (2 * half + 1) as usize;
    let ntiles = windowsize.next_power_of_two();
    let norm = (315.0 * qprime / (128.0 * frequency)).sqrt();
    let center = frequency * duration;
    let nbins = spectrum.len().min(n / 2 + 1) as i64;

    let pad = ntiles - windowsize;
    let left = pad.saturating_sub(1) / 2;
    let mut buffer = vec![Complex64::new(0.0, 0.0); ntiles];
    for k in -half..=half {
        let idx = (k as f64 + center).round() as i64;
        if idx < 0 || idx >= nbins {
            continue;
        }
        let x = k as f64 / duration * qprime / frequency;
        let w = (1.0 - x * x).powi(2) * norm;
        buffer[left + (k + half) as usize] = spectrum[idx as usize] * w;
    }
    // Negative offsets wrap to the end before the inverse transform
    buffer.rotate_left(ntiles / 2);
    planner.plan_fft_inverse(ntiles).process(&mut buffer);

    let energy: Vec<f64> = buffer.iter().map(|c| c.norm_sqr()).collect();
    let mean = median(&energy) / LN_2;
    if mean > 0.0 && mean.is_finite() {
        energy.iter().map(|e| e / mean).collect()
    } else {
        vec![0.0; ntiles]
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Linear interpolation of a periodic row at fractional position `pos` ∈ [0, 1).
fn interpolate_circular(row: &[f64], pos: f64) -> f64 {
    let len = row.len();
    if len == 0 {
        return 0.0;
    }
    let x = pos.rem_euclid(1.0) * len as f64;
    let i0 = (x.floor() as usize) % len;
    let i1 = (i0 + 1) % len;
    let frac = x - x.floor();
    row[i0] * (1.0 - frac) + row[i1] * frac
}

/// Linear interpolation at fractional index `pos`, clamped to the ends.
fn interpolate_clamped(values: &[f64], pos: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let last = values.len() - 1;
    if pos <= 0.0 {
        return values[0];
    }
    if pos >= last as f64 {
        return values[last];
    }
    let i0 = pos.floor() as usize;
    let frac = pos - i0 as f64;
    values[i0] * (1.0 - frac) + values[i0 + 1] * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    const FS: f64 = 1024.0;

    fn noise(n: usize, sigma: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    fn sine_gaussian(n: usize, fs: f64, t_center: f64, f0: f64, tau: f64, amp: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 / fs - t_center;
                amp * (-(t / tau).powi(2)).exp() * (2.0 * PI * f0 * t).sin()
            })
            .collect()
    }

    fn burst_series(t0: f64) -> TimeSeries {
        let n = 8 * FS as usize;
        let mut samples = noise(n, 1.0, 11);
        let burst = sine_gaussian(n, FS, 4.3, 120.0, 0.05, 3.0);
        for (s, b) in samples.iter_mut().zip(burst.iter()) {
            *s += b;
        }
        TimeSeries::new(samples, FS, t0)
    }

    #[test]
    fn test_tiling_covers_band() {
        let planes = q_tiling((4.0, 64.0), 0.2, (20.0, 400.0), 8.0, FS);
        assert!(!planes.is_empty());
        for plane in &planes {
            assert!(plane.q >= 4.0 && plane.q <= 64.0);
            assert!(plane.frequencies.windows(2).all(|w| w[0] < w[1]));
            assert!(plane.frequencies[0] >= 20.0 - 1.0 / 8.0);
            assert!(*plane.frequencies.last().unwrap() <= 400.0);
        }
        assert!(planes.windows(2).all(|w| w[0].q < w[1].q));
    }

    #[test]
    fn test_tiling_empty_when_band_below_resolution() {
        // 50·Q/(2πT) exceeds the band for every plane of a 0.25 s segment
        let planes = q_tiling((4.0, 64.0), 0.2, (20.0, 30.0), 0.25, FS);
        assert!(planes.is_empty());
    }

    #[test]
    fn test_burst_peak_time_and_frequency() {
        let t0 = 1_000_000_000.0;
        let series = burst_series(t0);
        let extractor = PeakExtractor::new(QTransformConfig::default());
        let peak = extractor
            .extract(&series, (t0 + 3.5, t0 + 5.5), (20.0, 400.0))
            .unwrap();
        assert!(peak.strength > 50.0, "strength {}", peak.strength);
        assert!((peak.peak_time - (t0 + 4.3)).abs() < 0.05, "peak at {}", peak.peak_time - t0);
        assert!((peak.peak_frequency - 120.0).abs() < 30.0, "freq {}", peak.peak_frequency);
    }

    #[test]
    fn test_noise_only_energy_is_modest() {
        let series = TimeSeries::new(noise(8 * FS as usize, 1.0, 5), FS, 0.0);
        let extractor = PeakExtractor::new(QTransformConfig::default());
        let map = extractor.q_transform(&series, (3.0, 5.0), (20.0, 400.0)).unwrap();
        assert!(map.max() < 40.0, "noise max {}", map.max());
        assert!(map.energy.iter().all(|e| *e >= 0.0 && e.is_finite()));
    }

    #[test]
    fn test_whitening_is_scale_invariant() {
        let base = burst_series(0.0);
        let mut scaled = base.clone();
        for s in scaled.samples.iter_mut() {
            *s *= 1e-21;
        }
        let extractor = PeakExtractor::new(QTransformConfig::default());
        let a = extractor.extract(&base, (3.5, 5.5), (20.0, 400.0)).unwrap();
        let b = extractor.extract(&scaled, (3.5, 5.5), (20.0, 400.0)).unwrap();
        assert_relative_eq!(a.strength, b.strength, max_relative = 1e-6);
        assert_relative_eq!(a.peak_time, b.peak_time);
    }

    #[test]
    fn test_map_shape_and_grid() {
        let series = burst_series(100.0);
        let config = QTransformConfig {
            time_bins: 200,
            ..Default::default()
        };
        let map = PeakExtractor::new(config)
            .q_transform(&series, (103.5, 105.5), (20.0, 400.0))
            .unwrap();
        assert_eq!(map.n_times(), 200);
        assert_eq!(map.energy.len(), 200 * map.n_freqs());
        assert_relative_eq!(map.times[0], 103.5);
        assert_relative_eq!(map.times[1] - map.times[0], 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_argmax_tie_break_is_time_major_first() {
        let map = TfMap {
            times: vec![10.0, 11.0, 12.0],
            frequencies: vec![50.0, 100.0],
            q: 8.0,
            // t=0: [1, 5]  t=1: [5, 2]  t=2: [0, 5]
            energy: vec![1.0, 5.0, 5.0, 2.0, 0.0, 5.0],
        };
        assert_eq!(map.argmax(), Some((0, 1, 5.0)));
        let peak = map.peak().unwrap();
        assert_eq!(peak.peak_time, 10.0);
        assert_eq!(peak.peak_frequency, 100.0);
    }

    #[test]
    fn test_argmax_skips_nan_and_empty() {
        let map = TfMap {
            times: vec![0.0, 1.0],
            frequencies: vec![10.0],
            q: 4.0,
            energy: vec![f64::NAN, 3.0],
        };
        assert_eq!(map.argmax(), Some((1, 0, 3.0)));

        let empty = TfMap {
            times: vec![],
            frequencies: vec![],
            q: 4.0,
            energy: vec![],
        };
        assert!(empty.argmax().is_none());
        assert_eq!(empty.max(), 0.0);
    }

    #[test]
    fn test_rejects_short_series() {
        let series = TimeSeries::new(vec![1.0; 10], FS, 0.0);
        let err = PeakExtractor::new(QTransformConfig::default())
            .extract(&series, (0.0, 0.005), (20.0, 400.0))
            .unwrap_err();
        assert!(matches!(err, TransformError::InsufficientSamples { actual: 10, .. }));
    }

    #[test]
    fn test_rejects_window_outside_series() {
        let series = burst_series(0.0);
        let err = PeakExtractor::new(QTransformConfig::default())
            .extract(&series, (7.0, 9.0), (20.0, 400.0))
            .unwrap_err();
        assert!(matches!(err, TransformError::WindowOutOfRange { .. }));
    }

    #[test]
    fn test_rejects_band_above_nyquist() {
        let series = burst_series(0.0);
        let err = PeakExtractor::new(QTransformConfig::default())
            .extract(&series, (3.0, 5.0), (20.0, 600.0))
            .unwrap_err();
        assert!(matches!(err, TransformError::BandOutOfRange { .. }));
    }

    #[test]
    fn test_rejects_non_finite_samples() {
        let mut series = burst_series(0.0);
        series.samples[100] = f64::NAN;
        let err = PeakExtractor::new(QTransformConfig::default())
            .extract(&series, (3.0, 5.0), (20.0, 400.0))
            .unwrap_err();
        assert_eq!(err, TransformError::NonFiniteInput);
    }

    #[test]
    fn test_fallback_peak() {
        let peak = TfPeak::fallback(1_242_442_967.4);
        assert_eq!(peak.strength, 0.0);
        assert_eq!(peak.peak_time, 1_242_442_967.4);
    }

    #[test]
    fn test_welch_asd_of_white_noise_is_flat() {
        let samples = noise(16384, 1.0, 3);
        let mut planner = FftPlanner::new();
        let (asd, seglen) = welch_asd(&samples, FS, 2.0, &mut planner).unwrap();
        assert_eq!(seglen, 2048);
        // White noise of unit variance: one-sided PSD = 2/fs
        let expected = (2.0 / FS).sqrt();
        let mid = &asd[100..900];
        let mean = mid.iter().sum::<f64>() / mid.len() as f64;
        assert_relative_eq!(mean, expected, max_relative = 0.1);
    }

    #[test]
    fn test_welch_asd_rejects_unbounded_segment() {
        let samples = noise(4096, 1.0, 4);
        let mut planner = FftPlanner::new();
        assert!(welch_asd(&samples, FS, f64::INFINITY, &mut planner).is_none());
        assert!(welch_asd(&samples, FS, f64::NAN, &mut planner).is_none());
        assert!(welch_asd(&samples, FS, -1.0, &mut planner).is_none());
        // Finite but far longer than the series shrinks to fit
        let (_, seglen) = welch_asd(&samples, FS, 1e300, &mut planner).unwrap();
        assert_eq!(seglen, 4096);
    }

    #[test]
    fn test_infinite_whitening_segment_does_not_panic() {
        let config = QTransformConfig {
            whitening_segment_s: f64::INFINITY,
            ..Default::default()
        };
        let peak = PeakExtractor::new(config)
            .extract(&burst_series(0.0), (3.5, 5.5), (20.0, 400.0))
            .unwrap();
        assert!(peak.strength.is_finite());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }
}
