//! FFT brick-wall band-pass
//!
//! Zeroes every frequency bin outside `[low, high]` on both halves of the
//! spectrum and transforms back. The response has no transition band, so a
//! tone inside the pass band is returned at full amplitude and one outside is
//! removed to numerical precision. Ringing at the segment edges is expected;
//! callers crop to an interior window before measuring amplitudes.

use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::types::{TimeSeries, TransformError};

/// Band-pass `series` to `[low, high]` Hz.
///
/// The output has the same length, rate and start time as the input.
pub fn bandpass(series: &TimeSeries, low: f64, high: f64) -> Result<TimeSeries, TransformError> {
    let n = series.len();
    let nyquist = series.nyquist();
    if !(low >= 0.0 && low < high && high <= nyquist) {
        return Err(TransformError::BandOutOfRange { low, high, nyquist });
    }
    if n < 2 {
        return Err(TransformError::InsufficientSamples {
            expected: 2,
            actual: n,
        });
    }
    if !series.is_finite() {
        return Err(TransformError::NonFiniteInput);
    }

    let mut planner = FftPlanner::<f64>::new();
    let mut buffer: Vec<Complex64> = series
        .samples
        .iter()
        .map(|&x| Complex64::new(x, 0.0))
        .collect();
    planner.plan_fft_forward(n).process(&mut buffer);

    let df = series.sample_rate / n as f64;
    for (k, bin) in buffer.iter_mut().enumerate() {
        // Bins above n/2 mirror negative frequencies
        let f = if k <= n / 2 { k as f64 * df } else { (n - k) as f64 * df };
        if f < low || f > high {
            *bin = Complex64::new(0.0, 0.0);
        }
    }

    planner.plan_fft_inverse(n).process(&mut buffer);
    let scale = 1.0 / n as f64;
    Ok(TimeSeries {
        samples: buffer.iter().map(|c| c.re * scale).collect(),
        sample_rate: series.sample_rate,
        t0: series.t0,
    })
}
