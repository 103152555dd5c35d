//! Data collaborators
//!
//! The pipelines never talk to an archive or an auxiliary-channel correlator
//! directly. They consume these two traits, so a remote archive client, a
//! local frame-file reader and the synthetic archive used in tests are
//! interchangeable.
//!
//! Both traits require `Send + Sync` so per-detector fetches can run on a
//! rayon pool when the `parallel` feature is enabled.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{AcquisitionError, Detector, Event, GpsSeconds, TimeSeries};

/// Fetch-by-detector-and-time strain source.
pub trait StrainSource: Send + Sync {
    /// Strain for `detector` covering `[start, end)` GPS seconds.
    ///
    /// Any failure is treated by the caller as absence of data for that
    /// detector and event, never as a fatal error.
    fn fetch(
        &self,
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    ) -> Result<TimeSeries, AcquisitionError>;
}

/// Magnetic-anomaly strength for an event.
pub trait MagneticCorrelationSource: Send + Sync {
    /// Nonnegative strength in the same units as the gravitational channel.
    fn magnetic_strength(&self, event: &Event) -> f64;
}

impl<T: StrainSource + ?Sized> StrainSource for &T {
    fn fetch(
        &self,
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    ) -> Result<TimeSeries, AcquisitionError> {
        (**self).fetch(detector, start, end)
    }
}

impl<T: StrainSource + ?Sized> StrainSource for Arc<T> {
    fn fetch(
        &self,
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    ) -> Result<TimeSeries, AcquisitionError> {
        (**self).fetch(detector, start, end)
    }
}

impl<T: MagneticCorrelationSource + ?Sized> MagneticCorrelationSource for &T {
    fn magnetic_strength(&self, event: &Event) -> f64 {
        (**self).magnetic_strength(event)
    }
}

impl<T: MagneticCorrelationSource + ?Sized> MagneticCorrelationSource for Arc<T> {
    fn magnetic_strength(&self, event: &Event) -> f64 {
        (**self).magnetic_strength(event)
    }
}

/// Strain source with nothing in it. Every fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyArchive;

impl StrainSource for EmptyArchive {
    fn fetch(
        &self,
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    ) -> Result<TimeSeries, AcquisitionError> {
        Err(AcquisitionError::RangeUnavailable {
            detector,
            start,
            end,
        })
    }
}

/// In-memory archive of pre-recorded segments, one per detector.
///
/// A fetch succeeds when the stored segment covers the requested span and
/// returns exactly the samples inside it.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    segments: HashMap<Detector, TimeSeries>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, detector: Detector, series: TimeSeries) {
        self.segments.insert(detector, series);
    }

    pub fn with(mut self, detector: Detector, series: TimeSeries) -> Self {
        self.insert(detector, series);
        self
    }
}

impl StrainSource for MemoryArchive {
    fn fetch(
        &self,
        detector: Detector,
        start: GpsSeconds,
        end: GpsSeconds,
    ) -> Result<TimeSeries, AcquisitionError> {
        let series = self
            .segments
            .get(&detector)
            .ok_or(AcquisitionError::DetectorUnavailable(detector))?;
        let slop = 0.5 / series.sample_rate;
        if start < series.t0 - slop || end > series.end_time() + slop {
            return Err(AcquisitionError::RangeUnavailable {
                detector,
                start,
                end,
            });
        }
        series
            .crop(start, end)
            .ok_or(AcquisitionError::RangeUnavailable {
                detector,
                start,
                end,
            })
    }
}

/// The same magnetic strength for every event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantMagnetic(pub f64);

impl MagneticCorrelationSource for ConstantMagnetic {
    fn magnetic_strength(&self, _event: &Event) -> f64 {
        self.0
    }
}
