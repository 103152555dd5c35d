//! Event orchestration
//!
//! Runs the target list through the two audit pipelines and assembles one
//! result record per event, in input order.
//!
//! ## Event audit (pipeline A)
//!
//! ```text
//!   event ──► space-weather lookup
//!         ──► fetch ──► reconstruct ──► Q-transform peak ──┐   (fail-soft: 0.0 @ gps)
//!         ──► magnetic correlation ────────────────────────┼──► first-match classifier
//!                                                          └──► delay model ──► AnalysisResult
//! ```
//!
//! ## Symmetry audit (pipeline B)
//!
//! ```text
//!   event ──► per detector: fetch ──► band-pass ──► crop ──► asymmetry score
//!         ──► join ──► override-chain verdict ──► SymmetryResult
//! ```
//!
//! Per-detector work is independent and runs on rayon when the `parallel`
//! feature is enabled. Failures never abort an event: a missing detector or a
//! failed transform degrades the affected field and is logged at `warn`.

use serde::Serialize;

use crate::acquisition::{MagneticCorrelationSource, StrainSource};
use crate::asymmetry::{AsymmetryScore, AsymmetryScorer};
use crate::classifier::{
    Classification, EventClassifier, Evidence, SymmetryClassifier, SymmetryVerdict, VoteTally,
};
use crate::config::{AuditConfig, SymmetryConfig, TransformConfig};
use crate::delay::DelayEstimator;
use crate::filter::bandpass;
use crate::qtransform::{PeakExtractor, TfPeak};
use crate::reconstruct::{is_degenerate, Reconstructor};
use crate::space_weather::{ActivityStatus, SpaceWeatherTable};
use crate::types::{ConfigError, Detector, Event, GpsSeconds};

/// Outcome of one event audit. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub event_id: String,
    pub category: String,
    pub gps: GpsSeconds,
    /// Peak normalized energy, 0.0 when no transform was computed
    pub gravitational_strength: f64,
    pub peak_time: GpsSeconds,
    pub peak_frequency: f64,
    pub magnetic_strength: f64,
    pub space_weather: ActivityStatus,
    pub kp_index: u8,
    /// UTC date used for the space-weather lookup
    pub date: String,
    pub classification: Classification,
    /// Synthetic noise was injected into the analysed series
    pub reconstructed: bool,
    pub delay_s: f64,
    pub flash_gps: GpsSeconds,
    pub flash_utc: String,
    /// Why the strain measurement fell back to defaults, if it did
    pub degraded: Option<String>,
}

/// Strain measurement for one event.
#[derive(Debug, Clone, PartialEq)]
struct Measurement {
    peak: TfPeak,
    reconstructed: bool,
    degraded: Option<String>,
}

/// Single-detector event audit.
#[derive(Debug, Clone)]
pub struct EventAuditor {
    transform: TransformConfig,
    extractor: PeakExtractor,
    reconstructor: Reconstructor,
    classifier: EventClassifier,
    delay: DelayEstimator,
    space_weather: SpaceWeatherTable,
}

impl EventAuditor {
    pub fn new(config: &AuditConfig) -> Result<Self, ConfigError> {
        let calibration = &config.calibration;
        Ok(Self {
            transform: config.transform.clone(),
            extractor: PeakExtractor::new(config.transform.tiling.clone()),
            reconstructor: Reconstructor::new(
                calibration.reconstruction_noise_sigma,
                calibration.noise_seed,
            )?,
            classifier: EventClassifier::new(calibration.strength_threshold),
            delay: DelayEstimator::from_calibration(calibration),
            space_weather: config.space_weather.clone(),
        })
    }

    /// Audit every event, preserving input order.
    pub fn run<S, M>(&mut self, source: &S, magnetic: &M, events: &[Event]) -> Vec<AnalysisResult>
    where
        S: StrainSource + ?Sized,
        M: MagneticCorrelationSource + ?Sized,
    {
        tracing::info!(events = events.len(), detector = %self.transform.detector, "event audit started");
        events
            .iter()
            .map(|event| self.audit(source, magnetic, event))
            .collect()
    }

    /// Audit one event.
    pub fn audit<S, M>(&mut self, source: &S, magnetic: &M, event: &Event) -> AnalysisResult
    where
        S: StrainSource + ?Sized,
        M: MagneticCorrelationSource + ?Sized,
    {
        let span = tracing::info_span!("event", event = %event.id);
        let _enter = span.enter();

        let (weather, date) = self.space_weather.lookup(event.gps);
        tracing::debug!(%date, status = %weather.status, kp = weather.kp_index, "space weather");

        let measurement = self.measure(source, event);
        let magnetic_strength = sanitize_strength(magnetic.magnetic_strength(event));

        let classification = self.classifier.classify(&Evidence {
            gravitational_strength: measurement.peak.strength,
            magnetic_strength,
            status: weather.status,
            reconstructed: measurement.reconstructed,
        });
        let flash = self
            .delay
            .flash_time(measurement.peak.peak_time, measurement.peak.strength);

        tracing::info!(
            strength = measurement.peak.strength,
            magnetic = magnetic_strength,
            reconstructed = measurement.reconstructed,
            label = %classification,
            flash = %flash.flash_utc,
            "classified"
        );

        AnalysisResult {
            event_id: event.id.clone(),
            category: event.category.clone(),
            gps: event.gps,
            gravitational_strength: measurement.peak.strength,
            peak_time: measurement.peak.peak_time,
            peak_frequency: measurement.peak.peak_frequency,
            magnetic_strength,
            space_weather: weather.status,
            kp_index: weather.kp_index,
            date,
            classification,
            reconstructed: measurement.reconstructed,
            delay_s: flash.delay_s,
            flash_gps: flash.flash_gps,
            flash_utc: flash.flash_utc,
            degraded: measurement.degraded,
        }
    }

    /// Fetch, repair and transform. Never fails: any error yields the
    /// fallback peak at the event time.
    fn measure<S>(&mut self, source: &S, event: &Event) -> Measurement
    where
        S: StrainSource + ?Sized,
    {
        let detector = self.transform.detector;
        let (start, end) = self.transform.fetch_span(event.gps);
        let mut series = match source.fetch(detector, start, end) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(%detector, error = %e, "acquisition failed, using fallback peak");
                return Measurement {
                    peak: TfPeak::fallback(event.gps),
                    reconstructed: false,
                    degraded: Some(e.to_string()),
                };
            }
        };

        // Each event draws the same reproducible noise stream
        self.reconstructor.reset();
        let reconstructed = self.reconstructor.reconstruct(&mut series);

        let window = self.transform.window(event.gps);
        match self.extractor.extract(&series, window, self.transform.band) {
            Ok(peak) => {
                tracing::debug!(
                    q = peak.q,
                    frequency = peak.peak_frequency,
                    offset = peak.peak_time - event.gps,
                    "peak"
                );
                Measurement {
                    peak,
                    reconstructed,
                    degraded: None,
                }
            }
            Err(e) => {
                tracing::warn!(%detector, error = %e, "transform failed, using fallback peak");
                Measurement {
                    peak: TfPeak::fallback(event.gps),
                    reconstructed,
                    degraded: Some(e.to_string()),
                }
            }
        }
    }
}

/// Non-finite or negative strengths from a collaborator are read as 0.0.
fn sanitize_strength(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(value, "magnetic strength out of range, using 0.0");
        0.0
    }
}

/// One detector's contribution to a symmetry verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorScore {
    pub detector: Detector,
    pub score: AsymmetryScore,
    /// Why the score is unavailable, if it is
    pub degraded: Option<String>,
}

/// Outcome of one symmetry audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymmetryResult {
    pub event_id: String,
    pub category: String,
    pub gps: GpsSeconds,
    /// One entry per configured detector, in configuration order
    pub scores: Vec<DetectorScore>,
    pub kicks: usize,
    pub valid: usize,
    pub verdict: SymmetryVerdict,
}

impl SymmetryResult {
    pub fn score_for(&self, detector: Detector) -> Option<AsymmetryScore> {
        self.scores
            .iter()
            .find(|s| s.detector == detector)
            .map(|s| s.score)
    }
}

/// Multi-detector asymmetry audit.
#[derive(Debug, Clone)]
pub struct SymmetryAuditor {
    symmetry: SymmetryConfig,
    scorer: AsymmetryScorer,
    classifier: SymmetryClassifier,
}

impl SymmetryAuditor {
    pub fn new(config: &AuditConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            symmetry: config.symmetry.clone(),
            scorer: AsymmetryScorer::from_calibration(&config.calibration)?,
            classifier: SymmetryClassifier::new(
                config.calibration.kick_threshold,
                config.symmetry.symmetric_marker.clone(),
            ),
        })
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.symmetry.detectors
    }

    /// Audit every event, preserving input order.
    pub fn run<S>(&self, source: &S, events: &[Event]) -> Vec<SymmetryResult>
    where
        S: StrainSource + ?Sized,
    {
        tracing::info!(
            events = events.len(),
            detectors = self.symmetry.detectors.len(),
            "symmetry audit started"
        );
        events.iter().map(|event| self.audit(source, event)).collect()
    }

    /// Audit one event across all configured detectors.
    pub fn audit<S>(&self, source: &S, event: &Event) -> SymmetryResult
    where
        S: StrainSource + ?Sized,
    {
        let span = tracing::info_span!("event", event = %event.id);
        let _enter = span.enter();

        let scores = self.score_all(source, event);
        let values: Vec<AsymmetryScore> = scores.iter().map(|s| s.score).collect();
        let VoteTally { kicks, valid } = self.classifier.tally(&values);
        let verdict = self.classifier.classify(&values, &event.category);

        tracing::info!(kicks, valid, verdict = %verdict, "symmetry verdict");

        SymmetryResult {
            event_id: event.id.clone(),
            category: event.category.clone(),
            gps: event.gps,
            scores,
            kicks,
            valid,
            verdict,
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all<S>(&self, source: &S, event: &Event) -> Vec<DetectorScore>
    where
        S: StrainSource + ?Sized,
    {
        self.symmetry
            .detectors
            .iter()
            .map(|&detector| self.score_detector(source, detector, event))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn score_all<S>(&self, source: &S, event: &Event) -> Vec<DetectorScore>
    where
        S: StrainSource + ?Sized,
    {
        use rayon::prelude::*;

        let parent = tracing::Span::current();
        self.symmetry
            .detectors
            .par_iter()
            .map(|&detector| {
                let _enter = parent.enter();
                self.score_detector(source, detector, event)
            })
            .collect()
    }

    /// Score one detector. Never fails: problems yield an unavailable score.
    pub fn score_detector<S>(&self, source: &S, detector: Detector, event: &Event) -> DetectorScore
    where
        S: StrainSource + ?Sized,
    {
        let unavailable = |reason: String| {
            tracing::warn!(%detector, reason = %reason, "asymmetry score unavailable");
            DetectorScore {
                detector,
                score: AsymmetryScore::Unavailable,
                degraded: Some(reason),
            }
        };

        let (start, end) = self.symmetry.fetch_span(event.gps);
        let series = match source.fetch(detector, start, end) {
            Ok(series) => series,
            Err(e) => return unavailable(e.to_string()),
        };
        if is_degenerate(&series.samples) {
            return unavailable("segment carries no data".to_string());
        }

        let (low, high) = self.symmetry.band;
        let filtered = match bandpass(&series, low, high) {
            Ok(filtered) => filtered,
            Err(e) => return unavailable(e.to_string()),
        };
        let (w0, w1) = self.symmetry.window(event.gps);
        let Some(segment) = filtered.crop(w0, w1) else {
            return unavailable(format!("scoring window [{}, {}) outside data", w0, w1));
        };

        match self.scorer.score(&segment.samples) {
            AsymmetryScore::Unavailable => unavailable("no usable extrema".to_string()),
            score => {
                tracing::debug!(%detector, score = score.as_f64(), "asymmetry");
                DetectorScore {
                    detector,
                    score,
                    degraded: None,
                }
            }
        }
    }
}
