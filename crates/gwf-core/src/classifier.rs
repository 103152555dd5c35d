//! Decision fusion
//!
//! Two classifiers with deliberately different evaluation disciplines:
//!
//! | classifier           | evidence                                   | discipline                        |
//! |----------------------|--------------------------------------------|-----------------------------------|
//! | [`EventClassifier`]  | GW strength, magnetic strength, space weather | first matching rule wins       |
//! | [`SymmetryClassifier`] | per-detector asymmetry scores, category  | every matching rule overwrites    |
//!
//! Both are driven by explicit ordered rule tables ([`EVENT_RULES`],
//! [`SYMMETRY_RULES`]) rather than nested conditionals, so the priority of a
//! rule is its position in the table.
//!
//! # Example
//!
//! ```
//! use gwf_core::classifier::{Classification, EventClassifier, Evidence};
//! use gwf_core::space_weather::ActivityStatus;
//!
//! let classifier = EventClassifier::new(10.0);
//! let label = classifier.classify(&Evidence {
//!     gravitational_strength: 20.0,
//!     magnetic_strength: 15.0,
//!     status: ActivityStatus::Storm,
//!     reconstructed: false,
//! });
//! assert_eq!(label, Classification::SolarInterference);
//! assert_eq!(label.to_string(), "REJECTED (Solar Interference)");
//! ```

use serde::{Serialize, Serializer};
use std::fmt;

use crate::asymmetry::AsymmetryScore;
use crate::space_weather::ActivityStatus;

// ---------------------------------------------------------------------------
// Pipeline A: event classification
// ---------------------------------------------------------------------------

/// Everything the event classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evidence {
    pub gravitational_strength: f64,
    pub magnetic_strength: f64,
    pub status: ActivityStatus,
    /// Synthetic content was injected into the analysed series
    pub reconstructed: bool,
}

/// Event classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Magnetic transient during disturbed space weather
    SolarInterference,
    /// Magnetic transient during quiet space weather
    MagneticAnomaly,
    /// Gravitational strength above threshold
    ValidGw { recovered: bool },
    Inconclusive,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::SolarInterference => "REJECTED (Solar Interference)",
            Classification::MagneticAnomaly => "ANOMALY: Non-Solar Magnetic Transient",
            Classification::ValidGw { recovered: false } => "VALID GW EVENT",
            Classification::ValidGw { recovered: true } => "VALID GW EVENT (Recovered via NRR)",
            Classification::Inconclusive => "INCONCLUSIVE",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One row of the event rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRule {
    /// Disturbed space weather and a significant magnetic channel
    SolarVeto,
    /// Quiet space weather and a significant magnetic channel
    NonSolarMagnetic,
    /// Significant gravitational channel
    GravitationalSignal,
}

/// Event rules in priority order. Evaluation stops at the first match.
pub const EVENT_RULES: [EventRule; 3] = [
    EventRule::SolarVeto,
    EventRule::NonSolarMagnetic,
    EventRule::GravitationalSignal,
];

impl EventRule {
    pub fn apply(&self, evidence: &Evidence, threshold: f64) -> Option<Classification> {
        let magnetic = evidence.magnetic_strength > threshold;
        match self {
            EventRule::SolarVeto if magnetic && evidence.status.is_disturbed() => {
                Some(Classification::SolarInterference)
            }
            EventRule::NonSolarMagnetic if magnetic && evidence.status == ActivityStatus::Quiet => {
                Some(Classification::MagneticAnomaly)
            }
            EventRule::GravitationalSignal if evidence.gravitational_strength > threshold => {
                Some(Classification::ValidGw {
                    recovered: evidence.reconstructed,
                })
            }
            _ => None,
        }
    }
}

/// First-match classifier for single-detector events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventClassifier {
    strength_threshold: f64,
}

impl EventClassifier {
    pub fn new(strength_threshold: f64) -> Self {
        Self { strength_threshold }
    }

    pub fn strength_threshold(&self) -> f64 {
        self.strength_threshold
    }

    pub fn classify(&self, evidence: &Evidence) -> Classification {
        EVENT_RULES
            .iter()
            .find_map(|rule| rule.apply(evidence, self.strength_threshold))
            .unwrap_or(Classification::Inconclusive)
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new(10.0)
    }
}

// ---------------------------------------------------------------------------
// Pipeline B: symmetry verdict
// ---------------------------------------------------------------------------

/// Multi-detector symmetry verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymmetryVerdict {
    Symmetric,
    /// One or more detectors saw a unipolar kick
    VectorPulse,
    /// Kicks in more than one detector with more than one valid score
    GlobalShock,
    /// Expected-symmetric source with no kicks
    CleanWave,
}

impl SymmetryVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            SymmetryVerdict::Symmetric => "SYMMETRIC",
            SymmetryVerdict::VectorPulse => "VECTOR PULSE",
            SymmetryVerdict::GlobalShock => "GLOBAL SHOCK",
            SymmetryVerdict::CleanWave => "CLEAN WAVE",
        }
    }
}

impl fmt::Display for SymmetryVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SymmetryVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Vote counts over one event's detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally {
    /// Scores strictly above the kick threshold
    pub kicks: usize,
    /// Scores that are not unavailable
    pub valid: usize,
}

impl VoteTally {
    pub fn count(scores: &[AsymmetryScore], kick_threshold: f64) -> Self {
        scores.iter().fold(Self::default(), |tally, score| Self {
            kicks: tally.kicks + usize::from(score.exceeds(kick_threshold)),
            valid: tally.valid + usize::from(score.is_available()),
        })
    }
}

/// One row of the symmetry rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetryRule {
    AnyKick,
    MultiDetectorKick,
    SymmetricMarker,
}

/// Symmetry rules in evaluation order, starting from
/// [`SymmetryVerdict::Symmetric`]. Every matching rule overwrites the verdict.
pub const SYMMETRY_RULES: [SymmetryRule; 3] = [
    SymmetryRule::AnyKick,
    SymmetryRule::MultiDetectorKick,
    SymmetryRule::SymmetricMarker,
];

impl SymmetryRule {
    pub fn apply(&self, tally: VoteTally, marked_symmetric: bool) -> Option<SymmetryVerdict> {
        match self {
            SymmetryRule::AnyKick if tally.kicks >= 1 => Some(SymmetryVerdict::VectorPulse),
            SymmetryRule::MultiDetectorKick if tally.kicks > 1 && tally.valid > 1 => {
                Some(SymmetryVerdict::GlobalShock)
            }
            SymmetryRule::SymmetricMarker if marked_symmetric && tally.kicks == 0 => {
                Some(SymmetryVerdict::CleanWave)
            }
            _ => None,
        }
    }
}

/// Override-chain classifier for multi-detector asymmetry scores.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryClassifier {
    kick_threshold: f64,
    marker: String,
}

impl SymmetryClassifier {
    /// `marker` is matched as a case-sensitive substring of the event
    /// category. An empty marker never matches.
    pub fn new(kick_threshold: f64, marker: impl Into<String>) -> Self {
        Self {
            kick_threshold,
            marker: marker.into(),
        }
    }

    pub fn kick_threshold(&self) -> f64 {
        self.kick_threshold
    }

    pub fn is_marked_symmetric(&self, category: &str) -> bool {
        !self.marker.is_empty() && category.contains(self.marker.as_str())
    }

    pub fn tally(&self, scores: &[AsymmetryScore]) -> VoteTally {
        VoteTally::count(scores, self.kick_threshold)
    }

    pub fn classify(&self, scores: &[AsymmetryScore], category: &str) -> SymmetryVerdict {
        let tally = self.tally(scores);
        let marked = self.is_marked_symmetric(category);
        let mut verdict = SymmetryVerdict::Symmetric;
        for rule in SYMMETRY_RULES.iter() {
            if let Some(v) = rule.apply(tally, marked) {
                verdict = v;
            }
        }
        verdict
    }
}

impl Default for SymmetryClassifier {
    fn default() -> Self {
        Self::new(2.0, "Vacuum")
    }
}
