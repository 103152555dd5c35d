//! # GW Candidate Audit Core
//!
//! Signal conditioning and decision fusion for auditing gravitational-wave
//! candidate events against auxiliary magnetic and space-weather evidence.
//!
//! ## Overview
//!
//! Two pipelines share the same building blocks:
//!
//! - **Event audit**: repair degenerate strain, extract the loudest
//!   Q-transform tile, fuse it with magnetic strength and the space-weather
//!   record into a classification, and predict the counterpart arrival time
//! - **Symmetry audit**: band-limit each detector's strain, score the
//!   positive/negative amplitude asymmetry, and fuse the scores into a verdict
//!
//! ## Signal Flow
//!
//! ```text
//! A: fetch → Reconstructor → PeakExtractor ─┐
//!    SpaceWeatherTable ─────────────────────┼→ EventClassifier → DelayEstimator → AnalysisResult
//!    MagneticCorrelationSource ─────────────┘
//!
//! B: fetch(H1, L1, V1) → bandpass → crop → AsymmetryScorer → SymmetryClassifier → SymmetryResult
//! ```
//!
//! Data acquisition and magnetic correlation are collaborators behind the
//! [`StrainSource`] and [`MagneticCorrelationSource`] traits. Only
//! configuration errors are fatal; everything else degrades a field.
//!
//! ## Example
//!
//! ```rust
//! use gwf_core::prelude::*;
//! use gwf_core::acquisition::{ConstantMagnetic, EmptyArchive};
//!
//! let config = AuditConfig::default();
//! let mut auditor = EventAuditor::new(&config).unwrap();
//! let results = auditor.run(&EmptyArchive, &ConstantMagnetic(0.5), &config.targets);
//!
//! // No data anywhere: every event falls back to INCONCLUSIVE
//! assert!(results.iter().all(|r| r.classification == Classification::Inconclusive));
//! println!("{}", EventReport::new(results).render_table());
//! ```

pub mod acquisition;
pub mod asymmetry;
pub mod classifier;
pub mod config;
pub mod delay;
pub mod filter;
pub mod gps_time;
pub mod logging;
pub mod pipeline;
pub mod qtransform;
pub mod reconstruct;
pub mod report;
pub mod space_weather;
pub mod types;

pub use acquisition::{MagneticCorrelationSource, StrainSource};
pub use asymmetry::{AsymmetryScore, AsymmetryScorer};
pub use classifier::{Classification, EventClassifier, SymmetryClassifier, SymmetryVerdict};
pub use config::AuditConfig;
pub use delay::DelayEstimator;
pub use pipeline::{AnalysisResult, EventAuditor, SymmetryAuditor, SymmetryResult};
pub use qtransform::{PeakExtractor, QTransformConfig, TfPeak};
pub use reconstruct::Reconstructor;
pub use report::{EventReport, SymmetryReport};
pub use types::{AcquisitionError, ConfigError, Detector, Event, TimeSeries, TransformError};

/// Prelude for common imports
pub mod prelude {
    pub use crate::acquisition::{MagneticCorrelationSource, StrainSource};
    pub use crate::asymmetry::AsymmetryScore;
    pub use crate::classifier::{Classification, SymmetryVerdict};
    pub use crate::config::AuditConfig;
    pub use crate::pipeline::{EventAuditor, SymmetryAuditor};
    pub use crate::report::{EventReport, SymmetryReport};
    pub use crate::space_weather::ActivityStatus;
    pub use crate::types::{Detector, Event, TimeSeries};
}
