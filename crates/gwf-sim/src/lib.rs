//! # Synthetic Archive
//!
//! Deterministic stand-ins for the two data collaborators of `gwf-core`:
//!
//! - [`SyntheticArchive`]: a [`StrainSource`](gwf_core::StrainSource) that
//!   serves seeded Gaussian noise with per-event injections (bursts, pulse
//!   trains, flatlines, gaps, missing detectors)
//! - [`MagneticOverrides`]: a
//!   [`MagneticCorrelationSource`](gwf_core::MagneticCorrelationSource) with a
//!   baseline strength and per-event overrides
//!
//! [`ScenarioConfig::demo`] reproduces the reference target list: one storm-day
//! calibration transient, one censored candidate with a magnetic anomaly,
//! and one confirmed merger.
//!
//! ```rust
//! use gwf_core::prelude::*;
//! use gwf_sim::{ScenarioConfig, SyntheticArchive};
//!
//! let archive = SyntheticArchive::new(ScenarioConfig::demo()).unwrap();
//! let strain = archive.fetch(Detector::L1, 1_242_442_963.4, 1_242_442_971.4).unwrap();
//! assert_eq!(strain.len(), 8 * 4096);
//! ```

pub mod archive;
pub mod magnetic;
pub mod scenario;

#[cfg(test)]
mod end_to_end;

pub use archive::SyntheticArchive;
pub use magnetic::MagneticOverrides;
pub use scenario::{DataMode, Injection, ScenarioConfig};
