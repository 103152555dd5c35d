//! # Configuration System
//!
//! YAML-based configuration for audit runs:
//!
//! - Calibration constants (delay model, thresholds, reconstruction noise)
//! - Q-transform window, band and tiling
//! - Multi-detector symmetry settings
//! - Logging
//! - The target list and the space-weather table
//!
//! Every field has a compiled-in default that reproduces the reference
//! calibration, so a config file is optional and may be partial.
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `GWF_CONFIG` environment variable
//! 2. `./gwf.yaml` (current directory)
//! 3. `~/.config/gwf/config.yaml` (user config)
//! 4. `/etc/gwf/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! calibration:
//!   base_lag_s: 0.4
//!   viscosity_coefficient: 0.0055
//!   strength_threshold: 10.0
//!
//! transform:
//!   band: [20.0, 500.0]
//!
//! targets:
//!   - id: GW190521
//!     gps: 1242442967.4
//!     category: Confirmed Merger
//!
//! space_weather:
//!   "2019-05-21": { status: QUIET, kp_index: 2 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;
use crate::qtransform::QTransformConfig;
use crate::space_weather::SpaceWeatherTable;
use crate::types::{ConfigError, Detector, Event, GpsSeconds};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GWF_CONFIG";

/// Upper bound on Q-transform output columns
pub const MAX_TIME_BINS: usize = 100_000;

/// Named calibration constants shared by both pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Fixed part of the counterpart delay in seconds
    pub base_lag_s: f64,
    /// Delay added per unit of gravitational strength
    pub viscosity_coefficient: f64,
    /// Strength above which gravitational and magnetic channels are significant
    pub strength_threshold: f64,
    /// Samples beyond this many standard deviations are treated as glitches
    pub outlier_sigma: f64,
    /// Asymmetry score above which a detector counts as a kick
    pub kick_threshold: f64,
    /// Standard deviation of the noise injected into degenerate segments
    pub reconstruction_noise_sigma: f64,
    /// Substitute for an exactly-zero minimum in the asymmetry ratio
    pub reconstruction_noise_epsilon: f64,
    /// Seed for the reconstruction noise stream
    pub noise_seed: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            base_lag_s: 0.4,
            viscosity_coefficient: 0.0055,
            strength_threshold: 10.0,
            outlier_sigma: 8.0,
            kick_threshold: 2.0,
            reconstruction_noise_sigma: 1e-20,
            reconstruction_noise_epsilon: 1e-15,
            noise_seed: 42,
        }
    }
}

/// Single-detector event analysis (pipeline A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Detector whose strain is analysed
    pub detector: Detector,
    /// Data fetched on each side of the event time, in seconds
    pub fetch_padding_s: f64,
    /// Output window relative to the event time, in seconds
    pub window_offsets: (f64, f64),
    /// Analysis band in Hz
    pub band: (f64, f64),
    /// Q tiling and whitening
    pub tiling: QTransformConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            detector: Detector::H1,
            fetch_padding_s: 4.0,
            window_offsets: (-0.5, 1.5),
            band: (20.0, 500.0),
            tiling: QTransformConfig::default(),
        }
    }
}

impl TransformConfig {
    /// Fetch span around `gps`.
    pub fn fetch_span(&self, gps: GpsSeconds) -> (GpsSeconds, GpsSeconds) {
        (gps - self.fetch_padding_s, gps + self.fetch_padding_s)
    }

    /// Output window around `gps`.
    pub fn window(&self, gps: GpsSeconds) -> (GpsSeconds, GpsSeconds) {
        (gps + self.window_offsets.0, gps + self.window_offsets.1)
    }
}

/// Multi-detector asymmetry analysis (pipeline B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetryConfig {
    /// Detectors scored per event, in report column order
    pub detectors: Vec<Detector>,
    /// Data fetched on each side of the event time, in seconds
    pub fetch_padding_s: f64,
    /// Band-pass applied before scoring, in Hz
    pub band: (f64, f64),
    /// Scoring window relative to the event time, in seconds
    pub window_offsets: (f64, f64),
    /// Category substring marking an expected-symmetric source (case-sensitive)
    pub symmetric_marker: String,
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            detectors: vec![Detector::H1, Detector::L1, Detector::V1],
            fetch_padding_s: 4.0,
            band: (35.0, 350.0),
            window_offsets: (-0.5, 0.5),
            symmetric_marker: "Vacuum".to_string(),
        }
    }
}

impl SymmetryConfig {
    pub fn fetch_span(&self, gps: GpsSeconds) -> (GpsSeconds, GpsSeconds) {
        (gps - self.fetch_padding_s, gps + self.fetch_padding_s)
    }

    pub fn window(&self, gps: GpsSeconds) -> (GpsSeconds, GpsSeconds) {
        (gps + self.window_offsets.0, gps + self.window_offsets.1)
    }
}

/// The reference target list.
pub fn reference_targets() -> Vec<Event> {
    vec![
        Event::new("S191110af", 1_257_416_400.0, "Uncatalogued Candidate"),
        Event::new("GW190521", 1_242_442_967.4, "Confirmed Merger"),
        Event::new("Solar_Calib_X93", 1_188_729_600.0, "Solar False Alarm"),
    ]
}

/// Complete audit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Configuration version
    pub version: String,
    /// Calibration constants
    pub calibration: CalibrationConfig,
    /// Event analysis settings
    pub transform: TransformConfig,
    /// Symmetry analysis settings
    pub symmetry: SymmetryConfig,
    /// Logging configuration
    pub logging: LogConfig,
    /// Events to audit, in report order
    pub targets: Vec<Event>,
    /// Historical geomagnetic conditions by UTC date
    pub space_weather: SpaceWeatherTable,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            calibration: CalibrationConfig::default(),
            transform: TransformConfig::default(),
            symmetry: SymmetryConfig::default(),
            logging: LogConfig::default(),
            targets: reference_targets(),
            space_weather: SpaceWeatherTable::reference(),
        }
    }
}

impl AuditConfig {
    /// Load configuration from the default search path.
    ///
    /// Search order:
    /// 1. `GWF_CONFIG` environment variable
    /// 2. `./gwf.yaml`
    /// 3. `~/.config/gwf/config.yaml`
    /// 4. `/etc/gwf/config.yaml`
    ///
    /// Returns the reference configuration if no file is found. A `GWF_CONFIG`
    /// that names a missing file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(ConfigError::NotFound(format!(
                    "{} points at {}",
                    CONFIG_ENV_VAR,
                    path.display()
                )));
            }
            return Self::load_from(&path);
        }

        for path in &Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        tracing::debug!("no config file found, using reference configuration");
        Ok(Self::default())
    }

    /// Load and validate configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        let config = Self::parse(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), targets = config.targets.len(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from a YAML string. Does not validate.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./gwf.yaml")];

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "gwf") {
            paths.push(config_dir.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/gwf/config.yaml"));

        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_targets()?;
        self.validate_calibration()?;

        let t = &self.transform;
        require(t.fetch_padding_s.is_finite() && t.fetch_padding_s > 0.0, || {
            "transform.fetch_padding_s must be positive".to_string()
        })?;
        require_interval("transform.window_offsets", t.window_offsets)?;
        require(
            t.window_offsets.0 >= -t.fetch_padding_s && t.window_offsets.1 <= t.fetch_padding_s,
            || "transform.window_offsets must lie inside the fetch padding".to_string(),
        )?;
        require_band("transform.band", t.band)?;
        require_interval("transform.tiling.q_range", t.tiling.q_range)?;
        require(t.tiling.q_range.0 > 0.0, || {
            "transform.tiling.q_range must be positive".to_string()
        })?;
        require(t.tiling.mismatch > 0.0 && t.tiling.mismatch < 1.0, || {
            "transform.tiling.mismatch must be in (0, 1)".to_string()
        })?;
        require(t.tiling.time_bins > 0 && t.tiling.time_bins <= MAX_TIME_BINS, || {
            format!("transform.tiling.time_bins must be in 1..={}", MAX_TIME_BINS)
        })?;
        require(
            t.tiling.whitening_segment_s.is_finite() && t.tiling.whitening_segment_s > 0.0,
            || "transform.tiling.whitening_segment_s must be finite and positive".to_string(),
        )?;

        let s = &self.symmetry;
        require(!s.detectors.is_empty(), || {
            "symmetry.detectors must not be empty".to_string()
        })?;
        let mut seen = HashSet::new();
        for detector in &s.detectors {
            require(seen.insert(*detector), || {
                format!("symmetry.detectors lists {} twice", detector)
            })?;
        }
        require(s.fetch_padding_s.is_finite() && s.fetch_padding_s > 0.0, || {
            "symmetry.fetch_padding_s must be positive".to_string()
        })?;
        require_interval("symmetry.window_offsets", s.window_offsets)?;
        require(
            s.window_offsets.0 >= -s.fetch_padding_s && s.window_offsets.1 <= s.fetch_padding_s,
            || "symmetry.window_offsets must lie inside the fetch padding".to_string(),
        )?;
        require_band("symmetry.band", s.band)?;

        self.space_weather.validate()
    }

    fn validate_targets(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for (i, event) in self.targets.iter().enumerate() {
            require(!event.id.trim().is_empty(), || format!("targets[{}]: empty id", i))?;
            require(event.gps.is_finite() && event.gps > 0.0, || {
                format!("targets[{}] '{}': gps must be a positive finite time", i, event.id)
            })?;
            require(ids.insert(event.id.as_str()), || {
                format!("targets[{}]: duplicate id '{}'", i, event.id)
            })?;
        }
        Ok(())
    }

    fn validate_calibration(&self) -> Result<(), ConfigError> {
        let c = &self.calibration;
        let positive = [
            ("base_lag_s", c.base_lag_s),
            ("viscosity_coefficient", c.viscosity_coefficient),
            ("strength_threshold", c.strength_threshold),
            ("outlier_sigma", c.outlier_sigma),
            ("kick_threshold", c.kick_threshold),
            ("reconstruction_noise_sigma", c.reconstruction_noise_sigma),
            ("reconstruction_noise_epsilon", c.reconstruction_noise_epsilon),
        ];
        for (name, value) in positive {
            require(value.is_finite() && value > 0.0, || {
                format!("calibration.{} must be finite and > 0, got {}", name, value)
            })?;
        }
        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example_yaml() -> String {
        serde_yaml::to_string(&Self::default()).unwrap_or_default()
    }
}

fn require(condition: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message()))
    }
}

fn require_interval(name: &str, (lo, hi): (f64, f64)) -> Result<(), ConfigError> {
    require(lo.is_finite() && hi.is_finite() && lo < hi, || {
        format!("{} must be an increasing pair, got [{}, {}]", name, lo, hi)
    })
}

fn require_band(name: &str, band: (f64, f64)) -> Result<(), ConfigError> {
    require_interval(name, band)?;
    require(band.0 > 0.0, || format!("{} must start above 0 Hz", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space_weather::ActivityStatus;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.calibration.base_lag_s, 0.4);
        assert_eq!(config.calibration.viscosity_coefficient, 0.0055);
        assert_eq!(config.calibration.strength_threshold, 10.0);
        assert_eq!(config.calibration.outlier_sigma, 8.0);
        assert_eq!(config.calibration.kick_threshold, 2.0);
        assert_eq!(config.calibration.reconstruction_noise_sigma, 1e-20);
        assert_eq!(config.calibration.reconstruction_noise_epsilon, 1e-15);
        assert_eq!(config.targets.len(), 3);
        assert_eq!(config.symmetry.detectors, vec![Detector::H1, Detector::L1, Detector::V1]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
calibration:
  base_lag_s: 0.5
  strength_threshold: 12.0

transform:
  detector: L1
  band: [30.0, 400.0]
  tiling:
    time_bins: 500

symmetry:
  detectors: [H1, L1]
  symmetric_marker: "Vacuum Decay"

targets:
  - id: GW150914
    gps: 1126259462.4
    category: Vacuum Merger
  - id: GW170817
    gps: 1187008882.4

space_weather:
  "2015-09-14": { status: ACTIVE, kp_index: 4 }
"#;

        let config = AuditConfig::parse(yaml).unwrap();
        assert_eq!(config.calibration.base_lag_s, 0.5);
        assert_eq!(config.calibration.strength_threshold, 12.0);
        assert_eq!(config.transform.detector, Detector::L1);
        assert_eq!(config.transform.band, (30.0, 400.0));
        assert_eq!(config.transform.tiling.time_bins, 500);
        assert_eq!(config.symmetry.detectors.len(), 2);
        assert_eq!(config.symmetry.symmetric_marker, "Vacuum Decay");
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[1].category, "");
        assert_eq!(
            config.space_weather.get("2015-09-14").status,
            ActivityStatus::Active
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
calibration:
  kick_threshold: 3.0
"#;

        let config = AuditConfig::parse(yaml).unwrap();
        assert_eq!(config.calibration.kick_threshold, 3.0);
        // Defaults should be applied
        assert_eq!(config.calibration.base_lag_s, 0.4);
        assert_eq!(config.transform.window_offsets, (-0.5, 1.5));
        assert_eq!(config.targets.len(), 3);
        assert_eq!(config.space_weather.len(), 3);
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = AuditConfig::parse("targets: [ { id: x, gps: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        // Event without its required time
        let err = AuditConfig::parse("targets:\n  - id: orphan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_rejects_bad_targets() {
        let mut config = AuditConfig::default();
        config.targets.push(Event::new("GW190521", 1.0e9, ""));
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AuditConfig::default();
        config.targets[0].id = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AuditConfig::default();
        config.targets[0].gps = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_calibration() {
        let mut config = AuditConfig::default();
        config.calibration.reconstruction_noise_sigma = 0.0;
        assert!(config.validate().is_err());

        let mut config = AuditConfig::default();
        config.calibration.strength_threshold = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_geometry() {
        let mut config = AuditConfig::default();
        config.transform.band = (500.0, 20.0);
        assert!(config.validate().is_err());

        let mut config = AuditConfig::default();
        config.transform.window_offsets = (-5.0, 1.5);
        assert!(config.validate().is_err());

        let mut config = AuditConfig::default();
        config.symmetry.detectors.clear();
        assert!(config.validate().is_err());

        let mut config = AuditConfig::default();
        config.symmetry.detectors = vec![Detector::H1, Detector::H1];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unbounded_tiling() {
        let yaml = "transform:\n  tiling:\n    whitening_segment_s: .inf\n";
        let config = AuditConfig::parse(yaml).unwrap();
        assert!(config.transform.tiling.whitening_segment_s.is_infinite());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AuditConfig::default();
        config.transform.tiling.whitening_segment_s = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = AuditConfig::default();
        config.transform.tiling.time_bins = MAX_TIME_BINS + 1;
        assert!(config.validate().is_err());
        config.transform.tiling.time_bins = MAX_TIME_BINS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_target_list_is_valid() {
        let config = AuditConfig {
            targets: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_windows_around_event() {
        let config = AuditConfig::default();
        assert_eq!(config.transform.fetch_span(100.0), (96.0, 104.0));
        assert_eq!(config.transform.window(100.0), (99.5, 101.5));
        assert_eq!(config.symmetry.window(100.0), (99.5, 100.5));
    }

    #[test]
    fn test_example_yaml() {
        let yaml = AuditConfig::example_yaml();
        assert!(yaml.contains("calibration:"));
        assert!(yaml.contains("targets:"));
        let parsed = AuditConfig::parse(&yaml).unwrap();
        assert_eq!(parsed, AuditConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("gwf-config-{}.yaml", std::process::id()));
        let mut config = AuditConfig::default();
        config.calibration.base_lag_s = 0.25;
        config.save(&path).unwrap();
        let loaded = AuditConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.calibration.base_lag_s, 0.25);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AuditConfig::load_from(Path::new("/nonexistent/gwf.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_config_search_paths() {
        let paths = AuditConfig::config_search_paths();
        assert!(!paths.is_empty());
        assert!(paths[0].ends_with("gwf.yaml"));
    }
}
