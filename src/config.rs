//! Pipeline configuration loaded from JSON
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```json
//! { "heading": { "declination_degrees": -2.5, "scheme": "sixteen" } }
//! ```

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{CalibrationSettings, HeadingSettings, IngestSettings};

/// Complete pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassConfig {
    pub heading: HeadingSettings,
    pub calibration: CalibrationSettings,
    pub ingest: IngestSettings,
}

impl CompassConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&contents)?;
        info!("[Config] Loaded configuration from {path:?}");
        Ok(config)
    }

    /// Load a config file, falling back to defaults on any error
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_else(|err| {
            warn!("[Config] {err}. Using defaults.");
            Self::default()
        })
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.heading.validate()?;
        if self.calibration.duration_seconds == 0 {
            return Err(invalid("calibration.duration_seconds", "must be at least 1".into()));
        }
        if self.calibration.tick_interval_ms == 0 {
            return Err(invalid("calibration.tick_interval_ms", "must be at least 1".into()));
        }
        if self.ingest.sample_interval_ms == 0 {
            return Err(invalid("ingest.sample_interval_ms", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
