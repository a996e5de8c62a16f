//! Core types and settings for the heading pipeline

use core::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SampleError};
use crate::sector::{DirectionSector, SectorScheme};

/// Raw magnetometer reading along the device's local axes
pub type RawSample = Vector3<f32>;

/// Heading processor settings
///
/// # Example
/// ```
/// use compass_heading::{HeadingProcessor, HeadingSettings, SectorScheme};
///
/// let settings = HeadingSettings {
///     declination_degrees: -3.5,
///     smoothing: 0.25,
///     scheme: SectorScheme::Sixteen,
/// };
/// let processor = HeadingProcessor::with_settings(settings).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingSettings {
    /// Magnetic declination in degrees, added to the magnetic heading
    ///
    /// Positive east of true north. Defaults to +5°.
    pub declination_degrees: f32,
    /// Smoothing coefficient `α` in `(0, 1]`
    ///
    /// Smaller values give a steadier needle that reacts more slowly.
    /// 0.15 suits hand-held orientation sensing.
    pub smoothing: f32,
    /// Sector scheme used for the direction label
    pub scheme: SectorScheme,
}

impl Default for HeadingSettings {
    fn default() -> Self {
        Self {
            declination_degrees: 5.0,
            smoothing: 0.15,
            scheme: SectorScheme::Eight,
        }
    }
}

impl HeadingSettings {
    /// Check that the filter can keep the heading finite and moving
    pub fn validate(&self) -> Result<(), ConfigError> {
        let smoothing = self.smoothing;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "heading.smoothing",
                reason: format!("{smoothing} is outside (0, 1]"),
            });
        }
        if !self.declination_degrees.is_finite() {
            return Err(ConfigError::Invalid {
                field: "heading.declination_degrees",
                reason: "must be finite".into(),
            });
        }
        Ok(())
    }
}

/// Calibration countdown settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Countdown length in seconds
    pub duration_seconds: u32,
    /// Wall-clock period of one countdown tick in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            duration_seconds: 15,
            tick_interval_ms: 1000,
        }
    }
}

/// Sensor subscription settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Interval requested from the sensor provider, in milliseconds
    pub sample_interval_ms: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 50,
        }
    }
}

/// Persistent state of the heading processor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingState {
    /// Smoothed heading in `[0, 360)`
    pub filtered_angle: f32,
    /// Whether new samples are ignored
    pub locked: bool,
}

/// What happened to a sample handed to the processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IngestOutcome {
    /// The estimate moved to the contained angle
    Updated(f32),
    /// The processor is locked and the sample was ignored
    Locked,
    /// The sample was malformed and skipped
    Rejected(SampleError),
}

/// Snapshot handed to the display and animation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingReading {
    /// Smoothed heading for animation interpolation, in `[0, 360)`
    pub degrees: f32,
    /// Heading rounded for display, in `0..360`
    pub display_degrees: u16,
    /// Direction label for the heading
    pub sector: DirectionSector,
    /// Continuous needle rotation in degrees, not wrapped at the seam
    pub rotation: f32,
    /// Whether the heading is frozen
    pub locked: bool,
}

impl fmt::Display for HeadingReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}° {}", self.display_degrees, self.sector)?;
        if self.locked {
            f.write_str(" (locked)")?;
        }
        Ok(())
    }
}
