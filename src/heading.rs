//! Heading processor: raw magnetometer samples to a smoothed, labelled heading

use log::{debug, info};

use crate::compass::{apply_declination, raw_heading, validate_sample};
use crate::error::ConfigError;
use crate::filter::CircularFilter;
use crate::math::round_degrees;
use crate::needle::NeedleRotation;
use crate::sector::{DirectionSector, classify};
use crate::types::{HeadingReading, HeadingSettings, HeadingState, IngestOutcome, RawSample};

/// Smoothed compass heading with a user-controlled lock
///
/// Each sample goes through angle extraction, declination correction and a
/// circular low-pass filter. The filtered angle is the only state carried
/// between samples and always lies in `[0, 360)`. Rounding happens in
/// [`HeadingProcessor::reading`], never in the stored state.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use compass_heading::{DirectionSector, HeadingProcessor};
///
/// let mut processor = HeadingProcessor::new();
/// processor.ingest(Vector3::new(1.0, 0.0, 0.0));
///
/// // 0° magnetic + 5° declination, smoothed by 0.15 from 0°
/// assert!((processor.heading() - 0.75).abs() < 1e-4);
/// assert_eq!(processor.sector(), DirectionSector::N);
/// ```
#[derive(Debug, Clone)]
pub struct HeadingProcessor {
    /// Processor settings
    settings: HeadingSettings,
    /// Circular smoothing filter holding the heading estimate
    filter: CircularFilter,
    /// Unwrapped rotation for animation
    needle: NeedleRotation,
    /// Whether new samples are ignored
    locked: bool,
}

impl HeadingProcessor {
    /// Create a processor with default settings
    pub fn new() -> Self {
        Self::from_valid(HeadingSettings::default())
    }

    /// Create a processor with the given settings
    ///
    /// Fails when the smoothing coefficient is outside `(0, 1]` or the
    /// declination is not finite.
    pub fn with_settings(settings: HeadingSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self::from_valid(settings))
    }

    pub(crate) fn from_valid(settings: HeadingSettings) -> Self {
        Self {
            settings,
            filter: CircularFilter::new(settings.smoothing),
            needle: NeedleRotation::default(),
            locked: false,
        }
    }

    /// Get current settings
    pub fn settings(&self) -> HeadingSettings {
        self.settings
    }

    /// Feed one raw magnetometer sample
    ///
    /// Malformed samples are skipped and the previous estimate is kept.
    /// While locked, samples are ignored.
    pub fn ingest(&mut self, raw: RawSample) -> IngestOutcome {
        if let Err(err) = validate_sample(&raw) {
            debug!("Skipping magnetometer sample: {err}");
            return IngestOutcome::Rejected(err);
        }

        if self.locked {
            return IngestOutcome::Locked;
        }

        let magnetic = raw_heading(raw);
        let corrected = apply_declination(magnetic, self.settings.declination_degrees);
        let angle = self.filter.update(corrected);
        self.needle.advance(angle);

        IngestOutcome::Updated(angle)
    }

    /// Freeze or release the heading
    ///
    /// Locking keeps the current estimate; unlocking resumes smoothing from
    /// the frozen value on the next sample. Repeated calls with the same
    /// value have no further effect.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked == locked {
            return;
        }
        self.locked = locked;
        info!(
            "Heading {} at {:.1}°",
            if locked { "locked" } else { "unlocked" },
            self.filter.angle()
        );
    }

    /// Flip the lock and return the new state
    pub fn toggle_lock(&mut self) -> bool {
        self.set_locked(!self.locked);
        self.locked
    }

    /// Whether the heading is frozen
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Smoothed heading in degrees, in `[0, 360)`
    pub fn heading(&self) -> f32 {
        self.filter.angle()
    }

    /// Smoothed heading rounded for display, in `0..360`
    pub fn display_heading(&self) -> u16 {
        round_degrees(self.filter.angle())
    }

    /// Direction label of the current heading
    pub fn sector(&self) -> DirectionSector {
        classify(self.filter.angle(), self.settings.scheme)
    }

    /// Continuous needle rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.needle.rotation()
    }

    /// Snapshot of the persistent state
    pub fn state(&self) -> HeadingState {
        HeadingState {
            filtered_angle: self.filter.angle(),
            locked: self.locked,
        }
    }

    /// Everything the display layer needs in one value
    pub fn reading(&self) -> HeadingReading {
        HeadingReading {
            degrees: self.heading(),
            display_degrees: self.display_heading(),
            sector: self.sector(),
            rotation: self.rotation(),
            locked: self.locked,
        }
    }
}

impl Default for HeadingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SampleError;
    use crate::sector::SectorScheme;
    use nalgebra::Vector3;

    const EPSILON: f32 = 1e-4;

    fn without_declination() -> HeadingProcessor {
        HeadingProcessor::with_settings(HeadingSettings {
            declination_degrees: 0.0,
            ..Default::default()
        })
        .unwrap()
    }

    /// Unit vector whose raw heading is `degrees`
    fn sample_at(degrees: f32) -> RawSample {
        let rad = degrees.to_radians();
        Vector3::new(rad.cos(), rad.sin(), 0.0)
    }

    #[test]
    fn test_first_sample_scenario() {
        let mut processor = HeadingProcessor::new();
        let outcome = processor.ingest(Vector3::new(1.0, 0.0, 0.0));

        match outcome {
            IngestOutcome::Updated(angle) => assert!((angle - 0.75).abs() < EPSILON),
            other => panic!("expected update, got {other:?}"),
        }
        assert!((processor.heading() - 0.75).abs() < EPSILON);
        assert_eq!(processor.display_heading(), 1);
    }

    #[test]
    fn test_rejects_non_finite_samples() {
        let mut processor = HeadingProcessor::new();
        processor.ingest(Vector3::new(0.0, 1.0, 0.0));
        let before = processor.state();

        let outcome = processor.ingest(Vector3::new(f32::NAN, 1.0, 0.0));
        assert!(matches!(
            outcome,
            IngestOutcome::Rejected(SampleError::NonFinite { axis: 'x', .. })
        ));
        processor.ingest(Vector3::new(1.0, f32::NEG_INFINITY, 0.0));
        processor.ingest(Vector3::new(1.0, 0.0, f32::INFINITY));

        assert_eq!(processor.state(), before);
    }

    #[test]
    fn test_lock_freezes_and_unlock_resumes() {
        let mut processor = without_declination();
        for _ in 0..5 {
            processor.ingest(sample_at(90.0));
        }
        let frozen = processor.heading();

        processor.set_locked(true);
        assert_eq!(processor.ingest(sample_at(270.0)), IngestOutcome::Locked);
        assert_eq!(processor.heading(), frozen);

        processor.set_locked(false);
        processor.ingest(sample_at(90.0));
        let expected = frozen + 0.15 * (90.0 - frozen);
        assert!((processor.heading() - expected).abs() < EPSILON);
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut processor = without_declination();
        processor.ingest(sample_at(45.0));
        let before = processor.state();

        processor.set_locked(true);
        processor.set_locked(true);

        let after = processor.state();
        assert!(after.locked);
        assert_eq!(after.filtered_angle, before.filtered_angle);
    }

    #[test]
    fn test_toggle_lock() {
        let mut processor = HeadingProcessor::new();
        assert!(processor.toggle_lock());
        assert!(processor.is_locked());
        assert!(!processor.toggle_lock());
        assert!(!processor.is_locked());
    }

    #[test]
    fn test_rotation_tracks_heading_across_seam() {
        let mut processor = HeadingProcessor::with_settings(HeadingSettings {
            declination_degrees: 0.0,
            smoothing: 1.0,
            scheme: SectorScheme::Eight,
        })
        .unwrap();
        processor.ingest(sample_at(10.0));
        processor.ingest(sample_at(350.0));
        processor.ingest(sample_at(330.0));

        assert!((processor.heading() - 330.0).abs() < 1e-3);
        assert!((processor.rotation() + 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_reading_uses_configured_scheme() {
        let mut processor = HeadingProcessor::with_settings(HeadingSettings {
            declination_degrees: 0.0,
            smoothing: 1.0,
            scheme: SectorScheme::Sixteen,
        })
        .unwrap();
        processor.ingest(sample_at(30.0));

        let reading = processor.reading();
        assert_eq!(reading.sector, DirectionSector::NNE);
        assert_eq!(reading.display_degrees, 30);
        assert!(!reading.locked);
        assert_eq!(reading.to_string(), "30° NNE");
    }

    #[test]
    fn test_rejects_unusable_settings() {
        let nan_declination = HeadingProcessor::with_settings(HeadingSettings {
            declination_degrees: f32::NAN,
            ..Default::default()
        });
        assert!(matches!(
            nan_declination,
            Err(ConfigError::Invalid { field: "heading.declination_degrees", .. })
        ));

        for smoothing in [0.0, -0.1, 1.5, f32::NAN] {
            let result = HeadingProcessor::with_settings(HeadingSettings {
                smoothing,
                ..Default::default()
            });
            assert!(
                matches!(result, Err(ConfigError::Invalid { field: "heading.smoothing", .. })),
                "smoothing {smoothing} accepted"
            );
        }
    }

    #[test]
    fn test_accepts_full_smoothing() {
        let mut processor = HeadingProcessor::with_settings(HeadingSettings {
            declination_degrees: -3.5,
            smoothing: 1.0,
            scheme: SectorScheme::Eight,
        })
        .unwrap();
        processor.ingest(sample_at(90.0));
        assert!((processor.heading() - 86.5).abs() < 1e-3);
    }
}
