//! Magnetometer heading extraction and declination correction

use crate::error::SampleError;
use crate::math::{RAD_TO_DEG, normalize_degrees};
use crate::types::RawSample;

/// Check that every component of a raw sample is finite
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use compass_heading::compass::validate_sample;
///
/// assert!(validate_sample(&Vector3::new(1.0, 0.0, 0.0)).is_ok());
/// assert!(validate_sample(&Vector3::new(f32::NAN, 0.0, 0.0)).is_err());
/// ```
pub fn validate_sample(sample: &RawSample) -> Result<(), SampleError> {
    for (axis, &value) in ['x', 'y', 'z'].into_iter().zip(sample.iter()) {
        if !value.is_finite() {
            return Err(SampleError::NonFinite { axis, value });
        }
    }
    Ok(())
}

/// Calculate the magnetic heading of a raw magnetometer sample
///
/// The device is assumed to be held flat, so only the horizontal `x` and
/// `y` components contribute.
///
/// # Arguments
/// * `magnetometer` - Raw magnetometer reading
///
/// # Returns
/// Heading angle in degrees (range: 0° to 360°, exclusive)
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use compass_heading::compass::raw_heading;
///
/// let heading = raw_heading(Vector3::new(0.0, 1.0, 0.0));
/// assert!((heading - 90.0).abs() < 1e-4);
/// ```
pub fn raw_heading(magnetometer: RawSample) -> f32 {
    let heading_rad = magnetometer.y.atan2(magnetometer.x);
    normalize_degrees(heading_rad * RAD_TO_DEG)
}

/// Add a magnetic declination to a heading and wrap the result into `[0, 360)`
pub fn apply_declination(heading: f32, declination_degrees: f32) -> f32 {
    normalize_degrees(heading + declination_degrees)
}
