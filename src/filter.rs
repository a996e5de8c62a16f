//! Circular low-pass filter for angular quantities

use crate::math::{normalize_degrees, shortest_arc};

/// Exponential smoothing filter that blends along the shorter arc
///
/// A plain `angle * (1 - α) + target * α` blend treats heading as a linear
/// scalar, so going from 359° to 1° would sweep back through 180°. This
/// filter blends the signed shortest difference instead and re-wraps the
/// result into `[0, 360)`.
///
/// # Example
/// ```
/// use compass_heading::CircularFilter;
///
/// let mut filter = CircularFilter::with_initial(0.5, 350.0);
/// let angle = filter.update(10.0);
/// assert!((angle - 0.0).abs() < 1e-4); // halfway along the 20° arc
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularFilter {
    /// Smoothing coefficient in `(0, 1]`
    alpha: f32,
    /// Current estimate in `[0, 360)`
    angle: f32,
}

impl CircularFilter {
    /// Create a filter starting at 0°
    pub fn new(alpha: f32) -> Self {
        Self::with_initial(alpha, 0.0)
    }

    /// Create a filter starting at `angle`
    pub fn with_initial(alpha: f32, angle: f32) -> Self {
        Self {
            alpha,
            angle: normalize_degrees(angle),
        }
    }

    /// Move the estimate towards `target` and return the new estimate
    pub fn update(&mut self, target: f32) -> f32 {
        let delta = shortest_arc(self.angle, target);
        self.angle = normalize_degrees(self.angle + self.alpha * delta);
        self.angle
    }

    /// Current estimate in degrees
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Smoothing coefficient
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}
