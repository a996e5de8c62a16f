//! Continuous needle rotation for the compass dial
//!
//! The heading wraps at 360°, but an animated needle must not: tweening
//! from 359° to 1° would spin it backwards almost a full turn. The needle
//! accumulates each heading change along the shorter arc, so its rotation
//! grows or shrinks without bound and every step is small.

use crate::math::shortest_arc;

/// Unwrapped rotation that follows a wrapped heading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeedleRotation {
    rotation: f32,
}

impl NeedleRotation {
    /// Start the needle at a heading
    pub fn new(heading: f32) -> Self {
        Self { rotation: heading }
    }

    /// Follow the heading to `heading` and return the new rotation
    pub fn advance(&mut self, heading: f32) -> f32 {
        self.rotation += shortest_arc(self.rotation, heading);
        self.rotation
    }

    /// Current rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }
}
