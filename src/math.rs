//! Angle arithmetic shared by the heading pipeline

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Degrees in a full turn
pub const FULL_TURN: f32 = 360.0;

/// Wrap an angle in degrees into `[0, 360)`.
///
/// `rem_euclid` can round tiny negative inputs up to exactly 360.0, which
/// is folded back onto 0.0 so the upper bound stays exclusive.
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(FULL_TURN);
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}

/// Signed shortest angular difference from `from` to `to`, in `(-180, 180]`.
///
/// Adding the result to `from` always travels the shorter arc, so blending
/// across the 0°/360° seam never swings the long way round.
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let delta = normalize_degrees(to - from);
    if delta > 180.0 { delta - FULL_TURN } else { delta }
}

/// Round a heading to a whole display degree in `0..360`.
pub fn round_degrees(angle: f32) -> u16 {
    let rounded = normalize_degrees(angle).round() as u16;
    if rounded >= 360 { 0 } else { rounded }
}
