//! Cardinal and intercardinal sector classification
//!
//! Every sector is a half-open range `[lower, upper)` centred on its
//! compass point. North straddles the seam, so its range wraps through 0°.
//! With these bounds every finite angle maps to exactly one sector.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{FULL_TURN, normalize_degrees};

/// Named compass point
///
/// The eight-sector scheme only yields the cardinal and intercardinal
/// points; the sixteen-sector scheme adds the secondary intercardinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
pub enum DirectionSector {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

/// Granularity of the direction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorScheme {
    /// N, NE, E, SE, S, SW, W, NW: 45° sectors
    #[default]
    Eight,
    /// Sixteen points of 22.5° each
    Sixteen,
}

/// The eight-sector lookup table, in clockwise order from North
pub const EIGHT_SECTORS: [DirectionSector; 8] = [
    DirectionSector::N,
    DirectionSector::NE,
    DirectionSector::E,
    DirectionSector::SE,
    DirectionSector::S,
    DirectionSector::SW,
    DirectionSector::W,
    DirectionSector::NW,
];

/// The sixteen-point lookup table, in clockwise order from North
pub const SIXTEEN_SECTORS: [DirectionSector; 16] = [
    DirectionSector::N,
    DirectionSector::NNE,
    DirectionSector::NE,
    DirectionSector::ENE,
    DirectionSector::E,
    DirectionSector::ESE,
    DirectionSector::SE,
    DirectionSector::SSE,
    DirectionSector::S,
    DirectionSector::SSW,
    DirectionSector::SW,
    DirectionSector::WSW,
    DirectionSector::W,
    DirectionSector::WNW,
    DirectionSector::NW,
    DirectionSector::NNW,
];

impl SectorScheme {
    /// Sectors of this scheme in clockwise order from North
    pub fn sectors(self) -> &'static [DirectionSector] {
        match self {
            SectorScheme::Eight => &EIGHT_SECTORS,
            SectorScheme::Sixteen => &SIXTEEN_SECTORS,
        }
    }

    /// Angular width of one sector in degrees
    pub fn width(self) -> f32 {
        FULL_TURN / self.sectors().len() as f32
    }
}

impl DirectionSector {
    /// Short label, e.g. `"NE"`
    pub fn label(self) -> &'static str {
        match self {
            DirectionSector::N => "N",
            DirectionSector::NNE => "NNE",
            DirectionSector::NE => "NE",
            DirectionSector::ENE => "ENE",
            DirectionSector::E => "E",
            DirectionSector::ESE => "ESE",
            DirectionSector::SE => "SE",
            DirectionSector::SSE => "SSE",
            DirectionSector::S => "S",
            DirectionSector::SSW => "SSW",
            DirectionSector::SW => "SW",
            DirectionSector::WSW => "WSW",
            DirectionSector::W => "W",
            DirectionSector::WNW => "WNW",
            DirectionSector::NW => "NW",
            DirectionSector::NNW => "NNW",
        }
    }

    /// Centre of the sector in degrees
    pub fn center_degrees(self) -> f32 {
        let index = SIXTEEN_SECTORS
            .iter()
            .position(|&sector| sector == self)
            .unwrap_or(0);
        index as f32 * SectorScheme::Sixteen.width()
    }

    /// Half-open `[lower, upper)` bounds of this sector under `scheme`
    ///
    /// North's lower bound is greater than its upper bound because the
    /// range wraps through 0°. Returns `None` for a point the scheme does
    /// not use, such as NNE under [`SectorScheme::Eight`].
    pub fn bounds(self, scheme: SectorScheme) -> Option<(f32, f32)> {
        if !scheme.sectors().contains(&self) {
            return None;
        }
        let half = scheme.width() / 2.0;
        let center = self.center_degrees();
        Some((
            normalize_degrees(center - half),
            normalize_degrees(center + half),
        ))
    }

    /// Whether `angle` falls inside this sector under `scheme`
    ///
    /// Always `false` for a point the scheme does not use.
    pub fn contains(self, angle: f32, scheme: SectorScheme) -> bool {
        let Some((lower, upper)) = self.bounds(scheme) else {
            return false;
        };
        let angle = normalize_degrees(angle);
        if lower <= upper {
            lower <= angle && angle < upper
        } else {
            angle >= lower || angle < upper
        }
    }
}

impl fmt::Display for DirectionSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a heading into one of the eight 45° sectors.
///
/// # Example
/// ```
/// use compass_heading::{DirectionSector, classify_sector};
///
/// assert_eq!(classify_sector(22.4), DirectionSector::N);
/// assert_eq!(classify_sector(22.5), DirectionSector::NE);
/// assert_eq!(classify_sector(337.5), DirectionSector::N);
/// ```
pub fn classify_sector(angle: f32) -> DirectionSector {
    classify(angle, SectorScheme::Eight)
}

/// Classify a heading under the given scheme.
///
/// Angles outside `[0, 360)` are wrapped first. Non-finite angles map to
/// North.
pub fn classify(angle: f32, scheme: SectorScheme) -> DirectionSector {
    let sectors = scheme.sectors();
    let width = scheme.width();
    let shifted = normalize_degrees(angle) + width / 2.0;
    // NaN saturates to index 0
    let index = (shifted / width).floor() as usize % sectors.len();
    sectors[index]
}
