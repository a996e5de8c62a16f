//! Compass heading - magnetometer heading pipeline for hand-held devices
//!
//! Turns a stream of raw three-axis magnetometer samples into a steady,
//! human-readable compass heading:
//!
//! raw vector → angle extraction → declination correction →
//! circular smoothing → sector classification → display / animation
//!
//! # Features
//!
//! - Wraparound-aware smoothing that always blends along the shorter arc
//! - Eight- or sixteen-point direction labels with half-open sectors
//! - Continuous needle rotation that never spins the long way at 0°/360°
//! - Heading lock that freezes the output
//! - Timed calibration workflow with guidance text and a completion event
//! - Latest-value-wins sample ingestion with idempotent unsubscribe
//!
//! Logging goes through the [`log`] facade; install any logger to see it.
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use compass_heading::{DirectionSector, HeadingProcessor};
//!
//! let mut processor = HeadingProcessor::new();
//!
//! for _ in 0..100 {
//!     // replace with real magnetometer readings
//!     processor.ingest(Vector3::new(0.0, 1.0, 0.0));
//! }
//!
//! let reading = processor.reading();
//! assert_eq!(reading.display_degrees, 95); // 90° magnetic + 5° declination
//! assert_eq!(reading.sector, DirectionSector::E);
//! ```

pub mod calibration;
pub mod compass;
pub mod config;
mod controller;
pub mod error;
mod filter;
mod heading;
pub mod ingest;
mod math;
mod needle;
pub mod sector;
pub mod timer;
mod types;

// Re-export all public types and functions
pub use calibration::{CalibrationEvent, CalibrationPhase, CalibrationSession, CalibrationWorkflow};
pub use compass::{apply_declination, raw_heading};
pub use config::CompassConfig;
pub use controller::CompassController;
pub use error::{CalibrationError, ConfigError, IngestError, SampleError};
pub use filter::CircularFilter;
pub use heading::HeadingProcessor;
pub use ingest::{PermissionGate, PermissionStatus, SampleIngestor, SampleProvider, SampleSink};
pub use math::{DEG_TO_RAD, RAD_TO_DEG, normalize_degrees, round_degrees, shortest_arc};
pub use needle::NeedleRotation;
pub use sector::{DirectionSector, SectorScheme, classify, classify_sector};
pub use types::*;
