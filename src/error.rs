//! Error types for the heading pipeline
//!
//! None of these are fatal to the pipeline: a rejected sample or a denied
//! permission degrades to "no update this tick".

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A raw magnetometer sample that cannot be turned into a heading
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleError {
    #[error("non-finite {axis} component in magnetometer sample ({value})")]
    NonFinite { axis: char, value: f32 },
}

/// Failures while subscribing to the sensor provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("sensor permission denied")]
    PermissionDenied,
}

/// Invalid calibration transitions and countdown failures
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration already in progress")]
    AlreadyInProgress,

    #[error("no calibration is awaiting confirmation")]
    NotAwaitingConfirmation,

    #[error("failed to spawn countdown timer: {0}")]
    TimerSpawn(#[from] io::Error),
}

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
