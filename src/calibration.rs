//! Timed calibration workflow
//!
//! A guided figure-eight ritual: the user asks for calibration, reads the
//! instructions, confirms, and a countdown runs to completion. The
//! workflow only drives guidance text and a completion notification; it
//! never feeds back into declination or smoothing.
//!
//! ```text
//! Idle --request--> AwaitingConfirmation --confirm--> Running --(0s)--> Idle
//!                          |                             |
//!                          +-----------cancel------------+-------> Idle
//! ```

use core::fmt;

use log::{debug, info};

use crate::error::CalibrationError;
use crate::types::CalibrationSettings;

const GUIDANCE_AWAITING: &str = "Hold your device away from metal objects and move it slowly in a \
     figure-eight pattern. Press start when you are ready.";
const GUIDANCE_RUNNING: &str = "Keep moving your device in a figure-eight pattern.";

/// Current phase of the calibration workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationPhase {
    /// No calibration in progress
    #[default]
    Idle,
    /// Instructions shown, waiting for the user to start or cancel
    AwaitingConfirmation,
    /// Countdown in progress
    Running { remaining_seconds: u32 },
}

impl fmt::Display for CalibrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationPhase::Idle => f.write_str("idle"),
            CalibrationPhase::AwaitingConfirmation => f.write_str("awaiting confirmation"),
            CalibrationPhase::Running { remaining_seconds } => {
                write!(f, "running ({remaining_seconds}s left)")
            }
        }
    }
}

/// Notification emitted by a workflow transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationEvent {
    /// Instructions should be shown
    GuidanceRequested,
    /// Countdown started at the given duration
    Started { duration_seconds: u32 },
    /// One second elapsed
    Tick { remaining_seconds: u32 },
    /// Countdown reached zero
    Completed,
    /// The user backed out, or the owner was torn down
    Cancelled,
}

/// Transient view of a calibration session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationSession {
    pub active: bool,
    pub remaining_seconds: u32,
}

/// Calibration state machine, advanced one second per [`tick`](Self::tick)
///
/// # Example
/// ```
/// use compass_heading::{CalibrationEvent, CalibrationWorkflow};
///
/// let mut workflow = CalibrationWorkflow::new(3);
/// workflow.request_calibration().unwrap();
/// workflow.confirm_calibration().unwrap();
///
/// assert_eq!(workflow.tick(), Some(CalibrationEvent::Tick { remaining_seconds: 2 }));
/// assert_eq!(workflow.tick(), Some(CalibrationEvent::Tick { remaining_seconds: 1 }));
/// assert_eq!(workflow.tick(), Some(CalibrationEvent::Completed));
/// assert!(workflow.is_idle());
/// ```
#[derive(Debug, Clone)]
pub struct CalibrationWorkflow {
    /// Countdown length in seconds
    duration_seconds: u32,
    phase: CalibrationPhase,
    /// Number of sessions that ran to completion
    completed_sessions: u32,
}

impl CalibrationWorkflow {
    /// Create an idle workflow with a countdown of `duration_seconds`
    ///
    /// A zero duration is raised to one second so every confirmed session
    /// needs at least one tick to complete.
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            duration_seconds: duration_seconds.max(1),
            phase: CalibrationPhase::Idle,
            completed_sessions: 0,
        }
    }

    /// Create an idle workflow from settings
    pub fn with_settings(settings: CalibrationSettings) -> Self {
        Self::new(settings.duration_seconds)
    }

    /// Ask to calibrate; shows the instructions
    pub fn request_calibration(&mut self) -> Result<CalibrationEvent, CalibrationError> {
        if self.phase != CalibrationPhase::Idle {
            return Err(CalibrationError::AlreadyInProgress);
        }
        self.transition(CalibrationPhase::AwaitingConfirmation);
        Ok(CalibrationEvent::GuidanceRequested)
    }

    /// Start the countdown after the instructions were shown
    pub fn confirm_calibration(&mut self) -> Result<CalibrationEvent, CalibrationError> {
        if self.phase != CalibrationPhase::AwaitingConfirmation {
            return Err(CalibrationError::NotAwaitingConfirmation);
        }
        self.transition(CalibrationPhase::Running {
            remaining_seconds: self.duration_seconds,
        });
        Ok(CalibrationEvent::Started {
            duration_seconds: self.duration_seconds,
        })
    }

    /// Abandon the current session
    ///
    /// Returns `None` when there was nothing to cancel.
    pub fn cancel_calibration(&mut self) -> Option<CalibrationEvent> {
        if self.phase == CalibrationPhase::Idle {
            return None;
        }
        self.transition(CalibrationPhase::Idle);
        Some(CalibrationEvent::Cancelled)
    }

    /// Advance the countdown by one second
    ///
    /// Returns `None` when no countdown is running.
    pub fn tick(&mut self) -> Option<CalibrationEvent> {
        let CalibrationPhase::Running { remaining_seconds } = self.phase else {
            return None;
        };

        let remaining_seconds = remaining_seconds.saturating_sub(1);
        if remaining_seconds == 0 {
            self.transition(CalibrationPhase::Idle);
            self.completed_sessions += 1;
            info!("Calibration completed");
            return Some(CalibrationEvent::Completed);
        }

        self.phase = CalibrationPhase::Running { remaining_seconds };
        Some(CalibrationEvent::Tick { remaining_seconds })
    }

    /// Current phase
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Whether no calibration is in progress
    pub fn is_idle(&self) -> bool {
        self.phase == CalibrationPhase::Idle
    }

    /// Whether the countdown is running
    pub fn is_running(&self) -> bool {
        matches!(self.phase, CalibrationPhase::Running { .. })
    }

    /// The running session, if any
    pub fn session(&self) -> Option<CalibrationSession> {
        match self.phase {
            CalibrationPhase::Running { remaining_seconds } => Some(CalibrationSession {
                active: true,
                remaining_seconds,
            }),
            _ => None,
        }
    }

    /// Instructions to show for the current phase
    pub fn guidance(&self) -> Option<&'static str> {
        match self.phase {
            CalibrationPhase::Idle => None,
            CalibrationPhase::AwaitingConfirmation => Some(GUIDANCE_AWAITING),
            CalibrationPhase::Running { .. } => Some(GUIDANCE_RUNNING),
        }
    }

    /// Countdown length in seconds
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Number of sessions that ran to completion
    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    fn transition(&mut self, next: CalibrationPhase) {
        debug!("Calibration: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

impl Default for CalibrationWorkflow {
    fn default() -> Self {
        Self::with_settings(CalibrationSettings::default())
    }
}
