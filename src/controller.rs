//! Compass controller: owns the pipeline for one orientation screen
//!
//! The controller ties a [`SampleIngestor`], a [`HeadingProcessor`] and a
//! [`CalibrationWorkflow`] together behind explicit `start`/`stop` calls.
//! Heading math runs on the caller's thread inside [`CompassController::poll`];
//! the calibration countdown runs on its own timer thread and only touches
//! the workflow.

use std::ops::ControlFlow;
use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::calibration::{CalibrationEvent, CalibrationPhase, CalibrationSession, CalibrationWorkflow};
use crate::config::CompassConfig;
use crate::error::{CalibrationError, ConfigError};
use crate::heading::HeadingProcessor;
use crate::ingest::{PermissionGate, SampleIngestor, SampleProvider};
use crate::sector::DirectionSector;
use crate::timer::{TimerHandle, spawn_periodic};
use crate::types::{HeadingReading, IngestOutcome};

const COUNTDOWN_THREAD: &str = "calibration-countdown";

/// Owner of the heading pipeline and calibration countdown
///
/// # Example
/// ```
/// use std::time::Duration;
/// use nalgebra::Vector3;
/// use compass_heading::{
///     CompassController, PermissionGate, PermissionStatus, SampleProvider, SampleSink,
/// };
///
/// struct Sensor(Option<SampleSink>);
///
/// impl SampleProvider for Sensor {
///     fn start(&mut self, _interval: Duration, sink: SampleSink) {
///         sink.push(Vector3::new(1.0, 0.0, 0.0));
///         self.0 = Some(sink);
///     }
///     fn stop(&mut self) {
///         self.0 = None;
///     }
/// }
///
/// struct Granted;
///
/// impl PermissionGate for Granted {
///     fn status(&self) -> PermissionStatus {
///         PermissionStatus::Granted
///     }
/// }
///
/// let mut compass = CompassController::new(Sensor(None), Granted);
/// assert!(compass.start());
///
/// let reading = compass.poll().unwrap();
/// assert!((reading.degrees - 0.75).abs() < 1e-4);
///
/// compass.stop();
/// ```
pub struct CompassController<P: SampleProvider, G: PermissionGate> {
    processor: HeadingProcessor,
    ingestor: SampleIngestor<P>,
    gate: G,
    calibration: Arc<Mutex<CalibrationWorkflow>>,
    tick_interval: Duration,
    countdown: Option<TimerHandle>,
    /// Current calibration listener, shared with the countdown thread
    listener: Arc<Mutex<Option<Sender<CalibrationEvent>>>>,
}

impl<P: SampleProvider, G: PermissionGate> CompassController<P, G> {
    /// Create a controller with default configuration
    pub fn new(provider: P, gate: G) -> Self {
        Self::from_valid(provider, gate, CompassConfig::default())
    }

    /// Create a controller with the given configuration
    ///
    /// Fails with [`ConfigError::Invalid`] when a setting is unusable.
    pub fn with_config(provider: P, gate: G, config: CompassConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(provider, gate, config))
    }

    fn from_valid(provider: P, gate: G, config: CompassConfig) -> Self {
        Self {
            processor: HeadingProcessor::from_valid(config.heading),
            ingestor: SampleIngestor::with_settings(provider, config.ingest),
            gate,
            calibration: Arc::new(Mutex::new(CalibrationWorkflow::with_settings(
                config.calibration,
            ))),
            tick_interval: Duration::from_millis(config.calibration.tick_interval_ms),
            countdown: None,
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Subscribe to the sensor
    ///
    /// Returns `false` when permission is denied. The controller keeps
    /// working without data in that case; readings simply never change.
    pub fn start(&mut self) -> bool {
        match self.ingestor.subscribe(&mut self.gate) {
            Ok(()) => true,
            Err(err) => {
                warn!("Compass running without sensor data: {err}");
                false
            }
        }
    }

    /// Tear down: cancel any calibration and unsubscribe from the sensor
    ///
    /// Safe to call repeatedly. No calibration event fires after this
    /// returns.
    pub fn stop(&mut self) {
        self.cancel_calibration();
        self.ingestor.unsubscribe();
    }

    /// Feed the newest pending sample, if any, to the heading processor
    ///
    /// Returns the new reading when the heading moved.
    pub fn poll(&mut self) -> Option<HeadingReading> {
        let sample = self.ingestor.latest()?;
        match self.processor.ingest(sample) {
            IngestOutcome::Updated(_) => Some(self.processor.reading()),
            IngestOutcome::Locked | IngestOutcome::Rejected(_) => None,
        }
    }

    /// Whether the sensor subscription is live
    pub fn is_streaming(&self) -> bool {
        self.ingestor.is_subscribed()
    }

    pub fn reading(&self) -> HeadingReading {
        self.processor.reading()
    }

    pub fn heading(&self) -> f32 {
        self.processor.heading()
    }

    pub fn display_heading(&self) -> u16 {
        self.processor.display_heading()
    }

    pub fn sector(&self) -> DirectionSector {
        self.processor.sector()
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.processor.set_locked(locked);
    }

    pub fn toggle_lock(&mut self) -> bool {
        self.processor.toggle_lock()
    }

    pub fn is_locked(&self) -> bool {
        self.processor.is_locked()
    }

    /// Read-only access to the heading processor
    pub fn processor(&self) -> &HeadingProcessor {
        &self.processor
    }

    /// Receive calibration events
    ///
    /// Only the most recent receiver gets events, including the ticks of a
    /// countdown that is already running. Dropping the current receiver
    /// without replacing it cancels a running countdown.
    pub fn subscribe_calibration(&mut self) -> Receiver<CalibrationEvent> {
        let (tx, rx) = mpsc::channel();
        *lock(&self.listener) = Some(tx);
        rx
    }

    /// Show the calibration instructions
    pub fn request_calibration(&mut self) -> Result<(), CalibrationError> {
        let event = lock(&self.calibration).request_calibration()?;
        self.emit(event);
        Ok(())
    }

    /// Start the countdown
    ///
    /// `Started` reaches the listener before the first countdown tick.
    pub fn confirm_calibration(&mut self) -> Result<(), CalibrationError> {
        let started = lock(&self.calibration).confirm_calibration()?;
        self.emit(started);

        let workflow = Arc::clone(&self.calibration);
        let listener = Arc::clone(&self.listener);
        let countdown = spawn_periodic(COUNTDOWN_THREAD, self.tick_interval, move || {
            countdown_tick(&workflow, &listener)
        });

        match countdown {
            Ok(handle) => {
                self.countdown = Some(handle);
                info!("Calibration started");
                Ok(())
            }
            Err(err) => {
                let cancelled = lock(&self.calibration).cancel_calibration();
                if let Some(event) = cancelled {
                    self.emit(event);
                }
                Err(CalibrationError::TimerSpawn(err))
            }
        }
    }

    /// Abandon the current calibration session, if any
    pub fn cancel_calibration(&mut self) {
        // Join the countdown first so it cannot complete behind our back
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
        let cancelled = lock(&self.calibration).cancel_calibration();
        if let Some(event) = cancelled {
            info!("Calibration cancelled");
            self.emit(event);
        }
    }

    pub fn calibration_phase(&self) -> CalibrationPhase {
        lock(&self.calibration).phase()
    }

    pub fn calibration_session(&self) -> Option<CalibrationSession> {
        lock(&self.calibration).session()
    }

    pub fn calibration_guidance(&self) -> Option<&'static str> {
        lock(&self.calibration).guidance()
    }

    fn emit(&self, event: CalibrationEvent) {
        if let Err(err) = send(&self.listener, event) {
            debug!("Calibration listener gone, dropping {:?}", err.0);
        }
    }
}

impl<P: SampleProvider, G: PermissionGate> Drop for CompassController<P, G> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deliver `event` to the current listener, if there is one
///
/// A listener whose receiver is gone is forgotten and the event is handed
/// back.
fn send(
    listener: &Mutex<Option<Sender<CalibrationEvent>>>,
    event: CalibrationEvent,
) -> Result<(), SendError<CalibrationEvent>> {
    let mut listener = lock(listener);
    let Some(sender) = listener.as_ref() else {
        return Ok(());
    };
    let result = sender.send(event);
    if result.is_err() {
        *listener = None;
    }
    result
}

/// One countdown step on the timer thread
///
/// Events go to whichever listener is current at tick time. With no
/// listener registered the countdown runs silently; a listener that went
/// away without a replacement cancels it.
fn countdown_tick(
    workflow: &Mutex<CalibrationWorkflow>,
    listener: &Mutex<Option<Sender<CalibrationEvent>>>,
) -> ControlFlow<()> {
    let mut workflow = lock(workflow);
    let Some(event) = workflow.tick() else {
        return ControlFlow::Break(());
    };

    if send(listener, event).is_err() {
        warn!("Calibration listener gone, cancelling countdown");
        workflow.cancel_calibration();
        return ControlFlow::Break(());
    }

    if event == CalibrationEvent::Completed {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}
