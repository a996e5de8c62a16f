//! Sample ingestion from an external magnetometer provider
//!
//! The provider pushes samples from its own thread into a single
//! latest-value-wins slot; the owner drains it on its own cadence. A slot
//! is tied to one subscription: once unsubscribed it discards anything
//! pushed to it, so a stale provider callback can never leak a sample into
//! a later subscription.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::IngestError;
use crate::types::{IngestSettings, RawSample};

/// Authorization state reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet
    Undetermined,
}

/// Platform permission check for sensor access
pub trait PermissionGate {
    /// Current authorization state
    fn status(&self) -> PermissionStatus;

    /// Prompt the user if needed and return the resulting state
    fn request(&mut self) -> PermissionStatus {
        self.status()
    }
}

/// Platform magnetometer that delivers samples at a fixed interval
pub trait SampleProvider {
    /// Begin delivering samples into `sink` every `interval`
    fn start(&mut self, interval: Duration, sink: SampleSink);

    /// Stop delivering samples
    fn stop(&mut self);
}

#[derive(Debug, Default)]
struct Slot {
    latest: Mutex<Option<RawSample>>,
    closed: AtomicBool,
}

/// Producer handle given to a [`SampleProvider`]
#[derive(Debug, Clone)]
pub struct SampleSink {
    slot: Arc<Slot>,
}

impl SampleSink {
    /// Offer a sample, replacing any sample not yet drained
    ///
    /// Returns `false` once the subscription is closed; the sample is then
    /// dropped.
    pub fn push(&self, sample: RawSample) -> bool {
        if self.is_closed() {
            return false;
        }
        let mut latest = self.slot.latest.lock().unwrap_or_else(PoisonError::into_inner);
        // Re-check under the lock so nothing lands after close() cleared the slot
        if self.is_closed() {
            return false;
        }
        *latest = Some(sample);
        true
    }

    /// Whether the subscription behind this sink has ended
    pub fn is_closed(&self) -> bool {
        self.slot.closed.load(Ordering::Acquire)
    }
}

impl Slot {
    fn take(&self) -> Option<RawSample> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn close(&self) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        self.closed.store(true, Ordering::Release);
        *latest = None;
    }
}

/// Subscription to a [`SampleProvider`]
pub struct SampleIngestor<P: SampleProvider> {
    provider: P,
    settings: IngestSettings,
    /// Slot of the live subscription
    slot: Option<Arc<Slot>>,
}

impl<P: SampleProvider> SampleIngestor<P> {
    pub fn new(provider: P) -> Self {
        Self::with_settings(provider, IngestSettings::default())
    }

    pub fn with_settings(provider: P, settings: IngestSettings) -> Self {
        Self {
            provider,
            settings,
            slot: None,
        }
    }

    /// Start receiving samples
    ///
    /// Asks the gate for permission first when the user has not decided
    /// yet. Subscribing while already subscribed is a no-op.
    pub fn subscribe(&mut self, gate: &mut dyn PermissionGate) -> Result<(), IngestError> {
        if self.slot.is_some() {
            return Ok(());
        }

        let status = match gate.status() {
            PermissionStatus::Undetermined => gate.request(),
            status => status,
        };
        if status != PermissionStatus::Granted {
            warn!("Magnetometer permission not granted ({status:?})");
            return Err(IngestError::PermissionDenied);
        }

        let slot = Arc::new(Slot::default());
        let interval = Duration::from_millis(self.settings.sample_interval_ms);
        self.provider.start(interval, SampleSink { slot: Arc::clone(&slot) });
        self.slot = Some(slot);
        info!("Subscribed to magnetometer every {interval:?}");
        Ok(())
    }

    /// Stop receiving samples; safe to call repeatedly
    ///
    /// Any sample pending in the slot is discarded.
    pub fn unsubscribe(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        slot.close();
        self.provider.stop();
        debug!("Unsubscribed from magnetometer");
    }

    /// Take the newest sample pushed since the last call
    pub fn latest(&mut self) -> Option<RawSample> {
        self.slot.as_ref().and_then(|slot| slot.take())
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.is_some()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }
}

impl<P: SampleProvider> Drop for SampleIngestor<P> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
