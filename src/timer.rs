//! Cancellable periodic timer on a background thread

use std::io;
use std::ops::ControlFlow;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::error;

/// Handle to a running [`spawn_periodic`] timer
///
/// Dropping the handle cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

/// Call `on_tick` every `interval` on a named background thread
///
/// The timer stops when `on_tick` returns [`ControlFlow::Break`] or when
/// the handle is cancelled.
pub fn spawn_periodic<F>(name: &str, interval: Duration, mut on_tick: F) -> io::Result<TimerHandle>
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

    let thread = thread::Builder::new().name(name.to_owned()).spawn(move || {
        loop {
            match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if on_tick().is_break() {
                        break;
                    }
                }
                // Cancelled, or the handle was dropped
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })?;

    Ok(TimerHandle {
        cancel: Some(cancel_tx),
        thread: Some(thread),
    })
}

impl TimerHandle {
    /// Stop the timer and wait for its thread to exit
    ///
    /// Once this returns no further tick runs. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The thread may already have exited on its own
            let _ = cancel.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Timer thread panicked");
            }
        }
    }

    /// Whether the timer thread has stopped on its own or been cancelled
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[test]
    fn test_ticks_until_break() {
        let count = Arc::new(AtomicU32::new(0));
        let ticks = Arc::clone(&count);

        let mut timer = spawn_periodic("test-break", Duration::from_millis(1), move || {
            if ticks.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !timer.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        timer.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_no_ticks_after_cancel() {
        let count = Arc::new(AtomicU32::new(0));
        let ticks = Arc::clone(&count);

        let mut timer = spawn_periodic("test-cancel", Duration::from_millis(1), move || {
            ticks.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(10));
        timer.cancel();
        let after_cancel = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));

        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
        assert!(timer.is_finished());
        timer.cancel();
    }

    #[test]
    fn test_cancel_before_first_tick() {
        let count = Arc::new(AtomicU32::new(0));
        let ticks = Arc::clone(&count);

        let timer = spawn_periodic("test-drop", Duration::from_secs(60), move || {
            ticks.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();
        drop(timer);

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
