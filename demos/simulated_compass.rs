//! Drives the compass pipeline from a simulated magnetometer.
//!
//! Run with `RUST_LOG=debug cargo run --example simulated_compass` to see
//! the pipeline's log output.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use compass_heading::{
    CalibrationEvent, CalibrationSettings, CompassConfig, CompassController, ConfigError, DEG_TO_RAD,
    PermissionGate, PermissionStatus, SampleProvider, SampleSink,
};
use nalgebra::Vector3;

/// Magnetometer that slowly turns the device clockwise through north
#[derive(Default)]
struct SimulatedMagnetometer {
    running: Option<Arc<AtomicBool>>,
    thread: Option<JoinHandle<()>>,
}

impl SampleProvider for SimulatedMagnetometer {
    fn start(&mut self, interval: Duration, sink: SampleSink) {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        self.thread = Some(thread::spawn(move || {
            let mut heading = 300.0_f32;
            while flag.load(Ordering::Acquire) {
                let rad = heading * DEG_TO_RAD;
                if !sink.push(Vector3::new(40.0 * rad.cos(), 40.0 * rad.sin(), -30.0)) {
                    break;
                }
                heading = (heading + 3.0) % 360.0;
                thread::sleep(interval);
            }
        }));
        self.running = Some(running);
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.store(false, Ordering::Release);
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }
}

fn main() -> Result<(), ConfigError> {
    env_logger::init();

    let config = CompassConfig {
        calibration: CalibrationSettings {
            duration_seconds: 3,
            tick_interval_ms: 250,
        },
        ..Default::default()
    };
    let mut compass =
        CompassController::with_config(SimulatedMagnetometer::default(), AlwaysGranted, config)?;
    let events = compass.subscribe_calibration();

    if !compass.start() {
        println!("No sensor access; heading will stay at its initial value");
    }

    for step in 0..60 {
        // this loop should run on the display's frame clock
        if let Some(reading) = compass.poll() {
            println!("{reading}  rotation {:.1}°", reading.rotation);
        }

        match step {
            20 => {
                compass.set_locked(true);
                println!("-- locked --");
            }
            30 => {
                compass.set_locked(false);
                println!("-- unlocked --");
            }
            35 => {
                compass.request_calibration().ok();
                if let Some(guidance) = compass.calibration_guidance() {
                    println!("{guidance}");
                }
                compass.confirm_calibration().ok();
            }
            _ => {}
        }

        for event in events.try_iter() {
            match event {
                CalibrationEvent::Tick { remaining_seconds } => {
                    println!("Calibrating... {remaining_seconds}s")
                }
                CalibrationEvent::Completed => println!("Calibration complete"),
                _ => {}
            }
        }

        thread::sleep(Duration::from_millis(50));
    }

    compass.stop();
    Ok(())
}
