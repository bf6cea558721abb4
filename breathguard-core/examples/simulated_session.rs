//! Simulated Breathalyzer Session
//!
//! Runs the complete pipeline against a simulated MQ-3: calibrate on clean
//! air, then watch for breaths and convert each peak into a BAC estimate.
//!
//! ## What You'll Learn
//!
//! - Building a session from a validated configuration
//! - Turning a calibration window into a clean-air resistance
//! - Receiving breath events and stopping a session from its callback
//!
//! ## Running the Example
//!
//! ```bash
//! RUST_LOG=info cargo run --example simulated_session
//! RUST_LOG=debug cargo run --example simulated_session   # every window
//! ```
//!
//! The simulated sensor runs in real time, so the session takes about half a
//! minute.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use breathguard_core::{
    config::{BreathConfig, SessionConfig},
    mq3::{BreathReading, CalibrationReport, CircuitConfig},
    sim::{BreathProfile, SimulatedSensor},
    Session, SessionError,
};

/// Clean air at the ADC pin, after the divider
const RESTING_V: f64 = 0.62;

/// Breaths to wait for before stopping
const BREATHS: usize = 2;

fn main() -> Result<(), SessionError> {
    env_logger::init();

    println!("=== BreathGuard Simulated Session ===\n");

    // Short warmup and cooldown so the demo fits in half a minute
    let config = SessionConfig::default().with_breath(
        BreathConfig::default()
            .with_warmup_stable_windows(3)
            .with_cooldown_stable_windows(3),
    );

    let sensor = SimulatedSensor::new(RESTING_V)
        .with_noise(0.0004, 2024)
        .with_breath(BreathProfile::new(14_000_000, 0.35))
        .with_breath(BreathProfile::new(25_000_000, 0.9).with_shape(400_000, 2_500_000, 1_500_000));

    let mut session: Session<_> = Session::new(sensor, config)?;

    // 1. Calibration
    println!("1. Calibrating on clean air...");
    let report = session.run_calibration()?;
    let calibration = report
        .result
        .filter(|_| report.is_completed())
        .and_then(|window| CalibrationReport::from_window(&window, &CircuitConfig::default()));
    let circuit = match calibration {
        Some(calibration) => {
            println!(
                "   mean {:.4} V, Rs {:.0} Ω, Ro {:.0} Ω",
                calibration.mean_volts, calibration.rs_ohms, calibration.ro_clean_air_ohms
            );
            CircuitConfig { ro_air_ohms: calibration.ro_clean_air_ohms, ..Default::default() }
        }
        None => {
            println!("   no stable window ({:?}), using the default Ro", report.reason);
            CircuitConfig::default()
        }
    };

    // 2. Breath detection
    println!("\n2. Waiting for {} breaths...", BREATHS);
    let control = session.control();
    let started = Instant::now();
    let mut readings = Vec::new();
    let finished = AtomicBool::new(false);

    let report = thread::scope(|s| {
        s.spawn(|| {
            while !finished.load(Ordering::Acquire) && started.elapsed() < Duration::from_secs(45) {
                thread::sleep(Duration::from_millis(100));
            }
            control.stop();
        });

        let report = session.run_breath(|event| {
            let Some(reading) = BreathReading::from_peak(event.peak_voltage, &circuit) else {
                return;
            };
            println!(
                "   breath {:.1}-{:.1} s: peak {:.3} V, {:.1} ppm, BAC {:.4}",
                event.start_us as f64 / 1e6,
                event.end_us as f64 / 1e6,
                reading.peak_volts,
                reading.ppm,
                reading.bac
            );
            readings.push(reading);
            if readings.len() >= BREATHS {
                control.stop();
            }
        });
        finished.store(true, Ordering::Release);
        report
    })?;

    // 3. Summary
    println!("\n3. Summary");
    println!(
        "   stopped: {:?} after {} samples in {} batches",
        report.reason, report.samples, report.batches
    );
    println!(
        "   baseline {:.4} V ± {:.4} V",
        report.result.baseline_mean, report.result.baseline_std
    );
    println!("   dropped samples: {}", session.dropped());
    if let Some(max) = readings.iter().map(|r| r.bac).reduce(f64::max) {
        println!("   highest BAC: {:.4}", max);
    }

    Ok(())
}
