//! Common test utilities and data generators for integration tests
//!
//! This module provides:
//! - Sample trace generators with synthetic timestamps
//! - Compact window and detector configurations sized for tests
//! - Helpers that drive the analyzer and the detector offline

#![allow(dead_code)]

use breathguard_core::{
    breath::{BreathDetector, BreathEvent, BreathState},
    config::{BreathConfig, WindowConfig},
    sample::Sample,
    sim::{BreathProfile, SimulatedSensor},
    stats::{WindowAnalyzer, WindowResult},
    traits::SampleSource,
};

/// 100 Hz, 10 ms between samples
pub const PERIOD_US: u64 = 10_000;

/// 1 s windows hold 100 samples at `PERIOD_US`
pub const WINDOW_US: u64 = 1_000_000;

/// Window settings matched to `PERIOD_US`
pub fn window_config() -> WindowConfig {
    WindowConfig::default()
        .with_window_us(WINDOW_US)
        .with_min_samples(50)
        .with_stddev_max(0.002)
        .with_drift_max(0.001)
        .with_required_stable_windows(3)
}

/// Detector settings with short warmup and cooldown
pub fn breath_config() -> BreathConfig {
    BreathConfig::default()
        .with_warmup_stable_windows(3)
        .with_cooldown_stable_windows(3)
        .with_blow_time_us(400_000, 5_000_000)
}

/// `count` samples of a constant value, `PERIOD_US` apart
pub fn constant_samples(start_us: u64, count: usize, value: f32) -> Vec<Sample> {
    (0..count as u64)
        .map(|i| Sample::new(start_us + i * PERIOD_US, 0, value))
        .collect()
}

/// Samples drawn from a simulated sensor, stamped on a synthetic clock
///
/// The sensor runs at the matching rate, so its scripted breath times line up
/// with the returned timestamps.
pub fn sensor_trace(mut sensor: SimulatedSensor, count: usize) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(count);
    let mut t = 0;
    while samples.len() < count {
        if let Ok(reading) = sensor.acquire() {
            samples.push(Sample::from_reading(t, reading));
        }
        t += PERIOD_US;
    }
    samples
}

/// Resting sensor at `baseline_v` with small deterministic noise
pub fn resting_sensor(baseline_v: f64) -> SimulatedSensor {
    SimulatedSensor::new(baseline_v)
        .with_sample_rate_hz((1_000_000 / PERIOD_US) as u32)
        .with_noise(0.0005, 7)
}

/// Resting sensor with one breath starting at `start_us`
pub fn breathing_sensor(baseline_v: f64, start_us: u64, profile: BreathProfile) -> SimulatedSensor {
    resting_sensor(baseline_v).with_breath(BreathProfile { start_us, ..profile })
}

/// All windows a trace finalizes
pub fn windows_of(config: WindowConfig, samples: &[Sample]) -> Vec<WindowResult> {
    let mut analyzer = WindowAnalyzer::new(config);
    let mut windows = Vec::new();
    for s in samples {
        analyzer.push(s.timestamp_us, s.volts(), |w| windows.push(w));
    }
    windows
}

/// Result of replaying windows through a detector
#[derive(Debug, Default)]
pub struct DetectorRun {
    /// Distinct states in the order they were entered
    pub states: Vec<BreathState>,
    /// Every breath taken from the detector
    pub events: Vec<BreathEvent>,
}

/// Feed windows into a fresh detector, recording states and events
pub fn run_detector(config: BreathConfig, windows: &[WindowResult]) -> DetectorRun {
    let mut detector = BreathDetector::new(config);
    let mut run = DetectorRun { states: vec![detector.state()], events: Vec::new() };

    for window in windows {
        if detector.on_window(window) {
            run.events.extend(detector.take_event());
        }
        if run.states.last() != Some(&detector.state()) {
            run.states.push(detector.state());
        }
    }
    run
}

/// Two-pass mean and sample variance, for comparison
pub fn two_pass(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() > 1 {
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    (mean, var)
}
