//! Breath detection scenarios, from window sequences and from sample traces
//!
//! Tests cover:
//! - Stability convergence and drift reset in the window engine
//! - Happy path breath (Ready → Processing → Analyzed → Cooldown)
//! - Too-short breath rejection
//! - Idle signal never leaving Ready
//! - Full traces from the simulated sensor through the breath processor

mod common;

use breathguard_core::{
    breath::BreathState,
    constants::sensor::RS_RO_CLEAN_AIR,
    mq3::{BreathReading, CalibrationReport, CircuitConfig},
    pipeline::{BreathProcessor, CalibrationProcessor, ProcessEvent, StateAction},
    sim::BreathProfile,
    stats::{WindowAnalyzer, WindowResult},
    traits::BatchProcessor,
};

use common::*;

const US: u64 = 1_000_000;

/// Synthetic window `[k s, k+1 s)` with low noise
fn window(k: u64, mean: f64, stable: bool) -> WindowResult {
    WindowResult {
        window_start_us: k * US,
        window_end_us: (k + 1) * US,
        mean,
        stddev: 0.0005,
        stable,
        num_samples: 100,
        ..Default::default()
    }
}

/// Warmup windows followed by `pattern`, numbered consecutively
fn sequence(warmup: u64, pattern: &[(f64, bool)]) -> Vec<WindowResult> {
    let mut windows: Vec<_> = (0..warmup).map(|k| window(k, 1.0, true)).collect();
    for (i, &(mean, stable)) in pattern.iter().enumerate() {
        windows.push(window(warmup + i as u64, mean, stable));
    }
    windows
}

mod window_engine {
    use super::*;

    #[test]
    fn test_stability_convergence() {
        let config = window_config();
        let required = config.required_stable_windows;

        // Samples spanning required + 1 windows finalize `required` of them
        let samples = constant_samples(0, (required + 1) * 100, 1.0);
        let windows = windows_of(config, &samples);

        assert_eq!(windows.len(), required);
        let (last, prior) = windows.split_last().unwrap();
        assert!(last.stable);
        assert!(prior.iter().all(|w| !w.stable));
    }

    #[test]
    fn test_drift_resets_streak() {
        let config = window_config();
        let mut analyzer = WindowAnalyzer::new(config);
        let mut windows = Vec::new();

        let mut samples = constant_samples(0, 500, 1.0);
        samples.extend(constant_samples(5 * US, 100, 1.01));
        samples.extend(constant_samples(6 * US, 101, 1.01));
        for s in &samples {
            analyzer.push(s.timestamp_us, s.volts(), |w| windows.push(w));
        }

        assert!(windows[4].stable);
        // Still quiet, but 10 mV/s of drift
        assert!(windows[5].stddev < 1e-9);
        assert!(windows[5].drift_per_sec > config.drift_max);
        assert!(!windows[5].stable);
        assert_eq!(windows[6].drift_per_sec, 0.0);
        assert!(!windows[6].stable);
        assert_eq!(analyzer.streak(), 1);
    }
}

mod detector_sequences {
    use super::*;

    #[test]
    fn test_happy_path() {
        let windows = sequence(
            5,
            &[(1.3, false), (1.3, false), (1.3, false), (1.0, false), (1.0, true)],
        );
        let run = run_detector(breath_config(), &windows);

        assert_eq!(run.events.len(), 1);
        let event = run.events[0];
        assert_eq!(event.peak_voltage, 1.3);
        assert_eq!(event.start_us, 5 * US);
        assert_eq!(event.end_us, 9 * US);
        assert_eq!(event.state, BreathState::Analyzed);
        assert_eq!(
            run.states,
            [
                BreathState::Warmup,
                BreathState::Ready,
                BreathState::Processing,
                BreathState::Analyzed,
                BreathState::Cooldown,
            ]
        );
    }

    #[test]
    fn test_too_short_is_rejected() {
        let config = breath_config().with_blow_time_us(2_500_000, 10_000_000);
        let windows = sequence(5, &[(1.3, false), (1.0, false), (1.0, true)]);
        let run = run_detector(config, &windows);

        assert!(run.events.is_empty());
        assert_eq!(
            run.states,
            [
                BreathState::Warmup,
                BreathState::Ready,
                BreathState::Processing,
                BreathState::Cooldown,
            ]
        );
    }

    #[test]
    fn test_idle_never_leaves_ready() {
        let windows: Vec<_> = (0..500).map(|k| window(k, 1.0 + (k % 7) as f64 * 1e-4, true)).collect();
        let run = run_detector(breath_config(), &windows);

        assert!(run.events.is_empty());
        assert_eq!(run.states, [BreathState::Warmup, BreathState::Ready]);
    }

    #[test]
    fn test_second_breath_after_cooldown() {
        let quiet = [(1.0, true); 3];
        let breath = [(1.3, false), (1.3, false), (1.0, false), (1.0, true)];
        let mut pattern = Vec::new();
        pattern.extend_from_slice(&breath);
        pattern.extend_from_slice(&quiet);
        pattern.extend_from_slice(&breath);

        let run = run_detector(breath_config(), &sequence(5, &pattern));
        assert_eq!(run.events.len(), 2);
        assert!(run.events[1].start_us > run.events[0].end_us);
    }
}

mod traces {
    use super::*;

    fn profile() -> BreathProfile {
        BreathProfile::new(0, 0.3).with_shape(500_000, 2_000_000, 500_000)
    }

    #[test]
    fn test_simulated_breath_end_to_end() {
        let samples = sensor_trace(breathing_sensor(1.0, 10 * US, profile()), 2_500);
        let run = run_detector(breath_config(), &windows_of(window_config(), &samples));

        assert_eq!(run.events.len(), 1);
        let event = run.events[0];
        assert_eq!(event.start_us, 10 * US);
        assert_eq!(event.end_us, 14 * US);
        assert!((event.peak_voltage - 1.3).abs() < 1e-3, "peak {}", event.peak_voltage);
        assert_eq!(
            run.states,
            [
                BreathState::Warmup,
                BreathState::Ready,
                BreathState::Processing,
                BreathState::Analyzed,
                BreathState::Cooldown,
                BreathState::Ready,
            ]
        );
    }

    #[test]
    fn test_processor_reports_breath_once() {
        let samples = sensor_trace(breathing_sensor(1.0, 10 * US, profile()), 2_500);
        let mut processor = BreathProcessor::new(window_config(), breath_config());
        let mut analyzed = 0;
        let mut events = Vec::new();

        for batch in samples.chunks(37) {
            let step = processor.on_batch(batch);
            assert_eq!(step.action, StateAction::Continue);
            if step.event == ProcessEvent::Analyzed {
                analyzed += 1;
                events.extend(processor.pop_breath_event());
            }
        }

        assert_eq!(analyzed, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(processor.breaths(), 1);
        assert_eq!(processor.result().peak_volts, 0.0);
        assert_eq!(processor.state(), BreathState::Ready);
    }

    #[test]
    fn test_calibration_on_resting_sensor() {
        let samples = sensor_trace(resting_sensor(1.1876), 1_000);
        let mut processor = CalibrationProcessor::new(window_config());

        let mut done = None;
        for batch in samples.chunks(64) {
            let step = processor.on_batch(batch);
            if step.action == StateAction::Done {
                done = step.result;
                break;
            }
        }

        let window = done.expect("resting sensor should stabilize");
        assert!(window.stable);
        assert!((window.mean - 1.1876).abs() < 1e-3);
        assert_eq!(window.window_end_us, 3 * US);
    }

    #[test]
    fn test_breath_reading_against_calibrated_air() {
        let samples = sensor_trace(breathing_sensor(1.0, 10 * US, profile()), 2_500);
        let windows = windows_of(window_config(), &samples);
        let calm = windows.iter().find(|w| w.stable).unwrap();

        let report = CalibrationReport::from_window(calm, &CircuitConfig::default()).unwrap();
        let circuit = CircuitConfig { ro_air_ohms: report.ro_clean_air_ohms, ..Default::default() };

        let event = run_detector(breath_config(), &windows).events[0];
        let reading = BreathReading::from_peak(event.peak_voltage, &circuit).unwrap();
        let resting = BreathReading::from_peak(calm.mean, &circuit).unwrap();

        assert!((resting.rs_ro - RS_RO_CLEAN_AIR).abs() < 1e-9);
        assert!(reading.rs_ro < resting.rs_ro);
        assert!(reading.rs_ohms < report.rs_ohms);
    }
}
