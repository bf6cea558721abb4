//! Session Wiring
//!
//! A [`Session`] owns everything one measurement needs: the sample source,
//! the ring, the clock, the configuration snapshot and the running flags.
//! Each [`run`](Session::run) splits the ring, starts the sampling thread,
//! drives the processor on the calling thread and joins the sampler before
//! returning.
//!
//! ```text
//!        Session::run
//!   ┌──────────────────────────── thread scope ─────────────────────────┐
//!   │ sampler thread:  source → Sampler → Producer ─┐                   │
//!   │                                               ↓                   │
//!   │ calling thread:  Consumer → BatchRunner → processor → callback    │
//!   └───────────── sampler stopped and joined before scope ends ────────┘
//! ```
//!
//! ## Stopping
//!
//! [`SessionControl`] is a cloneable handle with one flag per thread. Clone
//! it before the run and call [`stop`](SessionControl::stop) from a callback,
//! a signal handler or another thread. A stop sticks: later runs return
//! `Stopped` at once until [`reset`](SessionControl::reset) is called. Only
//! the sampling flag is raised again by each run.
//!
//! Showing a result to the user for a while (holding an LED pattern, say)
//! is the callback's business; the session never pauses on its own.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::breath::{BreathEvent, BreathResult};
use crate::config::SessionConfig;
use crate::constants::RING_CAPACITY;
use crate::errors::SessionError;
use crate::pipeline::{BatchRunner, BreathProcessor, CalibrationProcessor, RunReport, StopReason};
use crate::queue::{RingStatsSnapshot, SampleRing};
use crate::sample::Sample;
use crate::sampler::Sampler;
use crate::stats::WindowResult;
use crate::time::MonotonicClock;
use crate::traits::{BatchProcessor, SampleSource, TimeSource};

/// Running flags shared with the session's threads
#[derive(Debug, Clone)]
pub struct SessionControl {
    sampling: Arc<AtomicBool>,
    consuming: Arc<AtomicBool>,
}

impl SessionControl {
    fn new() -> Self {
        Self {
            sampling: Arc::new(AtomicBool::new(false)),
            consuming: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Clear a pending stop so the next run can start
    pub fn reset(&self) {
        self.consuming.store(true, Ordering::Release);
    }

    /// Stop both threads
    pub fn stop(&self) {
        self.stop_consuming();
        self.stop_sampling();
    }

    /// Stop the sampling thread only
    pub fn stop_sampling(&self) {
        self.sampling.store(false, Ordering::Release);
    }

    /// Stop the batch runner only; the run then stops the sampler
    pub fn stop_consuming(&self) {
        self.consuming.store(false, Ordering::Release);
    }

    /// Whether the sampler is meant to be running
    pub fn is_sampling(&self) -> bool {
        self.sampling.load(Ordering::Acquire)
    }

    /// Whether the runner is meant to be running
    pub fn is_consuming(&self) -> bool {
        self.consuming.load(Ordering::Acquire)
    }
}

/// Stops the sampler when the run unwinds before its orderly shutdown
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One source, one ring, one configuration
///
/// `N` is the ring size (a power of two); `C` the clock that stamps samples.
pub struct Session<S, C = MonotonicClock, const N: usize = RING_CAPACITY> {
    source: S,
    clock: C,
    ring: Box<SampleRing<Sample, N>>,
    config: SessionConfig,
    control: SessionControl,
    dropped: AtomicU64,
}

impl<S, const N: usize> Session<S, MonotonicClock, N>
where
    S: SampleSource + Send,
{
    /// Validate `config` and build a session stamping with a monotonic clock
    pub fn new(source: S, config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_clock(source, MonotonicClock::new(), config)
    }
}

impl<S, C, const N: usize> Session<S, C, N>
where
    S: SampleSource + Send,
    C: TimeSource + Clone,
{
    /// Validate `config` and build a session stamping with `clock`
    pub fn with_clock(source: S, clock: C, config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            source,
            clock,
            ring: Box::new(SampleRing::new()),
            config,
            control: SessionControl::new(),
            dropped: AtomicU64::new(0),
        })
    }

    /// Configuration snapshot
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Handle for stopping a run from elsewhere
    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    /// Samples dropped by overwrite since the session was created
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Ring counters of the current or last run
    pub fn ring_stats(&self) -> RingStatsSnapshot {
        self.ring.stats().snapshot()
    }

    /// Give the source back
    pub fn into_source(self) -> S {
        self.source
    }

    /// Sample into `processor` until it finishes, times out or is stopped
    ///
    /// The ring starts empty. `on_event` receives the processor after every
    /// batch that produced an event. A stop issued before the call ends the
    /// run immediately, without starting the sampler.
    pub fn run<P, F>(
        &mut self,
        processor: &mut P,
        on_event: F,
    ) -> Result<RunReport<P::Output>, SessionError>
    where
        P: BatchProcessor,
        F: FnMut(&mut P),
    {
        self.ring.clear();
        if !self.control.is_consuming() {
            log_info!("session run skipped: stop pending");
            return Ok(RunReport {
                result: processor.result(),
                reason: StopReason::Stopped,
                batches: 0,
                samples: 0,
            });
        }
        self.control.sampling.store(true, Ordering::Release);

        let sampling: &AtomicBool = &self.control.sampling;
        let consuming: &AtomicBool = &self.control.consuming;
        let runner_config = self.config.runner;
        let (producer, mut consumer) = self.ring.split();
        let sampler = Sampler::new(
            producer,
            &mut self.source,
            self.clock.clone(),
            self.config.sampler,
            sampling,
            &self.dropped,
        );

        thread::scope(|scope| {
            let _stop = StopOnDrop(sampling);
            let handle = sampler.spawn(scope).map_err(SessionError::Spawn)?;

            let report = BatchRunner::new(&mut consumer, runner_config, consuming)
                .run(processor, on_event);

            sampling.store(false, Ordering::Release);
            if let Err(panic) = handle.join() {
                std::panic::resume_unwind(panic);
            }

            log_info!(
                "session run finished: {:?} after {} samples, {} dropped",
                report.reason,
                report.samples,
                self.dropped.load(Ordering::Relaxed)
            );
            Ok(report)
        })
    }

    /// Sample until the raw signal is stable or the runner times out
    pub fn run_calibration(&mut self) -> Result<RunReport<Option<WindowResult>>, SessionError> {
        let mut processor = CalibrationProcessor::new(self.config.window);
        self.run(&mut processor, |_| {})
    }

    /// Detect breaths until stopped, handing each one to `on_breath`
    pub fn run_breath<F>(&mut self, mut on_breath: F) -> Result<RunReport<BreathResult>, SessionError>
    where
        F: FnMut(BreathEvent),
    {
        let mut processor = BreathProcessor::new(self.config.window, self.config.breath);
        self.run(&mut processor, |p| {
            while let Some(event) = p.pop_breath_event() {
                on_breath(event);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RunnerConfig, SamplerConfig, WindowConfig};
    use crate::errors::ConfigError;
    use crate::sim::SimulatedSensor;

    fn fast_config() -> SessionConfig {
        SessionConfig::default()
            .with_sampler(SamplerConfig::default().with_sample_rate_hz(1_000))
            .with_runner(
                RunnerConfig::default()
                    .with_idle_sleep_ms(1)
                    .with_tick_sleep_ms(1)
                    .with_timeout_ms(2_000),
            )
            .with_window(
                WindowConfig::default()
                    .with_window_us(20_000)
                    .with_min_samples(5)
                    .with_required_stable_windows(2),
            )
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig::default()
            .with_sampler(SamplerConfig::default().with_sample_rate_hz(0));
        let err = Session::<_>::new(SimulatedSensor::new(1.0), config).err().unwrap();
        assert!(matches!(err, SessionError::Config(ConfigError::Zero { .. })));
    }

    #[test]
    fn calibration_finds_stable_signal() {
        let sensor = SimulatedSensor::new(1.2).with_sample_rate_hz(1_000);
        let mut session = Session::<_, MonotonicClock, 1024>::new(sensor, fast_config()).unwrap();

        let report = session.run_calibration().unwrap();
        assert_eq!(report.reason, StopReason::Completed);
        let window = report.result.unwrap();
        assert!(window.stable);
        assert!((window.mean - f64::from(1.2f32)).abs() < 1e-9);
        assert!(!session.control().is_sampling());
    }

    #[test]
    fn control_stops_breath_run() {
        let sensor = SimulatedSensor::new(1.0).with_sample_rate_hz(1_000);
        let mut session = Session::<_, MonotonicClock, 1024>::new(sensor, fast_config()).unwrap();
        let control = session.control();

        let report = thread::scope(|s| {
            s.spawn(|| {
                thread::sleep(std::time::Duration::from_millis(150));
                control.stop();
            });
            session.run_breath(|_| {}).unwrap()
        });

        assert_eq!(report.reason, StopReason::Stopped);
        assert!(report.samples > 0);
    }

    #[test]
    fn stop_before_run_is_kept() {
        let sensor = SimulatedSensor::new(1.0).with_sample_rate_hz(1_000);
        let mut session = Session::<_, MonotonicClock, 1024>::new(sensor, fast_config()).unwrap();
        let control = session.control();
        control.stop();

        let report = session.run_breath(|_| {}).unwrap();
        assert_eq!(report.reason, StopReason::Stopped);
        assert_eq!(report.samples, 0);
        assert_eq!(session.ring_stats().pushed, 0);

        control.reset();
        let report = session.run_calibration().unwrap();
        assert!(report.is_completed());
    }

    #[test]
    fn session_is_reusable() {
        let sensor = SimulatedSensor::new(1.0).with_sample_rate_hz(1_000);
        let mut session = Session::<_, MonotonicClock, 1024>::new(sensor, fast_config()).unwrap();
        for _ in 0..2 {
            let report = session.run_calibration().unwrap();
            assert!(report.is_completed());
        }
    }
}
