//! Breath detector state machine

use crate::config::BreathConfig;
use crate::stats::WindowResult;
use crate::time::Timestamp;

use super::{Baseline, BreathEvent, BreathResult, BreathState};

/// Hysteresis thresholds derived from one baseline snapshot
#[derive(Debug, Clone, Copy)]
struct Thresholds {
    start: f64,
    end: f64,
    ready: f64,
}

/// Five-state breath recognizer fed with finalized windows
///
/// ```rust
/// use breathguard_core::breath::{BreathDetector, BreathState};
/// use breathguard_core::config::BreathConfig;
/// use breathguard_core::stats::WindowResult;
///
/// let mut detector = BreathDetector::new(BreathConfig::default().with_warmup_stable_windows(1));
/// let calm = WindowResult { mean: 1.0, stable: true, num_samples: 128, ..Default::default() };
/// detector.on_window(&calm);
/// assert_eq!(detector.state(), BreathState::Ready);
/// ```
#[derive(Debug, Clone)]
pub struct BreathDetector {
    config: BreathConfig,
    state: BreathState,
    baseline: Baseline,
    warmup_count: u32,
    cooldown_count: u32,
    breath_start_us: Timestamp,
    peak: f64,
    snapshot: BreathResult,
    pending: Option<BreathEvent>,
}

impl BreathDetector {
    /// Detector in `Warmup` with an unseeded baseline
    pub fn new(config: BreathConfig) -> Self {
        Self {
            baseline: Baseline::new(config.baseline_alpha),
            config,
            state: BreathState::Warmup,
            warmup_count: 0,
            cooldown_count: 0,
            breath_start_us: 0,
            peak: 0.0,
            snapshot: BreathResult::default(),
            pending: None,
        }
    }

    /// Back to `Warmup`, forgetting the baseline and any pending event
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Current state
    pub fn state(&self) -> BreathState {
        self.state
    }

    /// Current baseline
    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Running snapshot
    pub fn result(&self) -> BreathResult {
        self.snapshot
    }

    /// Whether a finished breath is waiting to be taken
    pub fn has_event(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending breath, if any
    pub fn take_event(&mut self) -> Option<BreathEvent> {
        self.pending.take()
    }

    /// Feed one finalized window
    ///
    /// Returns `true` only when this window finished a breath, which is then
    /// available from [`take_event`](Self::take_event). Windows without any
    /// samples are recorded in the snapshot but do not drive the machine;
    /// during cooldown they break the run of quiet windows.
    pub fn on_window(&mut self, window: &WindowResult) -> bool {
        self.snapshot.last_window = *window;
        if window.is_gap() {
            self.cooldown_count = 0;
            return false;
        }

        let thresholds = self.thresholds();

        let produced = match self.state {
            BreathState::Warmup => {
                self.on_warmup(window);
                false
            }
            BreathState::Ready => {
                self.on_ready(window, thresholds.start);
                false
            }
            BreathState::Processing => self.on_processing(window, thresholds.end),
            BreathState::Analyzed => {
                self.on_analyzed();
                false
            }
            BreathState::Cooldown => {
                self.on_cooldown(window, thresholds.ready);
                false
            }
        };

        self.snapshot.baseline_mean = self.baseline.mean();
        self.snapshot.baseline_std = self.baseline.std();
        produced
    }

    fn thresholds(&self) -> Thresholds {
        let c = &self.config;
        Thresholds {
            start: self.baseline.threshold(c.start_delta, c.start_k_sigma),
            end: self.baseline.threshold(c.end_delta, c.end_k_sigma),
            ready: self.baseline.threshold(c.ready_delta, c.ready_k_sigma),
        }
    }

    fn on_warmup(&mut self, window: &WindowResult) {
        if !self.baseline.update(window) {
            return;
        }

        self.warmup_count += 1;
        if self.warmup_count >= self.config.warmup_stable_windows {
            self.warmup_count = 0;
            self.state = BreathState::Ready;
            log_info!(
                "warmup complete: baseline {:.4} V, noise {:.4} V",
                self.baseline.mean(),
                self.baseline.std()
            );
        }
    }

    fn on_ready(&mut self, window: &WindowResult, start_threshold: f64) {
        self.baseline.update(window);

        if window.mean > start_threshold {
            self.breath_start_us = if window.window_start_us != 0 {
                window.window_start_us
            } else {
                window.window_end_us
            };
            self.peak = window.mean;
            self.state = BreathState::Processing;
            log_info!(
                "breath start at {} us: {:.4} V > {:.4} V",
                self.breath_start_us,
                window.mean,
                start_threshold
            );
        }
    }

    fn on_processing(&mut self, window: &WindowResult, end_threshold: f64) -> bool {
        if window.mean > self.peak {
            self.peak = window.mean;
        }

        let elapsed = window.window_end_us.saturating_sub(self.breath_start_us);
        let falling = window.mean <= end_threshold;
        let timed_out = elapsed >= self.config.max_blow_time_us;

        if !falling && !timed_out {
            return false;
        }

        if elapsed < self.config.min_blow_time_us {
            log_debug!(
                "breath rejected: {} us shorter than {} us",
                elapsed,
                self.config.min_blow_time_us
            );
            self.cooldown_count = 0;
            self.state = BreathState::Cooldown;
            return false;
        }

        self.pending = Some(BreathEvent {
            start_us: self.breath_start_us,
            end_us: window.window_end_us,
            peak_voltage: self.peak,
            state: BreathState::Analyzed,
        });
        self.state = BreathState::Analyzed;
        log_info!(
            "breath analyzed: peak {:.4} V over {} us{}",
            self.peak,
            elapsed,
            if timed_out { " (max blow time)" } else { "" }
        );
        true
    }

    fn on_analyzed(&mut self) {
        self.snapshot.peak_volts = self.peak;
        self.cooldown_count = 0;
        self.state = BreathState::Cooldown;
    }

    fn on_cooldown(&mut self, window: &WindowResult, ready_threshold: f64) {
        self.baseline.update(window);

        if window.stable && window.mean <= ready_threshold {
            self.cooldown_count += 1;
            if self.cooldown_count >= self.config.cooldown_stable_windows {
                self.cooldown_count = 0;
                self.peak = 0.0;
                self.snapshot.peak_volts = 0.0;
                self.state = BreathState::Ready;
                log_info!("cooldown complete, ready for next breath");
            }
        } else {
            self.cooldown_count = 0;
        }
    }
}
