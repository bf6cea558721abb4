//! Fixed-length window analysis and stability streaks

use crate::config::WindowConfig;
use crate::sample::Sample;
use crate::time::Timestamp;

use super::RunningStats;

/// Statistics of one finalized window `[window_start_us, window_end_us)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowResult {
    /// Inclusive start
    pub window_start_us: Timestamp,
    /// Exclusive end, equal to the next window's start
    pub window_end_us: Timestamp,
    /// Mean of the window's samples
    pub mean: f64,
    /// Sample standard deviation of the window's samples
    pub stddev: f64,
    /// Mean of the last window that had enough samples, if any
    pub mean_prev: Option<f64>,
    /// `|mean - mean_prev|` per second, 0 without a previous mean
    pub drift_per_sec: f64,
    /// Whether the stability streak has reached its required length
    pub stable: bool,
    /// Samples that fell into this window
    pub num_samples: usize,
}

impl WindowResult {
    /// Window length in microseconds
    pub fn duration_us(&self) -> u64 {
        self.window_end_us - self.window_start_us
    }

    /// Whether no sample at all fell into this window
    pub fn is_gap(&self) -> bool {
        self.num_samples == 0
    }
}

/// Incremental window statistics and stability tracker
///
/// Timestamps must be non-decreasing. A sample older than the open window is
/// counted in the open window.
///
/// ```rust
/// use breathguard_core::config::WindowConfig;
/// use breathguard_core::stats::WindowAnalyzer;
///
/// let config = WindowConfig::default()
///     .with_window_us(1_000)
///     .with_min_samples(10)
///     .with_required_stable_windows(1);
/// let mut analyzer = WindowAnalyzer::new(config);
///
/// let mut windows = Vec::new();
/// for i in 0..30u64 {
///     analyzer.push(i * 100, 1.0, |w| windows.push(w));
/// }
/// assert_eq!(windows.len(), 2);
/// assert_eq!(windows[0].window_end_us, windows[1].window_start_us);
/// assert!(windows[1].stable);
/// ```
#[derive(Debug, Clone)]
pub struct WindowAnalyzer {
    config: WindowConfig,
    window_secs: f64,
    window_start: Option<Timestamp>,
    current: RunningStats,
    prev_mean: Option<f64>,
    streak: usize,
    windows: u64,
}

impl WindowAnalyzer {
    /// Create an analyzer with no open window
    pub fn new(config: WindowConfig) -> Self {
        Self {
            window_secs: config.window_secs(),
            config,
            window_start: None,
            current: RunningStats::new(),
            prev_mean: None,
            streak: 0,
            windows: 0,
        }
    }

    /// Forget all windows, the previous mean and the streak
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Configuration in use
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Current run of qualifying windows
    pub fn streak(&self) -> usize {
        self.streak
    }

    /// Windows finalized so far
    pub fn windows_finalized(&self) -> u64 {
        self.windows
    }

    /// Start of the open window, if a sample has been seen
    pub fn window_start(&self) -> Option<Timestamp> {
        self.window_start
    }

    /// Add one value, finalizing every window it closes
    ///
    /// `on_window` is called once per finalized window, oldest first, before
    /// the value is added to the newly opened window.
    pub fn push(
        &mut self,
        timestamp_us: Timestamp,
        value: f64,
        mut on_window: impl FnMut(WindowResult),
    ) {
        let mut start = *self.window_start.get_or_insert(timestamp_us);

        while timestamp_us.saturating_sub(start) >= self.config.window_us {
            on_window(self.finalize(start));
            start = start.saturating_add(self.config.window_us);
            self.window_start = Some(start);
        }

        self.current.push(value);
    }

    /// Feed a batch through `project`, returning the last finalized window
    ///
    /// Stops at the sample that finalizes the first stable window and returns
    /// that window, even when the same sample also closed empty windows after
    /// it. The rest of the batch is left unprocessed.
    pub fn analyze_batch(
        &mut self,
        samples: &[Sample],
        project: impl Fn(&Sample) -> f64,
    ) -> Option<WindowResult> {
        let mut last = None;
        let mut stable = None;

        for sample in samples {
            self.push(sample.timestamp_us, project(sample), |window| {
                if window.stable && stable.is_none() {
                    stable = Some(window);
                }
                last = Some(window);
            });
            if stable.is_some() {
                return stable;
            }
        }

        last
    }

    fn finalize(&mut self, start: Timestamp) -> WindowResult {
        let num_samples = self.current.count();
        let mean = self.current.mean();
        let stddev = self.current.stddev();
        let mean_prev = self.prev_mean;

        let mut result = WindowResult {
            window_start_us: start,
            window_end_us: start.saturating_add(self.config.window_us),
            mean,
            stddev,
            mean_prev,
            drift_per_sec: 0.0,
            stable: false,
            num_samples,
        };

        if num_samples < self.config.min_samples_per_window {
            self.streak = 0;
        } else {
            if let Some(prev) = mean_prev {
                result.drift_per_sec = libm::fabs(mean - prev) / self.window_secs;
            }

            let qualifying = stddev <= self.config.stddev_max
                && (mean_prev.is_none() || result.drift_per_sec <= self.config.drift_max);

            self.streak = if qualifying { self.streak + 1 } else { 0 };
            result.stable = self.streak >= self.config.required_stable_windows;
            self.prev_mean = Some(mean);
        }

        self.current.reset();
        self.windows += 1;

        log_debug!(
            "window [{}, {}) n={} mean={:.6} prev={:?} drift={:.6} V/s stddev={:.6} stable={}",
            result.window_start_us,
            result.window_end_us,
            result.num_samples,
            result.mean,
            result.mean_prev,
            result.drift_per_sec,
            result.stddev,
            result.stable
        );

        result
    }
}
