//! Session Configuration
//!
//! A session reads one [`SessionConfig`] snapshot at construction and never
//! looks at it again, so nothing here is shared or mutated while the pipeline
//! runs.
//!
//! ## Structure
//!
//! ```text
//! SessionConfig
//! ├── sampler: SamplerConfig   rate of the sampling thread
//! ├── runner:  RunnerConfig    consumer pacing, batch size, timeout
//! ├── window:  WindowConfig    window length and stability criteria
//! └── breath:  BreathConfig    detector thresholds and timings
//! ```
//!
//! All durations are stored as integers with their unit in the field name
//! (`_us`, `_ms`, `_hz`) so the structs serialize cleanly and stay `Copy`.
//! `Duration` accessors are provided for callers that prefer them.
//!
//! ## Loading
//!
//! With the `serde` feature every struct (de)serializes with
//! `#[serde(default)]`, so a document only needs the fields it changes:
//!
//! ```rust
//! # #[cfg(feature = "std")] {
//! use breathguard_core::config::SessionConfig;
//!
//! let config = SessionConfig::from_json_str(r#"{ "sampler": { "sample_rate_hz": 250 } }"#)
//!     .unwrap();
//! assert_eq!(config.sampler.sample_rate_hz, 250);
//! assert_eq!(config.window.min_samples_per_window, 80);
//! # }
//! ```

use core::time::Duration;

use crate::constants::{breath, sampling, stats};
use crate::errors::{ConfigError, ConfigResult};

/// Sampling thread settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    /// Samples per second
    pub sample_rate_hz: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: sampling::DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

impl SamplerConfig {
    /// Set the sample rate
    pub fn with_sample_rate_hz(mut self, hz: u32) -> Self {
        self.sample_rate_hz = hz;
        self
    }

    /// Sampling period in whole microseconds (0 if the rate is 0)
    pub fn period_us(&self) -> u64 {
        if self.sample_rate_hz == 0 {
            return 0;
        }
        stats::US_PER_SECOND / self.sample_rate_hz as u64
    }

    /// Sampling period
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us())
    }

    /// Check the settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::Zero { field: "sample_rate_hz" });
        }
        if self.period_us() == 0 {
            return Err(ConfigError::Zero { field: "sample_period_us" });
        }
        Ok(())
    }
}

/// Batch runner pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunnerConfig {
    /// Sleep after draining nothing
    pub idle_sleep_ms: u64,
    /// Sleep after each processed batch
    pub tick_sleep_ms: u64,
    /// Largest batch handed to the processor
    pub max_batch: usize,
    /// Run timeout for processors that enable it
    pub timeout_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            idle_sleep_ms: sampling::DEFAULT_IDLE_SLEEP_MS,
            tick_sleep_ms: sampling::DEFAULT_TICK_SLEEP_MS,
            max_batch: sampling::DEFAULT_MAX_BATCH,
            timeout_ms: sampling::DEFAULT_TIMEOUT_MS,
        }
    }
}

impl RunnerConfig {
    /// Set the idle sleep
    pub fn with_idle_sleep_ms(mut self, ms: u64) -> Self {
        self.idle_sleep_ms = ms;
        self
    }

    /// Set the per-batch sleep
    pub fn with_tick_sleep_ms(mut self, ms: u64) -> Self {
        self.tick_sleep_ms = ms;
        self
    }

    /// Set the batch size
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Set the timeout
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Idle sleep
    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }

    /// Per-batch sleep
    pub fn tick_sleep(&self) -> Duration {
        Duration::from_millis(self.tick_sleep_ms)
    }

    /// Timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check the settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_batch == 0 {
            return Err(ConfigError::Zero { field: "max_batch" });
        }
        if self.max_batch > sampling::MAX_BATCH_LIMIT {
            return Err(ConfigError::BatchTooLarge {
                requested: self.max_batch,
                limit: sampling::MAX_BATCH_LIMIT,
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Zero { field: "timeout_ms" });
        }
        Ok(())
    }
}

/// Window statistics and stability criteria
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowConfig {
    /// Window length
    pub window_us: u64,
    /// Fewer samples than this make a window unstable
    pub min_samples_per_window: usize,
    /// Largest standard deviation of a qualifying window, volts
    pub stddev_max: f64,
    /// Largest mean drift of a qualifying window, volts per second
    pub drift_max: f64,
    /// Consecutive qualifying windows before a window is reported stable
    pub required_stable_windows: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_us: stats::DEFAULT_WINDOW_US,
            min_samples_per_window: stats::DEFAULT_MIN_WINDOW_SAMPLES,
            stddev_max: stats::DEFAULT_STDDEV_MAX_V,
            drift_max: stats::DEFAULT_DRIFT_MAX_V_PER_S,
            required_stable_windows: stats::DEFAULT_REQUIRED_STABLE_WINDOWS,
        }
    }
}

impl WindowConfig {
    /// Set the window length
    pub fn with_window_us(mut self, us: u64) -> Self {
        self.window_us = us;
        self
    }

    /// Set the minimum sample count
    pub fn with_min_samples(mut self, n: usize) -> Self {
        self.min_samples_per_window = n;
        self
    }

    /// Set the noise limit
    pub fn with_stddev_max(mut self, volts: f64) -> Self {
        self.stddev_max = volts;
        self
    }

    /// Set the drift limit
    pub fn with_drift_max(mut self, volts_per_sec: f64) -> Self {
        self.drift_max = volts_per_sec;
        self
    }

    /// Set the required streak
    pub fn with_required_stable_windows(mut self, n: usize) -> Self {
        self.required_stable_windows = n;
        self
    }

    /// Window length
    pub fn window(&self) -> Duration {
        Duration::from_micros(self.window_us)
    }

    /// Window length in seconds
    pub fn window_secs(&self) -> f64 {
        self.window_us as f64 / stats::US_PER_SECOND as f64
    }

    /// Check the settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.window_us == 0 {
            return Err(ConfigError::Zero { field: "window_us" });
        }
        if self.min_samples_per_window == 0 {
            return Err(ConfigError::Zero { field: "min_samples_per_window" });
        }
        if self.required_stable_windows == 0 {
            return Err(ConfigError::Zero { field: "required_stable_windows" });
        }
        check_threshold("stddev_max", self.stddev_max)?;
        check_threshold("drift_max", self.drift_max)?;
        Ok(())
    }
}

/// Breath detector thresholds and timings
///
/// Each hysteresis threshold is `baseline_mean + delta + k_sigma * baseline_std`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BreathConfig {
    /// Stable windows seen before the detector arms
    pub warmup_stable_windows: u32,
    /// Consecutive quiet stable windows before re-arming after a breath
    pub cooldown_stable_windows: u32,
    /// Breaths shorter than this are discarded
    pub min_blow_time_us: u64,
    /// Breaths are cut off at this length
    pub max_blow_time_us: u64,
    /// Rise threshold offset, volts
    pub start_delta: f64,
    /// Rise threshold noise multiplier
    pub start_k_sigma: f64,
    /// Fall threshold offset, volts
    pub end_delta: f64,
    /// Fall threshold noise multiplier
    pub end_k_sigma: f64,
    /// Re-arm threshold offset, volts
    pub ready_delta: f64,
    /// Re-arm threshold noise multiplier
    pub ready_k_sigma: f64,
    /// EWMA weight of a new window in the baseline, `(0, 1]`
    pub baseline_alpha: f64,
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            warmup_stable_windows: breath::DEFAULT_WARMUP_STABLE_WINDOWS,
            cooldown_stable_windows: breath::DEFAULT_COOLDOWN_STABLE_WINDOWS,
            min_blow_time_us: breath::DEFAULT_MIN_BLOW_TIME_US,
            max_blow_time_us: breath::DEFAULT_MAX_BLOW_TIME_US,
            start_delta: breath::DEFAULT_START_DELTA_V,
            start_k_sigma: breath::DEFAULT_START_K_SIGMA,
            end_delta: breath::DEFAULT_END_DELTA_V,
            end_k_sigma: breath::DEFAULT_END_K_SIGMA,
            ready_delta: breath::DEFAULT_READY_DELTA_V,
            ready_k_sigma: breath::DEFAULT_READY_K_SIGMA,
            baseline_alpha: breath::DEFAULT_BASELINE_ALPHA,
        }
    }
}

impl BreathConfig {
    /// Set the warmup length
    pub fn with_warmup_stable_windows(mut self, n: u32) -> Self {
        self.warmup_stable_windows = n;
        self
    }

    /// Set the cooldown length
    pub fn with_cooldown_stable_windows(mut self, n: u32) -> Self {
        self.cooldown_stable_windows = n;
        self
    }

    /// Set the accepted blow duration range
    pub fn with_blow_time_us(mut self, min_us: u64, max_us: u64) -> Self {
        self.min_blow_time_us = min_us;
        self.max_blow_time_us = max_us;
        self
    }

    /// Set the rise threshold
    pub fn with_start_threshold(mut self, delta: f64, k_sigma: f64) -> Self {
        self.start_delta = delta;
        self.start_k_sigma = k_sigma;
        self
    }

    /// Set the fall threshold
    pub fn with_end_threshold(mut self, delta: f64, k_sigma: f64) -> Self {
        self.end_delta = delta;
        self.end_k_sigma = k_sigma;
        self
    }

    /// Set the re-arm threshold
    pub fn with_ready_threshold(mut self, delta: f64, k_sigma: f64) -> Self {
        self.ready_delta = delta;
        self.ready_k_sigma = k_sigma;
        self
    }

    /// Set the baseline EWMA weight
    pub fn with_baseline_alpha(mut self, alpha: f64) -> Self {
        self.baseline_alpha = alpha;
        self
    }

    /// Shortest accepted breath
    pub fn min_blow_time(&self) -> Duration {
        Duration::from_micros(self.min_blow_time_us)
    }

    /// Longest breath before it is cut off
    pub fn max_blow_time(&self) -> Duration {
        Duration::from_micros(self.max_blow_time_us)
    }

    /// Check the settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.warmup_stable_windows == 0 {
            return Err(ConfigError::Zero { field: "warmup_stable_windows" });
        }
        if self.cooldown_stable_windows == 0 {
            return Err(ConfigError::Zero { field: "cooldown_stable_windows" });
        }
        if self.max_blow_time_us <= self.min_blow_time_us {
            return Err(ConfigError::BlowTimeInverted {
                min_us: self.min_blow_time_us,
                max_us: self.max_blow_time_us,
            });
        }
        check_threshold("start_delta", self.start_delta)?;
        check_threshold("start_k_sigma", self.start_k_sigma)?;
        check_threshold("end_delta", self.end_delta)?;
        check_threshold("end_k_sigma", self.end_k_sigma)?;
        check_threshold("ready_delta", self.ready_delta)?;
        check_threshold("ready_k_sigma", self.ready_k_sigma)?;

        let alpha = self.baseline_alpha;
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(ConfigError::AlphaOutOfRange { alpha });
        }
        Ok(())
    }
}

/// Complete session snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Sampling thread
    pub sampler: SamplerConfig,
    /// Batch runner
    pub runner: RunnerConfig,
    /// Window statistics
    pub window: WindowConfig,
    /// Breath detector
    pub breath: BreathConfig,
}

impl SessionConfig {
    /// Replace the sampler section
    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    /// Replace the runner section
    pub fn with_runner(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the window section
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Replace the breath section
    pub fn with_breath(mut self, breath: BreathConfig) -> Self {
        self.breath = breath;
        self
    }

    /// Samples one window can hold at the configured rate
    pub fn samples_per_window(&self) -> usize {
        (self.window.window_us.saturating_mul(self.sampler.sample_rate_hz as u64)
            / stats::US_PER_SECOND) as usize
    }

    /// Check every section and their combination
    pub fn validate(&self) -> ConfigResult<()> {
        self.sampler.validate()?;
        self.runner.validate()?;
        self.window.validate()?;
        self.breath.validate()?;

        let achievable = self.samples_per_window();
        if self.window.min_samples_per_window > achievable {
            return Err(ConfigError::WindowUnreachable {
                required: self.window.min_samples_per_window,
                achievable,
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    #[cfg(feature = "std")]
    pub fn from_json_str(json: &str) -> Result<Self, crate::errors::SessionError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    #[cfg(feature = "std")]
    pub fn from_json_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::errors::SessionError> {
        let json = std::fs::read_to_string(path)
            .map_err(crate::errors::SessionError::ConfigIo)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON
    #[cfg(feature = "std")]
    pub fn to_json_string(&self) -> Result<String, crate::errors::SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_threshold(field: &'static str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}
