//! Constants for BreathGuard Core
//!
//! Centralized, documented defaults used throughout the pipeline. Every
//! configuration struct in [`crate::config`] takes its `Default` from here.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Sampling**: acquisition rate, ring capacity and consumer pacing
//! - **Stats**: window length and stability thresholds
//! - **Breath**: detector warmup/cooldown counts, blow times and hysteresis
//! - **Sensor**: ADC full scale and MQ-3 circuit values
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Include the unit in the constant name (`_US`, `_MS`, `_HZ`, `_V`, `_OHMS`)
//! 3. Scale window counts together with the window length: they count windows,
//!    not seconds

/// Acquisition rate, ring capacity and consumer pacing.
pub mod sampling;

/// Window length and statistical stability thresholds.
pub mod stats;

/// Breath detector counts, blow times and hysteresis offsets.
pub mod breath;

/// ADC full scale and MQ-3 load circuit values.
pub mod sensor;

// Re-export commonly used constants for convenience
pub use sampling::{
    DEFAULT_SAMPLE_RATE_HZ, RING_CAPACITY, DEFAULT_MAX_BATCH,
    DEFAULT_IDLE_SLEEP_MS, DEFAULT_TICK_SLEEP_MS, DEFAULT_TIMEOUT_MS,
};

pub use stats::{
    DEFAULT_WINDOW_US, DEFAULT_MIN_WINDOW_SAMPLES, DEFAULT_STDDEV_MAX_V,
    DEFAULT_DRIFT_MAX_V_PER_S, DEFAULT_REQUIRED_STABLE_WINDOWS, US_PER_SECOND,
};

pub use breath::{
    DEFAULT_WARMUP_STABLE_WINDOWS, DEFAULT_COOLDOWN_STABLE_WINDOWS,
    DEFAULT_MIN_BLOW_TIME_US, DEFAULT_MAX_BLOW_TIME_US, DEFAULT_BASELINE_ALPHA,
};
