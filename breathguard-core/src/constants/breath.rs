//! Breath Detector Constants
//!
//! Window counts for warmup and cooldown, accepted blow durations and the
//! hysteresis offsets of the start, end and ready thresholds. Each threshold
//! is `baseline_mean + delta + k_sigma * baseline_std`.

// ===== WINDOW COUNTS =====

/// Stable windows required before the detector leaves warmup.
///
/// Counts windows, not seconds: with 5 second windows use 5 × 5 = 25.
///
/// Source: MQ-3 heater warmup behaviour observed on the bench
pub const DEFAULT_WARMUP_STABLE_WINDOWS: u32 = 25;

/// Quiet stable windows required after a breath before re-arming.
pub const DEFAULT_COOLDOWN_STABLE_WINDOWS: u32 = 25;

// ===== BLOW DURATION =====

/// Shortest accepted breath (microseconds).
///
/// Shorter excursions are treated as noise and discarded.
pub const DEFAULT_MIN_BLOW_TIME_US: u64 = 400_000;

/// Longest breath before the event is closed regardless of signal (microseconds).
pub const DEFAULT_MAX_BLOW_TIME_US: u64 = 5_000_000;

// ===== HYSTERESIS =====

/// Rise offset above baseline to start a breath (volts).
pub const DEFAULT_START_DELTA_V: f64 = 0.05;

/// Noise multiplier on the rise threshold.
pub const DEFAULT_START_K_SIGMA: f64 = 3.0;

/// Fall offset above baseline that ends a breath (volts).
pub const DEFAULT_END_DELTA_V: f64 = 0.02;

/// Noise multiplier on the fall threshold.
pub const DEFAULT_END_K_SIGMA: f64 = 2.0;

/// Offset above baseline the signal must settle under to re-arm (volts).
pub const DEFAULT_READY_DELTA_V: f64 = 0.01;

/// Noise multiplier on the ready threshold.
pub const DEFAULT_READY_K_SIGMA: f64 = 2.0;

/// EWMA weight of each new stable window in the baseline.
///
/// Moves 5% towards the new window per update.
pub const DEFAULT_BASELINE_ALPHA: f64 = 0.05;

// ===== EVENT QUEUE =====

/// Completed breaths a breath processor holds until they are collected.
///
/// One batch rarely closes more than a single breath; this covers a consumer
/// catching up on a backlog.
pub const PENDING_BREATH_EVENTS: usize = 4;
