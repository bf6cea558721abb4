//! Windowed Statistics Constants
//!
//! Window length and the thresholds that decide when a window qualifies as
//! stable. Voltages are ADC-side volts (0-3.3 V after the divider).

/// Microseconds per second.
pub const US_PER_SECOND: u64 = 1_000_000;

/// Default window length (microseconds).
///
/// One second windows: long enough to average out ADC noise, short enough
/// to follow a breath rising over a few hundred milliseconds.
pub const DEFAULT_WINDOW_US: u64 = US_PER_SECOND;

/// Minimum samples for a window to be evaluated.
///
/// 80 of the nominal 128 samples per second. Windows below this are
/// reported unstable regardless of their statistics.
pub const DEFAULT_MIN_WINDOW_SAMPLES: usize = 80;

/// Maximum sample standard deviation of a qualifying window (volts).
///
/// Source: bench measurements of a warmed MQ-3 in clean air
pub const DEFAULT_STDDEV_MAX_V: f64 = 0.002;

/// Maximum drift between consecutive window means (volts per second).
pub const DEFAULT_DRIFT_MAX_V_PER_S: f64 = 0.001;

/// Consecutive qualifying windows needed before a window is marked stable.
pub const DEFAULT_REQUIRED_STABLE_WINDOWS: usize = 3;
