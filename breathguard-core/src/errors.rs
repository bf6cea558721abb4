//! Error Types for Session Setup and Configuration
//!
//! ## Design Philosophy
//!
//! Almost nothing in the running pipeline is an error. A failed acquisition
//! skips a tick, an overflowing ring overwrites and counts, a thin window is
//! reported unstable, a short breath is discarded, a timeout returns the best
//! result so far. Those outcomes travel as data: counters, flags and
//! [`StopReason`](crate::pipeline::StopReason).
//!
//! What remains are the failures that happen before the pipeline starts:
//!
//! ### Configuration
//! - `ConfigError`: a configuration snapshot that cannot drive a session
//!   (zero rates, inverted blow times, alpha outside `(0, 1]`, ...)
//!
//! ### Session Setup (std)
//! - `SessionError::Spawn`: the sampling thread could not be created
//! - `SessionError::ConfigIo` / `ConfigParse`: a config file could not be loaded
//!
//! `ConfigError` is `Copy` and carries only `&'static str` context, so it can
//! be returned from `no_std` code without allocation.

use thiserror_no_std::Error;

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid configuration values
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A rate, duration or count that must be positive is zero
    #[error("{field} must be greater than zero")]
    Zero {
        /// Name of the offending field
        field: &'static str,
    },

    /// A value is NaN or infinite
    #[error("{field} must be a finite number")]
    NotFinite {
        /// Name of the offending field
        field: &'static str,
    },

    /// A threshold or offset is negative
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// EWMA weight outside `(0, 1]`
    #[error("baseline_alpha must be in (0, 1], got {alpha}")]
    AlphaOutOfRange {
        /// The rejected weight
        alpha: f64,
    },

    /// Blow time window is empty or inverted
    #[error("max_blow_time_us ({max_us}) must exceed min_blow_time_us ({min_us})")]
    BlowTimeInverted {
        /// Configured minimum blow time
        min_us: u64,
        /// Configured maximum blow time
        max_us: u64,
    },

    /// Batch size larger than the runner can hold
    #[error("max_batch {requested} exceeds limit {limit}")]
    BatchTooLarge {
        /// Requested batch size
        requested: usize,
        /// Largest accepted batch size
        limit: usize,
    },

    /// A window can never collect the minimum number of samples
    #[error("window holds at most {achievable} samples at this rate, {required} required")]
    WindowUnreachable {
        /// Samples per window required for evaluation
        required: usize,
        /// Samples one window can hold at the configured rate
        achievable: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Zero { field } =>
                defmt::write!(fmt, "{} must be > 0", field),
            Self::NotFinite { field } =>
                defmt::write!(fmt, "{} not finite", field),
            Self::Negative { field, value } =>
                defmt::write!(fmt, "{} negative: {}", field, value),
            Self::AlphaOutOfRange { alpha } =>
                defmt::write!(fmt, "alpha {} outside (0, 1]", alpha),
            Self::BlowTimeInverted { min_us, max_us } =>
                defmt::write!(fmt, "blow time max {} <= min {}", max_us, min_us),
            Self::BatchTooLarge { requested, limit } =>
                defmt::write!(fmt, "batch {} > limit {}", requested, limit),
            Self::WindowUnreachable { required, achievable } =>
                defmt::write!(fmt, "window needs {} samples, holds {}", required, achievable),
        }
    }
}

/// Failures while setting up or loading a session
#[cfg(feature = "std")]
#[derive(Error, Debug)]
pub enum SessionError {
    /// The configuration snapshot was rejected
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The sampling thread could not be spawned
    #[error("failed to spawn sampling thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A configuration file could not be read
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[source] std::io::Error),

    /// A configuration document could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
