//! Breath Event Detection
//!
//! A five-state machine over finalized windows that recognizes one complete
//! breath: the signal rises above its resting baseline, stays up, and falls
//! back.
//!
//! ```text
//!  Warmup ──(N stable windows)──→ Ready ──(mean > start)──→ Processing
//!                                   ↑                          │ falls below end
//!                                   │                          │ or max blow time
//!                    (M quiet stable windows)          too short │ long enough
//!                                   │                      ↓    ↓
//!                                Cooldown ←────────────────┴── Analyzed
//! ```
//!
//! ## Thresholds
//!
//! All three thresholds have the form `baseline_mean + delta + k * baseline_std`
//! and are evaluated against the baseline as it stood *before* the current
//! window. Start sits highest, end lower and ready lowest, which gives the
//! machine its hysteresis.
//!
//! ## Baseline
//!
//! The baseline follows stable windows in every state except `Processing`,
//! where it is frozen so the breath itself cannot drag it upward, and the
//! transient `Analyzed` state.
//!
//! ## Events
//!
//! A finished breath is parked in a single pending slot and
//! [`BreathDetector::take_event`] hands it out once. Nothing is queued: a new
//! breath replaces one that was never collected.

mod baseline;
mod detector;

pub use baseline::Baseline;
pub use detector::BreathDetector;

use crate::stats::WindowResult;
use crate::time::Timestamp;

/// Detector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BreathState {
    /// Learning the resting baseline
    #[default]
    Warmup,
    /// Armed, waiting for a rise
    Ready,
    /// Inside a breath, baseline frozen
    Processing,
    /// Waiting for the signal to settle back down
    Cooldown,
    /// A breath was just finalized
    Analyzed,
}

impl BreathState {
    /// Short lowercase name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warmup => "warmup",
            Self::Ready => "ready",
            Self::Processing => "processing",
            Self::Cooldown => "cooldown",
            Self::Analyzed => "analyzed",
        }
    }
}

impl core::fmt::Display for BreathState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BreathState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.as_str())
    }
}

/// One completed breath
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreathEvent {
    /// Start of the window that first crossed the rise threshold
    pub start_us: Timestamp,
    /// End of the window that closed the breath
    pub end_us: Timestamp,
    /// Highest window mean during the breath, volts
    pub peak_voltage: f64,
    /// Detector state when the event was produced
    pub state: BreathState,
}

impl BreathEvent {
    /// Breath length in microseconds
    pub fn duration_us(&self) -> u64 {
        self.end_us.saturating_sub(self.start_us)
    }
}

/// Running detector snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreathResult {
    /// Baseline mean, volts
    pub baseline_mean: f64,
    /// Baseline noise, volts
    pub baseline_std: f64,
    /// Peak of the last analyzed breath, 0 once the detector re-arms
    pub peak_volts: f64,
    /// Most recent window the detector saw
    pub last_window: WindowResult,
}
