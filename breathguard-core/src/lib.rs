//! Real-time sampling pipeline for BreathGuard
//!
//! Acquires an analog gas-sensor signal at a fixed rate, moves samples across a
//! thread boundary through a lock-free ring, decides when the signal has become
//! stable, and recognizes complete breath events (rise, sustained peak, fall).
//!
//! ```text
//! SampleSource → Sampler ─→ SampleRing ─→ BatchRunner → WindowAnalyzer → BreathDetector
//!   (driver)    (thread)   (SPSC, N-1)   (consumer)     (Welford)        (5 states)
//! ```
//!
//! Key constraints:
//! - Producer and consumer never block each other
//! - No heap allocation in the sample hot path
//! - Variance is computed incrementally, never as a raw sum of squares
//!
//! The ring, the statistics engine and the detector build without `std`.
//! The sampling thread, the runner and session wiring need the `std` feature.
//!
//! ```no_run
//! use breathguard_core::{
//!     config::SessionConfig,
//!     pipeline::BreathProcessor,
//!     session::Session,
//!     sim::SimulatedSensor,
//! };
//!
//! let config = SessionConfig::default();
//! let sensor = SimulatedSensor::new(1.0);
//! let mut session: Session<_> = Session::new(sensor, config).unwrap();
//! let mut processor = BreathProcessor::new(config.window, config.breath);
//!
//! let report = session
//!     .run(&mut processor, |p| {
//!         if let Some(event) = p.pop_breath_event() {
//!             println!("breath peak {:.3} V", event.peak_voltage);
//!         }
//!     })
//!     .unwrap();
//! println!("stopped: {:?}", report.reason);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod breath;
pub mod config;
pub mod constants;
pub mod errors;
pub mod mq3;
pub mod pipeline;
pub mod queue;
pub mod sample;
pub mod stats;
pub mod time;
pub mod traits;

#[cfg(feature = "std")]
pub mod sampler;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod sim;

// Public API
pub use breath::{BreathDetector, BreathEvent, BreathResult, BreathState};
pub use errors::{ConfigError, ConfigResult};
pub use pipeline::{
    BreathProcessor, CalibrationProcessor, ProcessEvent, StateAction, StepResult,
};
pub use queue::{Consumer, Producer, RingStats, SampleRing};
pub use sample::{RawReading, Sample};
pub use stats::{RunningStats, WindowAnalyzer, WindowResult};
pub use traits::{BatchProcessor, SampleSource, TimeSource};

#[cfg(feature = "std")]
pub use errors::SessionError;
#[cfg(feature = "std")]
pub use pipeline::{BatchRunner, RunReport, StopReason};
#[cfg(feature = "std")]
pub use session::{Session, SessionControl};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
