//! Core Traits and Abstractions for BreathGuard
//!
//! The pipeline has three extension points, each a small trait:
//!
//! - [`source`] - [`SampleSource`], the driver capability the sampler polls
//! - [`processor`] - [`BatchProcessor`], what the batch runner feeds
//! - [`time`] - [`TimeSource`], where sample timestamps come from
//!
//! ## Design Philosophy
//!
//! Everything generic is resolved at compile time. The runner is generic over
//! its processor, the sampler over its source and clock, so the hot path has
//! no dynamic dispatch. Whether a processor wants a timeout is an associated
//! constant, read once per run.
//!
//! ## Usage Example
//!
//! ```rust
//! use breathguard_core::traits::SampleSource;
//! use breathguard_core::sample::RawReading;
//!
//! struct FixedVoltage(f32);
//!
//! impl SampleSource for FixedVoltage {
//!     type Error = core::convert::Infallible;
//!
//!     fn acquire(&mut self) -> nb::Result<RawReading, Self::Error> {
//!         Ok(RawReading::new(0, self.0))
//!     }
//! }
//! ```

pub mod processor;
pub mod source;
pub mod time;

pub use processor::BatchProcessor;
pub use source::SampleSource;
pub use time::TimeSource;
