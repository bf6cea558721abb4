//! Sample Source Capability
//!
//! The sampler asks its source for exactly one reading per tick. The source
//! owns everything about the hardware: bus transactions, conversion waits,
//! register layouts. The pipeline only sees a reading or a failure.
//!
//! ## Failure Policy
//!
//! Both failure shapes skip the tick and nothing enters the ring:
//! - `nb::Error::WouldBlock`: the conversion is not ready yet
//! - `nb::Error::Other(e)`: the read failed (bus error, NACK, ...)
//!
//! A skipped tick is not a ring drop and is never retried within the same
//! period, so a flaky sensor cannot stall the sampling cadence.

use crate::sample::RawReading;

/// Driver capability producing one reading per call
///
/// Timestamps are not part of the reading: the sampling thread stamps each
/// reading with its own monotonic clock right after `acquire` returns.
///
/// ## Example
///
/// ```rust
/// use breathguard_core::traits::SampleSource;
/// use breathguard_core::sample::RawReading;
/// use breathguard_core::mq3::ads1115_volts;
///
/// struct Adc {
///     ready: bool,
///     code: i16,
/// }
///
/// impl SampleSource for Adc {
///     type Error = &'static str;
///
///     fn acquire(&mut self) -> nb::Result<RawReading, Self::Error> {
///         if !self.ready {
///             return Err(nb::Error::WouldBlock);
///         }
///         Ok(RawReading::new(self.code, ads1115_volts(self.code) as f32))
///     }
/// }
/// ```
pub trait SampleSource {
    /// Driver-specific failure
    type Error: core::fmt::Debug;

    /// Acquire one reading, synchronously
    fn acquire(&mut self) -> nb::Result<RawReading, Self::Error>;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    type Error = S::Error;

    fn acquire(&mut self) -> nb::Result<RawReading, Self::Error> {
        (**self).acquire()
    }
}
