//! Sample types carried through the ring
//!
//! A [`RawReading`] is what a driver hands back: the ADC code and its value in
//! volts. The sampling thread stamps it with its own monotonic clock to form a
//! [`Sample`], which is then immutable until it leaves the ring.
//!
//! ```text
//! Sample layout (16 bytes):
//! ├── timestamp_us: 8 bytes
//! ├── value:        4 bytes
//! ├── raw:          2 bytes
//! └── padding:      2 bytes
//! ```

use crate::time::Timestamp;

/// One reading as produced by a [`SampleSource`](crate::traits::SampleSource)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawReading {
    /// Signed ADC conversion result
    pub raw: i16,
    /// Converted value, volts at the ADC pin
    pub value: f32,
}

impl RawReading {
    /// Build a reading from its parts
    pub const fn new(raw: i16, value: f32) -> Self {
        Self { raw, value }
    }
}

/// One timestamped sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Monotonic acquisition time in microseconds
    pub timestamp_us: Timestamp,
    /// Signed ADC conversion result
    pub raw: i16,
    /// Converted value, volts at the ADC pin
    pub value: f32,
}

impl Sample {
    /// Build a sample from its parts
    pub const fn new(timestamp_us: Timestamp, raw: i16, value: f32) -> Self {
        Self { timestamp_us, raw, value }
    }

    /// Stamp a reading taken at `timestamp_us`
    pub const fn from_reading(timestamp_us: Timestamp, reading: RawReading) -> Self {
        Self {
            timestamp_us,
            raw: reading.raw,
            value: reading.value,
        }
    }

    /// Sample value widened to `f64`; the projection used by the processors
    pub fn volts(&self) -> f64 {
        self.value as f64
    }
}
