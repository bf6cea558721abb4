//! Simulated Sample Sources
//!
//! Hardware-free [`SampleSource`]s for the example, the integration tests and
//! the benches.
//!
//! - [`FnSource`]: wraps a closure
//! - [`SimulatedSensor`]: a resting MQ-3 signal with deterministic noise and
//!   scripted breaths
//!
//! The simulated sensor keeps its own notion of time, one sample period per
//! `acquire` call, so its output does not depend on how fast it is polled.
//!
//! ```rust
//! use breathguard_core::sim::{BreathProfile, SimulatedSensor};
//! use breathguard_core::traits::SampleSource;
//!
//! let mut sensor = SimulatedSensor::new(1.0)
//!     .with_sample_rate_hz(100)
//!     .with_breath(BreathProfile::new(1_000_000, 0.3));
//!
//! let first = sensor.acquire().unwrap();
//! assert_eq!(first.value, 1.0);
//! ```

use core::convert::Infallible;

use crate::constants::sampling;
use crate::mq3::volts_to_ads1115;
use crate::sample::RawReading;
use crate::traits::SampleSource;

/// Closure-backed source
pub struct FnSource<F>(F);

impl<F> FnSource<F> {
    /// Wrap `f`; every `acquire` calls it once
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F, E> SampleSource for FnSource<F>
where
    F: FnMut() -> nb::Result<RawReading, E>,
    E: core::fmt::Debug,
{
    type Error = E;

    fn acquire(&mut self) -> nb::Result<RawReading, Self::Error> {
        (self.0)()
    }
}

impl<F> core::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnSource")
    }
}

/// Trapezoidal breath on top of the resting signal
///
/// ```text
///            hold
///          ┌──────┐  ← amplitude
///   rise  /        \  fall
/// ───────┘          └──────
///        ↑ start
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathProfile {
    /// Simulated time the rise begins
    pub start_us: u64,
    /// Rise length
    pub rise_us: u64,
    /// Plateau length
    pub hold_us: u64,
    /// Fall length
    pub fall_us: u64,
    /// Height above the resting level (volts)
    pub amplitude_v: f64,
}

impl BreathProfile {
    /// 0.5 s rise, 2 s hold, 1 s fall starting at `start_us`
    pub fn new(start_us: u64, amplitude_v: f64) -> Self {
        Self {
            start_us,
            rise_us: 500_000,
            hold_us: 2_000_000,
            fall_us: 1_000_000,
            amplitude_v,
        }
    }

    /// Set the rise, plateau and fall lengths
    pub fn with_shape(mut self, rise_us: u64, hold_us: u64, fall_us: u64) -> Self {
        self.rise_us = rise_us;
        self.hold_us = hold_us;
        self.fall_us = fall_us;
        self
    }

    /// Time the signal is back at rest
    pub fn end_us(&self) -> u64 {
        self.start_us + self.rise_us + self.hold_us + self.fall_us
    }

    /// Offset above rest at simulated time `t_us`
    pub fn offset_at(&self, t_us: u64) -> f64 {
        if t_us < self.start_us || t_us >= self.end_us() {
            return 0.0;
        }
        let t = t_us - self.start_us;
        if t < self.rise_us {
            return self.amplitude_v * t as f64 / self.rise_us as f64;
        }
        let t = t - self.rise_us;
        if t < self.hold_us {
            return self.amplitude_v;
        }
        let t = t - self.hold_us;
        self.amplitude_v * (1.0 - t as f64 / self.fall_us as f64)
    }
}

/// Deterministic simulated MQ-3 at the ADC pin
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    baseline_v: f64,
    noise_v: f64,
    period_us: u64,
    tick: u64,
    rng: u64,
    dropout_every: u64,
    breaths: Vec<BreathProfile>,
}

impl SimulatedSensor {
    /// Noise-free sensor resting at `baseline_v`, sampled at the default rate
    pub fn new(baseline_v: f64) -> Self {
        Self {
            baseline_v,
            noise_v: 0.0,
            period_us: sampling::DEFAULT_SAMPLE_PERIOD_US,
            tick: 0,
            rng: 0x9E37_79B9_7F4A_7C15,
            dropout_every: 0,
            breaths: Vec::new(),
        }
    }

    /// Simulated rate; sets how far simulated time moves per `acquire`
    pub fn with_sample_rate_hz(mut self, hz: u32) -> Self {
        self.period_us = 1_000_000 / u64::from(hz.max(1));
        self
    }

    /// Uniform noise in `[-noise_v, noise_v]`
    pub fn with_noise(mut self, noise_v: f64, seed: u64) -> Self {
        self.noise_v = noise_v;
        self.rng = seed | 1;
        self
    }

    /// Add a scripted breath
    pub fn with_breath(mut self, profile: BreathProfile) -> Self {
        self.breaths.push(profile);
        self
    }

    /// Report `WouldBlock` on every `every`-th call (0 disables)
    pub fn with_dropout(mut self, every: u64) -> Self {
        self.dropout_every = every;
        self
    }

    /// Simulated time of the next reading
    pub fn now_us(&self) -> u64 {
        self.tick * self.period_us
    }

    /// Noise-free value at simulated time `t_us`
    pub fn level_at(&self, t_us: u64) -> f64 {
        self.baseline_v + self.breaths.iter().map(|b| b.offset_at(t_us)).sum::<f64>()
    }

    fn next_noise(&mut self) -> f64 {
        if self.noise_v == 0.0 {
            return 0.0;
        }
        // xorshift64
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng = x;
        let unit = (x >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * self.noise_v
    }
}

impl SampleSource for SimulatedSensor {
    type Error = Infallible;

    fn acquire(&mut self) -> nb::Result<RawReading, Self::Error> {
        let t_us = self.now_us();
        self.tick += 1;

        if self.dropout_every != 0 && self.tick % self.dropout_every == 0 {
            return Err(nb::Error::WouldBlock);
        }

        let volts = self.level_at(t_us) + self.next_noise();
        Ok(RawReading::new(volts_to_ads1115(volts), volts as f32))
    }
}
