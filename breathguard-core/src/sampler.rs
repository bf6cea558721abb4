//! Fixed-Rate Sampling Thread
//!
//! The producer side of a session: one reading per period, stamped and pushed
//! into the ring without ever blocking on the consumer.
//!
//! ```text
//! loop while running:
//!     deadline += period          (never re-based on "now")
//!     acquire ─ ok ──→ stamp ──→ push_overwrite ──→ count drop if overwritten
//!             └ err ─→ skip tick
//!     sleep until deadline
//! ```
//!
//! Deadlines come from a [`FixedStepSchedule`], so a slow acquisition makes
//! the following sleep shorter instead of shifting every later tick. When the
//! ring is full the oldest sample is dropped: the consumer can fall behind,
//! the sampler cannot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

use crate::config::SamplerConfig;
use crate::queue::Producer;
use crate::sample::Sample;
use crate::time::{FixedStepSchedule, Timestamp};
use crate::traits::{SampleSource, TimeSource};

/// Name of the spawned sampling thread
pub const SAMPLER_THREAD_NAME: &str = "breathguard-sampler";

/// Sampling loop over one source and one ring producer
///
/// Runs until `running` turns false. The flag is read at the top of every
/// tick, so a sample is either pushed whole or not at all. Timestamps never
/// decrease, even when a wall clock is stepped backwards.
pub struct Sampler<'r, S, C, const N: usize> {
    producer: Producer<'r, Sample, N>,
    source: S,
    clock: C,
    period_us: u64,
    running: &'r AtomicBool,
    dropped: &'r AtomicU64,
    last_stamp: Option<Timestamp>,
}

impl<'r, S, C, const N: usize> Sampler<'r, S, C, N>
where
    S: SampleSource,
    C: TimeSource,
{
    /// Assemble a sampler; nothing runs until [`run`](Self::run) or
    /// [`spawn`](Self::spawn)
    pub fn new(
        producer: Producer<'r, Sample, N>,
        source: S,
        clock: C,
        config: SamplerConfig,
        running: &'r AtomicBool,
        dropped: &'r AtomicU64,
    ) -> Self {
        Self {
            producer,
            source,
            clock,
            period_us: config.period_us(),
            running,
            dropped,
            last_stamp: None,
        }
    }

    /// Run the loop on the current thread, returning the source when stopped
    pub fn run(mut self) -> S {
        let origin = Instant::now();
        let mut schedule = FixedStepSchedule::new(0, self.period_us);

        log_info!(
            "sampler started: period {} us, clock precision {} us",
            self.period_us,
            self.clock.precision_us()
        );
        if self.clock.is_wall_clock() {
            log_warn!("sampler clock follows wall time; backward steps are held at the last stamp");
        }

        while self.running.load(Ordering::Acquire) {
            let deadline_us = schedule.advance();
            self.tick();

            let deadline = origin + Duration::from_micros(deadline_us);
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }

        log_info!(
            "sampler stopped: {} samples dropped",
            self.dropped.load(Ordering::Relaxed)
        );
        self.source
    }

    fn tick(&mut self) {
        match self.source.acquire() {
            Ok(reading) => {
                let sample = Sample::from_reading(self.stamp(), reading);
                if !self.producer.push_overwrite(sample) {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(nb::Error::WouldBlock) => {
                log_debug!("acquisition not ready, tick skipped");
            }
            Err(nb::Error::Other(err)) => {
                log_debug!("acquisition failed, tick skipped: {:?}", err);
            }
        }
    }

    /// Current timestamp, never earlier than the previous one
    fn stamp(&mut self) -> Timestamp {
        let now = self.clock.now();
        let stamp = match self.last_stamp {
            Some(last) if now < last => {
                log_debug!("clock stepped back {} us", last - now);
                last
            }
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl<'r, S, C, const N: usize> Sampler<'r, S, C, N>
where
    S: SampleSource + Send + 'r,
    C: TimeSource + 'r,
{
    /// Run the loop on a named thread inside `scope`
    ///
    /// The scope joins the thread at the latest when it ends, so the ring
    /// always outlives its producer.
    pub fn spawn<'scope, 'env>(
        self,
        scope: &'scope Scope<'scope, 'env>,
    ) -> std::io::Result<ScopedJoinHandle<'scope, S>>
    where
        'r: 'scope,
    {
        thread::Builder::new()
            .name(SAMPLER_THREAD_NAME.into())
            .spawn_scoped(scope, move || self.run())
    }
}
