//! Time management for the sampling pipeline
//!
//! Every timestamp in the pipeline is a monotonic microsecond count taken on
//! the sampling thread. Wall clock time never enters the data path: windows
//! and breath durations are measured between sample timestamps only.
//!
//! - [`MonotonicClock`]: microseconds since the clock was created (std)
//! - [`MockTimeSource`]: shared, manually advanced clock for tests (std)
//! - [`FixedStepSchedule`]: drift-free deadline accumulator for the sampler

pub use crate::traits::TimeSource;

/// Timestamp in microseconds on a monotonic clock
pub type Timestamp = u64;

/// Monotonic clock counting microseconds from its creation
///
/// Copies share the same origin, so the sampler and any observer agree on
/// what `0` means.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start a clock at zero now
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_micros() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_us(&self) -> u32 {
        1
    }
}

/// Manually advanced clock for tests
///
/// Clones share the same counter, so a test can keep one handle while the
/// sampling thread owns another.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct MockTimeSource {
    now_us: std::sync::Arc<core::sync::atomic::AtomicU64>,
    wall_clock: bool,
}

#[cfg(feature = "std")]
impl MockTimeSource {
    /// Create a clock reading `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now_us: std::sync::Arc::new(core::sync::atomic::AtomicU64::new(start)),
            wall_clock: false,
        }
    }

    /// Report as a wall clock, one that may be stepped backwards
    pub fn with_wall_clock(mut self) -> Self {
        self.wall_clock = true;
        self
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, timestamp: Timestamp) {
        self.now_us.store(timestamp, core::sync::atomic::Ordering::Release);
    }

    /// Move forward by `us` microseconds
    pub fn advance(&self, us: u64) {
        self.now_us.fetch_add(us, core::sync::atomic::Ordering::AcqRel);
    }
}

#[cfg(feature = "std")]
impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.now_us.load(core::sync::atomic::Ordering::Acquire)
    }

    fn is_wall_clock(&self) -> bool {
        self.wall_clock
    }

    fn precision_us(&self) -> u32 {
        1
    }
}

/// Fixed-step deadline accumulator
///
/// Deadlines are `start + k * period`, computed by adding the period to the
/// previous deadline. They are never re-based on the current time, so a late
/// tick shortens the following sleep instead of shifting every later tick.
///
/// ```rust
/// use breathguard_core::time::FixedStepSchedule;
///
/// let mut schedule = FixedStepSchedule::new(0, 7_812);
/// assert_eq!(schedule.advance(), 7_812);
/// assert_eq!(schedule.advance(), 15_624);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStepSchedule {
    next_us: Timestamp,
    period_us: u64,
}

impl FixedStepSchedule {
    /// Create a schedule whose first deadline is one period after `start_us`
    pub const fn new(start_us: Timestamp, period_us: u64) -> Self {
        Self { next_us: start_us, period_us }
    }

    /// Move to the next deadline and return it
    pub fn advance(&mut self) -> Timestamp {
        self.next_us = self.next_us.saturating_add(self.period_us);
        self.next_us
    }

    /// Most recently returned deadline (or the start before the first advance)
    pub const fn deadline(&self) -> Timestamp {
        self.next_us
    }

    /// Configured period in microseconds
    pub const fn period_us(&self) -> u64 {
        self.period_us
    }
}
