//! Time Source Abstraction
//!
//! The sampling thread stamps every reading through a [`TimeSource`]. The
//! statistics engine and the breath detector only ever compare those stamps,
//! so swapping the clock changes nothing downstream.
//!
//! ## Implementation Requirements
//!
//! - `now()` is called from the sampling thread, hence `Send`
//! - Values must never decrease; windows assume non-decreasing timestamps
//! - Wall clock sources are unsuitable: an NTP step would split or merge windows

use crate::time::Timestamp;

/// Source of sample timestamps
///
/// ## Example Implementation
///
/// ```rust
/// use breathguard_core::traits::TimeSource;
/// use breathguard_core::time::Timestamp;
///
/// struct TickCounter {
///     ticks: u64,
///     us_per_tick: u64,
/// }
///
/// impl TimeSource for TickCounter {
///     fn now(&self) -> Timestamp {
///         self.ticks * self.us_per_tick
///     }
///
///     fn is_wall_clock(&self) -> bool {
///         false
///     }
///
///     fn precision_us(&self) -> u32 {
///         self.us_per_tick as u32
///     }
/// }
/// ```
pub trait TimeSource: Send {
    /// Current timestamp in microseconds
    fn now(&self) -> Timestamp;

    /// Whether this source follows wall clock time (and may jump)
    fn is_wall_clock(&self) -> bool;

    /// Smallest difference this source can measure, in microseconds
    fn precision_us(&self) -> u32;
}
