//! Sampling and Consumer Pacing Constants
//!
//! Values for the producer side (sample rate, ring capacity) and the consumer
//! side (batch size, idle and tick back-off, calibration timeout).

// ===== ACQUISITION =====

/// Default sample rate (Hz).
///
/// Matches the ADS1115 `SPS_128` data rate used in single-shot mode, so one
/// conversion completes per sampling tick.
///
/// Source: ADS1115 datasheet, data rate table
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 128;

/// Sampling period at the default rate (microseconds).
///
/// Truncated: 1_000_000 / 128 = 7812.5 → 7812. The half microsecond per tick
/// is absorbed by timestamps, which come from the monotonic clock.
pub const DEFAULT_SAMPLE_PERIOD_US: u64 = 1_000_000 / DEFAULT_SAMPLE_RATE_HZ as u64;

// ===== RING BUFFER =====

/// Default sample ring capacity (slots).
///
/// Must be a power of two. One slot is always kept empty, so 4095 samples
/// can be queued: about 32 seconds at 128 Hz before the oldest samples are
/// overwritten.
pub const RING_CAPACITY: usize = 4096;

/// Minimum ring capacity.
///
/// Two slots give a usable capacity of one sample.
pub const MIN_RING_CAPACITY: usize = 2;

// ===== CONSUMER PACING =====

/// Default maximum samples drained per batch.
///
/// 256 samples = 2 seconds at 128 Hz, comfortably more than one tick's
/// worth, so a slow tick catches up in a single drain.
pub const DEFAULT_MAX_BATCH: usize = 256;

/// Upper bound accepted for `max_batch`.
///
/// The batch buffer is allocated once per runner; anything larger than the
/// ring can never be filled.
pub const MAX_BATCH_LIMIT: usize = RING_CAPACITY;

/// Sleep when a drain returned nothing (milliseconds).
pub const DEFAULT_IDLE_SLEEP_MS: u64 = 5;

/// Sleep after each processed batch (milliseconds).
///
/// At 128 Hz this yields batches of roughly 6 samples.
pub const DEFAULT_TICK_SLEEP_MS: u64 = 50;

/// Session timeout for processors that opt in (milliseconds).
///
/// Calibration gives up after one minute and reports its best window.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
