//! Windowed Statistics Engine
//!
//! Turns a stream of `(timestamp, value)` pairs into one [`WindowResult`] per
//! fixed-length time window and decides when the signal has settled.
//!
//! ```text
//! samples ──→ RunningStats (Welford, per sample)
//!                 │ window boundary crossed
//!                 ↓
//!             finalize: mean, stddev, drift vs previous window
//!                 ↓
//!             qualifying? ──→ streak ──→ stable once streak >= required
//! ```
//!
//! ## Windows
//!
//! The first sample opens a window at its own timestamp. Every later boundary
//! is exactly one window length after the previous one, so windows are
//! contiguous and never overlap: `end(k) == start(k + 1)`. A gap in the input
//! longer than a window produces empty windows, one per elapsed length, which
//! are reported with `num_samples == 0` and count as unstable.
//!
//! ## Numerical Stability
//!
//! Mean and variance are updated per sample with Welford's recurrence. No sum
//! of squares is ever formed, so a 1 V signal with microvolt noise keeps its
//! precision.

mod welford;
mod window;

pub use welford::RunningStats;
pub use window::{WindowAnalyzer, WindowResult};
