//! Batch Processor Trait
//!
//! A processor receives every drained batch in order and answers with a
//! [`StepResult`]: keep going, finish, or abort, plus an optional event for
//! the runner's callback.
//!
//! ```text
//! BatchRunner ──on_batch(&[Sample])──→ Processor
//!      ↑                                   │
//!      └──── StepResult { action, event } ─┘
//! ```
//!
//! ## Timeouts
//!
//! Whether the runner enforces its timeout is a property of the processor
//! type, not of a single call. A calibration processor hunting for one stable
//! value wants to give up eventually; a breath monitor must run until stopped.
//! The runner reads [`BatchProcessor::TIMEOUT_ENABLED`] once per run.

use crate::pipeline::StepResult;
use crate::sample::Sample;

/// Processor driven by the batch runner
///
/// ## Example
///
/// ```rust
/// use breathguard_core::traits::BatchProcessor;
/// use breathguard_core::pipeline::{StateAction, StepResult};
/// use breathguard_core::sample::Sample;
///
/// #[derive(Default)]
/// struct Counter {
///     seen: usize,
/// }
///
/// impl BatchProcessor for Counter {
///     type Output = usize;
///     const TIMEOUT_ENABLED: bool = false;
///
///     fn on_batch(&mut self, samples: &[Sample]) -> StepResult<usize> {
///         self.seen += samples.len();
///         let mut step = StepResult::new(self.seen);
///         if self.seen >= 1_000 {
///             step.action = StateAction::Done;
///         }
///         step
///     }
///
///     fn result(&self) -> usize {
///         self.seen
///     }
/// }
/// ```
pub trait BatchProcessor {
    /// Result handed back when the run ends
    type Output;

    /// Whether the runner's configured timeout applies to this processor
    const TIMEOUT_ENABLED: bool = true;

    /// Process one non-empty batch of samples, oldest first
    fn on_batch(&mut self, samples: &[Sample]) -> StepResult<Self::Output>;

    /// Best result known so far
    fn result(&self) -> Self::Output;
}
