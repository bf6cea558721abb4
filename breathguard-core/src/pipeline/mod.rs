//! Batch Processing Pipeline
//!
//! ## Overview
//!
//! The consumer side of a session. A [`BatchRunner`] drains the ring in
//! batches and hands each one to a [`BatchProcessor`](crate::traits::BatchProcessor).
//! Two processors ship with the crate:
//!
//! ```text
//! Ring → BatchRunner ─┬→ CalibrationProcessor → WindowAnalyzer          (until stable)
//!                     └→ BreathProcessor      → WindowAnalyzer → BreathDetector (until stopped)
//! ```
//!
//! ## Step Protocol
//!
//! Every batch produces a [`StepResult`]: an action telling the runner whether
//! to continue, an optional [`ProcessEvent`] that triggers the caller's
//! callback, and the processor's result at that point.
//!
//! ## Module Organization
//!
//! - Step types (this file)
//! - `calibration` - stability search on the raw signal
//! - `runtime` - continuous breath monitoring
//! - `runner` - the batch loop (std)

mod calibration;
mod runtime;

#[cfg(feature = "std")]
mod runner;

pub use calibration::CalibrationProcessor;
pub use runtime::BreathProcessor;

#[cfg(feature = "std")]
pub use runner::{BatchRunner, RunReport, StopReason};

use crate::breath::BreathState;

/// What the runner should do after a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateAction {
    /// Keep draining
    #[default]
    Continue,
    /// Finished successfully
    Done,
    /// Give up
    Abort,
}

impl StateAction {
    /// Whether the runner must stop
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Notable outcome of a batch, forwarded to the caller's callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessEvent {
    /// Nothing worth reporting
    #[default]
    None,
    /// A window was finalized while warming up
    Warmup,
    /// A window was finalized while armed
    Ready,
    /// A window was finalized during a breath
    Processing,
    /// A window was finalized while settling after a breath
    Cooldown,
    /// A breath or a calibration result is ready to collect
    Analyzed,
}

impl ProcessEvent {
    /// Whether the callback should run
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl From<BreathState> for ProcessEvent {
    fn from(state: BreathState) -> Self {
        match state {
            BreathState::Warmup => Self::Warmup,
            BreathState::Ready => Self::Ready,
            BreathState::Processing => Self::Processing,
            BreathState::Cooldown => Self::Cooldown,
            BreathState::Analyzed => Self::Analyzed,
        }
    }
}

/// Outcome of one batch
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult<R> {
    /// Continue, finish or abort
    pub action: StateAction,
    /// Event for the callback, `None` for no call
    pub event: ProcessEvent,
    /// Processor result after this batch
    pub result: R,
}

impl<R> StepResult<R> {
    /// `Continue` with no event
    pub fn new(result: R) -> Self {
        Self {
            action: StateAction::Continue,
            event: ProcessEvent::None,
            result,
        }
    }

    /// Set the action
    pub fn with_action(mut self, action: StateAction) -> Self {
        self.action = action;
        self
    }

    /// Set the event
    pub fn with_event(mut self, event: ProcessEvent) -> Self {
        self.event = event;
        self
    }
}
