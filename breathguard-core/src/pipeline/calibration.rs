//! Calibration processor: find the first stable window

use crate::config::WindowConfig;
use crate::sample::Sample;
use crate::stats::{WindowAnalyzer, WindowResult};
use crate::traits::BatchProcessor;

use super::{ProcessEvent, StateAction, StepResult};

/// Runs window statistics on the raw signal until a window is stable
///
/// Finishes with `Done` on the first stable window. The runner's timeout
/// applies, so an unsettled sensor ends the run with the last window seen.
#[derive(Debug, Clone)]
pub struct CalibrationProcessor {
    analyzer: WindowAnalyzer,
    last: Option<WindowResult>,
}

impl CalibrationProcessor {
    /// Create a processor with a fresh analyzer
    pub fn new(config: WindowConfig) -> Self {
        Self {
            analyzer: WindowAnalyzer::new(config),
            last: None,
        }
    }

    /// Most recent finalized window
    pub fn last_window(&self) -> Option<&WindowResult> {
        self.last.as_ref()
    }

    /// Whether the run found a stable window
    pub fn is_stable(&self) -> bool {
        self.last.map_or(false, |w| w.stable)
    }
}

impl BatchProcessor for CalibrationProcessor {
    type Output = Option<WindowResult>;

    const TIMEOUT_ENABLED: bool = true;

    fn on_batch(&mut self, samples: &[Sample]) -> StepResult<Self::Output> {
        let Some(window) = self.analyzer.analyze_batch(samples, Sample::volts) else {
            return StepResult::new(self.last);
        };

        self.last = Some(window);
        log_info!(
            "calibration window: mean {:.6} V, stddev {:.6} V, drift {:.6} V/s, streak {}",
            window.mean,
            window.stddev,
            window.drift_per_sec,
            self.analyzer.streak()
        );

        let mut step = StepResult::new(self.last).with_event(ProcessEvent::Analyzed);
        if window.stable {
            log_info!("stable value found: {:.6} V", window.mean);
            step.action = StateAction::Done;
        }
        step
    }

    fn result(&self) -> Self::Output {
        self.last
    }
}
