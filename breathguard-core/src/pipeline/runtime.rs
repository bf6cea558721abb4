//! Runtime processor: continuous breath monitoring

use heapless::Deque;

use crate::breath::{BreathDetector, BreathEvent, BreathResult, BreathState};
use crate::config::{BreathConfig, WindowConfig};
use crate::constants::breath::PENDING_BREATH_EVENTS;
use crate::sample::Sample;
use crate::stats::WindowAnalyzer;
use crate::traits::BatchProcessor;

use super::{ProcessEvent, StepResult};

/// Window statistics feeding the breath detector
///
/// Every finalized window reaches the detector, including several closed by
/// one batch. The processor never finishes on its own and ignores the
/// runner's timeout; stop it through the session.
///
/// The step event is `Analyzed` when the batch completed a breath, otherwise
/// the detector state after the batch's last window, or `None` when the batch
/// closed no window. Every completed breath is queued, so a batch that
/// finishes several of them reports each one; when the queue is full the
/// oldest is dropped.
#[derive(Debug, Clone)]
pub struct BreathProcessor {
    analyzer: WindowAnalyzer,
    detector: BreathDetector,
    pending: Deque<BreathEvent, PENDING_BREATH_EVENTS>,
    breaths: u32,
}

impl BreathProcessor {
    /// Create a processor in `Warmup`
    pub fn new(window: WindowConfig, breath: BreathConfig) -> Self {
        Self {
            analyzer: WindowAnalyzer::new(window),
            detector: BreathDetector::new(breath),
            pending: Deque::new(),
            breaths: 0,
        }
    }

    /// Take the oldest completed breath not yet collected
    pub fn pop_breath_event(&mut self) -> Option<BreathEvent> {
        self.pending.pop_front()
    }

    /// Detector state
    pub fn state(&self) -> BreathState {
        self.detector.state()
    }

    /// Breaths completed since creation
    pub fn breaths(&self) -> u32 {
        self.breaths
    }

    /// Underlying detector
    pub fn detector(&self) -> &BreathDetector {
        &self.detector
    }
}

impl BatchProcessor for BreathProcessor {
    type Output = BreathResult;

    const TIMEOUT_ENABLED: bool = false;

    fn on_batch(&mut self, samples: &[Sample]) -> StepResult<Self::Output> {
        let detector = &mut self.detector;
        let pending = &mut self.pending;
        let breaths = &mut self.breaths;
        let mut windows = 0usize;
        let mut produced = false;

        for sample in samples {
            self.analyzer.push(sample.timestamp_us, sample.volts(), |window| {
                windows += 1;
                if !detector.on_window(&window) {
                    return;
                }
                let Some(event) = detector.take_event() else {
                    return;
                };
                if pending.is_full() {
                    pending.pop_front();
                    log_warn!("breath queue full, oldest breath dropped");
                }
                let _ = pending.push_back(event);
                *breaths += 1;
                produced = true;
            });
        }

        let event = if produced {
            ProcessEvent::Analyzed
        } else if windows > 0 {
            ProcessEvent::from(self.detector.state())
        } else {
            ProcessEvent::None
        };

        StepResult::new(self.detector.result()).with_event(event)
    }

    fn result(&self) -> Self::Output {
        self.detector.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> BreathProcessor {
        let window = WindowConfig::default()
            .with_window_us(100_000)
            .with_min_samples(5)
            .with_required_stable_windows(1);
        let breath = BreathConfig::default()
            .with_warmup_stable_windows(2)
            .with_cooldown_stable_windows(2)
            .with_blow_time_us(150_000, 2_000_000);
        BreathProcessor::new(window, breath)
    }

    /// 10 ms spacing, ten samples per window
    fn samples(from_us: u64, count: u64, value: f32) -> Vec<Sample> {
        (0..count).map(|i| Sample::new(from_us + i * 10_000, 0, value)).collect()
    }

    #[test]
    fn no_window_no_event() {
        let mut processor = processor();
        let step = processor.on_batch(&samples(0, 5, 1.0));
        assert_eq!(step.event, ProcessEvent::None);
        assert_eq!(processor.state(), BreathState::Warmup);
    }

    #[test]
    fn breath_surfaces_once() {
        let mut processor = processor();
        // Three calm windows: two to warm up, the third closes in Ready
        let step = processor.on_batch(&samples(0, 31, 1.0));
        assert_eq!(step.event, ProcessEvent::Ready);

        let step = processor.on_batch(&samples(310_000, 30, 1.3));
        assert_eq!(step.event, ProcessEvent::Processing);

        let step = processor.on_batch(&samples(610_000, 20, 1.0));
        assert_eq!(step.event, ProcessEvent::Analyzed);
        assert_eq!(processor.breaths(), 1);

        let event = processor.pop_breath_event().unwrap();
        assert_eq!(event.peak_voltage, f64::from(1.3f32));
        assert!(processor.pop_breath_event().is_none());
    }

    #[test]
    fn two_breaths_in_one_batch_are_both_kept() {
        let mut processor = processor();
        let mut trace = samples(0, 30, 1.0);
        trace.extend(samples(300_000, 30, 1.3));
        trace.extend(samples(600_000, 40, 1.0));
        trace.extend(samples(1_000_000, 30, 1.3));
        trace.extend(samples(1_300_000, 30, 1.0));

        let step = processor.on_batch(&trace);
        assert_eq!(step.event, ProcessEvent::Analyzed);
        assert_eq!(processor.breaths(), 2);

        let first = processor.pop_breath_event().unwrap();
        let second = processor.pop_breath_event().unwrap();
        assert_eq!(first.start_us, 300_000);
        assert_eq!(first.end_us, 700_000);
        assert_eq!(second.start_us, 1_000_000);
        assert_eq!(second.end_us, 1_400_000);
        assert!(processor.pop_breath_event().is_none());
    }

    #[test]
    fn timeout_is_disabled() {
        assert!(!<BreathProcessor as BatchProcessor>::TIMEOUT_ENABLED);
    }
}
