//! Batch runner: the consumer loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::RunnerConfig;
use crate::queue::Consumer;
use crate::sample::Sample;
use crate::traits::BatchProcessor;

use super::StateAction;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The processor returned `Done`
    Completed,
    /// The processor returned `Abort`
    Aborted,
    /// The timeout elapsed (timeout-enabled processors only)
    TimedOut,
    /// The running flag was cleared
    Stopped,
}

/// Outcome of [`BatchRunner::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport<R> {
    /// Result of the final step, or the processor's current result
    pub result: R,
    /// Why the run ended
    pub reason: StopReason,
    /// Non-empty batches processed
    pub batches: u64,
    /// Samples processed
    pub samples: u64,
}

impl<R> RunReport<R> {
    /// Whether the processor finished by itself
    pub fn is_completed(&self) -> bool {
        self.reason == StopReason::Completed
    }
}

/// Drains the ring in batches and drives a processor
///
/// The batch buffer is allocated once, at construction. Each loop pass:
///
/// 1. drain up to `max_batch` samples without blocking
/// 2. nothing drained: sleep `idle_sleep`, then check the timeout
/// 3. otherwise run the processor, call back on an event, stop on `Done` or
///    `Abort`, else sleep `tick_sleep` and check the timeout
///
/// The running flag is checked at the top of every pass.
pub struct BatchRunner<'a, 'r, const N: usize> {
    consumer: &'a mut Consumer<'r, Sample, N>,
    config: RunnerConfig,
    running: &'a AtomicBool,
    batch: Vec<Sample>,
}

impl<'a, 'r, const N: usize> BatchRunner<'a, 'r, N> {
    /// Create a runner over `consumer`; it stops once `running` turns false
    pub fn new(
        consumer: &'a mut Consumer<'r, Sample, N>,
        config: RunnerConfig,
        running: &'a AtomicBool,
    ) -> Self {
        Self {
            consumer,
            config,
            running,
            batch: vec![Sample::default(); config.max_batch.max(1)],
        }
    }

    /// Run `processor` until it finishes, times out or is stopped
    ///
    /// `on_event` receives the processor after every step whose event is not
    /// `ProcessEvent::None`.
    pub fn run<P, F>(&mut self, processor: &mut P, mut on_event: F) -> RunReport<P::Output>
    where
        P: BatchProcessor,
        F: FnMut(&mut P),
    {
        let started = Instant::now();
        let timeout = if P::TIMEOUT_ENABLED {
            Some(self.config.timeout())
        } else {
            None
        };
        let max_batch = self.batch.len();
        let mut batches = 0u64;
        let mut samples = 0u64;

        loop {
            if !self.running.load(Ordering::Acquire) {
                log_info!("runner stopped after {} batches", batches);
                return RunReport {
                    result: processor.result(),
                    reason: StopReason::Stopped,
                    batches,
                    samples,
                };
            }

            let drained = self.consumer.pop_batch(&mut self.batch, max_batch);

            if drained == 0 {
                std::thread::sleep(self.config.idle_sleep());
            } else {
                batches += 1;
                samples += drained as u64;

                let step = processor.on_batch(&self.batch[..drained]);
                if step.event.is_some() {
                    on_event(processor);
                }

                match step.action {
                    StateAction::Done => {
                        log_info!("processor done after {} batches", batches);
                        return RunReport {
                            result: step.result,
                            reason: StopReason::Completed,
                            batches,
                            samples,
                        };
                    }
                    StateAction::Abort => {
                        log_info!("processor aborted after {} batches", batches);
                        return RunReport {
                            result: step.result,
                            reason: StopReason::Aborted,
                            batches,
                            samples,
                        };
                    }
                    StateAction::Continue => {}
                }

                std::thread::sleep(self.config.tick_sleep());
            }

            if expired(started, timeout) {
                log_warn!("runner timed out after {} ms", self.config.timeout_ms);
                return RunReport {
                    result: processor.result(),
                    reason: StopReason::TimedOut,
                    batches,
                    samples,
                };
            }
        }
    }
}

fn expired(started: Instant, timeout: Option<Duration>) -> bool {
    timeout.map_or(false, |limit| started.elapsed() >= limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ProcessEvent, StepResult};
    use crate::queue::SampleRing;

    struct Collect<const TIMEOUT: bool> {
        seen: Vec<u64>,
        done_after: usize,
    }

    impl<const TIMEOUT: bool> BatchProcessor for Collect<TIMEOUT> {
        type Output = usize;
        const TIMEOUT_ENABLED: bool = TIMEOUT;

        fn on_batch(&mut self, samples: &[Sample]) -> StepResult<usize> {
            self.seen.extend(samples.iter().map(|s| s.timestamp_us));
            let mut step = StepResult::new(self.seen.len()).with_event(ProcessEvent::Analyzed);
            if self.seen.len() >= self.done_after {
                step.action = StateAction::Done;
            }
            step
        }

        fn result(&self) -> usize {
            self.seen.len()
        }
    }

    /// Aborts on its `abort_on`-th batch
    struct AbortOn {
        batches: usize,
        abort_on: usize,
    }

    impl BatchProcessor for AbortOn {
        type Output = usize;
        const TIMEOUT_ENABLED: bool = true;

        fn on_batch(&mut self, _samples: &[Sample]) -> StepResult<usize> {
            self.batches += 1;
            let mut step = StepResult::new(self.batches);
            if self.batches == self.abort_on {
                step.action = StateAction::Abort;
            }
            step
        }

        fn result(&self) -> usize {
            self.batches
        }
    }

    fn fast() -> RunnerConfig {
        RunnerConfig::default()
            .with_idle_sleep_ms(1)
            .with_tick_sleep_ms(0)
            .with_max_batch(4)
            .with_timeout_ms(30)
    }

    #[test]
    fn batches_in_order_until_done() {
        let mut ring = SampleRing::<Sample, 32>::new();
        let (mut producer, mut consumer) = ring.split();
        for t in 0..10 {
            producer.push(Sample::new(t, 0, 0.0));
        }

        let running = AtomicBool::new(true);
        let mut runner = BatchRunner::new(&mut consumer, fast(), &running);
        let mut processor = Collect::<true> { seen: Vec::new(), done_after: 10 };
        let mut calls = 0;

        let report = runner.run(&mut processor, |_| calls += 1);

        assert_eq!(report.reason, StopReason::Completed);
        assert_eq!(report.result, 10);
        assert_eq!(report.batches, 3);
        assert_eq!(calls, 3);
        assert_eq!(processor.seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn idle_run_times_out() {
        let mut ring = SampleRing::<Sample, 8>::new();
        let (_producer, mut consumer) = ring.split();
        let running = AtomicBool::new(true);
        let mut runner = BatchRunner::new(&mut consumer, fast(), &running);
        let mut processor = Collect::<true> { seen: Vec::new(), done_after: 1 };

        let started = Instant::now();
        let report = runner.run(&mut processor, |_| {});
        assert_eq!(report.reason, StopReason::TimedOut);
        assert_eq!(report.batches, 0);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cleared_flag_stops_untimed_processor() {
        let mut ring = SampleRing::<Sample, 8>::new();
        let (_producer, mut consumer) = ring.split();
        let running = AtomicBool::new(true);
        let mut processor = Collect::<false> { seen: Vec::new(), done_after: usize::MAX };

        let report = std::thread::scope(|s| {
            s.spawn(|| {
                std::thread::sleep(Duration::from_millis(60));
                running.store(false, Ordering::Release);
            });
            let mut runner = BatchRunner::new(&mut consumer, fast(), &running);
            runner.run(&mut processor, |_| {})
        });

        // Timeout is 30 ms but this processor ignores it
        assert_eq!(report.reason, StopReason::Stopped);
    }

    #[test]
    fn abort_ends_run_on_that_batch() {
        let mut ring = SampleRing::<Sample, 32>::new();
        let (mut producer, mut consumer) = ring.split();
        for t in 0..20 {
            producer.push(Sample::new(t, 0, 0.0));
        }

        let running = AtomicBool::new(true);
        let mut runner = BatchRunner::new(&mut consumer, fast(), &running);
        let mut processor = AbortOn { batches: 0, abort_on: 3 };
        let mut calls = 0;

        let report = runner.run(&mut processor, |_| calls += 1);

        assert_eq!(report.reason, StopReason::Aborted);
        assert_eq!(report.result, 3);
        assert_eq!(report.batches, 3);
        assert_eq!(report.samples, 12);
        // No event was raised
        assert_eq!(calls, 0);
    }

    #[test]
    fn busy_run_times_out_between_batches() {
        let mut ring = SampleRing::<Sample, 128>::new();
        let (mut producer, mut consumer) = ring.split();
        // Far more than the run can drain, so no pass ever finds the ring empty
        for t in 0..120 {
            producer.push(Sample::new(t, 0, 0.0));
        }

        let config = fast().with_tick_sleep_ms(5);
        let running = AtomicBool::new(true);
        let mut runner = BatchRunner::new(&mut consumer, config, &running);
        let mut processor = Collect::<true> { seen: Vec::new(), done_after: usize::MAX };

        let started = Instant::now();
        let report = runner.run(&mut processor, |_| {});

        assert_eq!(report.reason, StopReason::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(report.batches > 0);
        // Every pass drained a full batch
        assert_eq!(report.samples, report.batches * 4);
        assert!(report.samples < 120);
        assert_eq!(report.result, processor.seen.len());
    }
}
