//! Welford running mean and variance

/// Streaming mean and variance accumulator
///
/// ```rust
/// use breathguard_core::stats::RunningStats;
///
/// let mut stats = RunningStats::new();
/// for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     stats.push(x);
/// }
/// assert_eq!(stats.mean(), 5.0);
/// assert!((stats.variance() - 32.0 / 7.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    /// Empty accumulator
    pub const fn new() -> Self {
        Self { count: 0, mean: 0.0, m2: 0.0 }
    }

    /// Add one observation
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Forget every observation
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Number of observations
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether nothing was pushed since the last reset
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean, or 0 when empty
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance (`n - 1` denominator), 0 below two observations
    pub fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    /// Sample standard deviation
    pub fn stddev(&self) -> f64 {
        libm::sqrt(self.variance())
    }
}
