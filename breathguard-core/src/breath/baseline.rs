//! Adaptive baseline tracking

use crate::stats::WindowResult;

/// Exponentially weighted estimate of the resting mean and noise
///
/// Only stable windows move the baseline. The first one seeds it directly;
/// later ones are blended in with weight `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    mean: f64,
    std: f64,
    alpha: f64,
    seeded: bool,
}

impl Baseline {
    /// Unseeded baseline blending with weight `alpha`
    pub const fn new(alpha: f64) -> Self {
        Self { mean: 0.0, std: 0.0, alpha, seeded: false }
    }

    /// Blend a window in; unstable windows are ignored
    ///
    /// Returns whether the baseline moved.
    pub fn update(&mut self, window: &WindowResult) -> bool {
        if !window.stable {
            return false;
        }

        if self.seeded {
            let keep = 1.0 - self.alpha;
            self.mean = self.alpha * window.mean + keep * self.mean;
            self.std = self.alpha * window.stddev + keep * self.std;
        } else {
            self.mean = window.mean;
            self.std = window.stddev;
            self.seeded = true;
        }
        true
    }

    /// `mean + delta + k_sigma * std`
    pub fn threshold(&self, delta: f64, k_sigma: f64) -> f64 {
        self.mean + delta + k_sigma * self.std
    }

    /// Resting mean, volts
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Resting noise, volts
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Whether a stable window has been seen
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Back to unseeded, keeping `alpha`
    pub fn reset(&mut self) {
        *self = Self::new(self.alpha);
    }
}
