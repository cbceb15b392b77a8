//! EMA (Exponential Moving Average) burst prediction

use crate::scheduler::config::DEFAULT_BURST_WEIGHT;

/// Burst-time predictor
///
/// `next = weight * observed + (1 - weight) * previous`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstPredictor {
    weight: f64,
}

impl BurstPredictor {
    pub const fn new(weight: f64) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Fold an observed burst into the previous estimate
    pub fn predict(&self, previous: f64, observed: u64) -> f64 {
        self.weight * observed as f64 + (1.0 - self.weight) * previous
    }
}

impl Default for BurstPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_BURST_WEIGHT)
    }
}
