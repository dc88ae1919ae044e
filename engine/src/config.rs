//! Evaluator configuration.

use crate::accuracy::AccuracyParameters;
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::{EngineError, Result};

/// Settings shared by every query of a [`crate::evaluator::DistributionalEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorConfig {
    /// Accuracy applied to every distribution built during evaluation.
    pub accuracy: AccuracyParameters,
    /// Number of per-policy value functions kept in the cache.
    pub cache_capacity: usize,
    /// Default fraction of best-outcome mass removed by skewed queries.
    pub skew: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            accuracy: AccuracyParameters::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            skew: 0.0,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_accuracy(mut self, accuracy: AccuracyParameters) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_skew(mut self, skew: f64) -> Self {
        self.skew = skew;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.accuracy.validate()?;
        if self.cache_capacity == 0 {
            return Err(EngineError::InvalidConfig("cache_capacity must be at least 1".to_string()));
        }
        if !(0.0..1.0).contains(&self.skew) {
            return Err(EngineError::InvalidSkew(self.skew));
        }
        Ok(())
    }
}
