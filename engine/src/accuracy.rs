//! Numeric accuracy parameters threaded through every distribution constructor.

use crate::error::{EngineError, Result};
use std::hash::{Hash, Hasher};

/// Controls how near-identical outcomes are coalesced and how many outcomes a
/// distribution may retain.
///
/// Every distribution derived within one computation should carry the same
/// parameters as its ancestors. Equality and hashing compare bit patterns so
/// the parameters can take part in cache keys.
#[derive(Debug, Clone, Copy)]
pub struct AccuracyParameters {
    /// Outcomes within this distance of a group's first outcome are merged
    /// into one outcome at the group's probability-weighted mean. `0.0` merges
    /// only exactly equal outcomes.
    pub coalescing_tolerance: f64,
    /// Outcomes whose probability is at or below this floor are dropped.
    pub probability_floor: f64,
    /// Upper bound on retained outcomes; the closest adjacent pair is merged
    /// until the bound holds.
    pub max_outcomes: Option<usize>,
}

impl AccuracyParameters {
    /// Exact arithmetic: no tolerance, no floor, unbounded support.
    pub const EXACT: AccuracyParameters = AccuracyParameters {
        coalescing_tolerance: 0.0,
        probability_floor: 0.0,
        max_outcomes: None,
    };

    pub fn new(
        coalescing_tolerance: f64,
        probability_floor: f64,
        max_outcomes: Option<usize>,
    ) -> Result<Self> {
        let params = AccuracyParameters { coalescing_tolerance, probability_floor, max_outcomes };
        params.validate()?;
        Ok(params)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.coalescing_tolerance = tolerance;
        self
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.probability_floor = floor;
        self
    }

    pub fn with_max_outcomes(mut self, max: usize) -> Self {
        self.max_outcomes = Some(max);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.coalescing_tolerance.is_finite() || self.coalescing_tolerance < 0.0 {
            return Err(EngineError::InvalidAccuracy(format!(
                "coalescing tolerance {} must be finite and non-negative",
                self.coalescing_tolerance
            )));
        }
        if !(0.0..1.0).contains(&self.probability_floor) {
            return Err(EngineError::InvalidAccuracy(format!(
                "probability floor {} must lie in [0, 1)",
                self.probability_floor
            )));
        }
        if self.max_outcomes == Some(0) {
            return Err(EngineError::InvalidAccuracy("max_outcomes must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for AccuracyParameters {
    fn default() -> Self {
        Self::EXACT
    }
}

impl PartialEq for AccuracyParameters {
    fn eq(&self, other: &Self) -> bool {
        self.coalescing_tolerance.to_bits() == other.coalescing_tolerance.to_bits()
            && self.probability_floor.to_bits() == other.probability_floor.to_bits()
            && self.max_outcomes == other.max_outcomes
    }
}

impl Eq for AccuracyParameters {}

impl Hash for AccuracyParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coalescing_tolerance.to_bits().hash(state);
        self.probability_floor.to_bits().hash(state);
        self.max_outcomes.hash(state);
    }
}
