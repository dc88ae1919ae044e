//! Reward distributions and their algebra: unit, shift, mixture, average
//!
//! A `RewardDistribution` is the value type propagated by distributional
//! backward induction. All operations construct fresh values; equality and
//! hashing look only at the contained mapping so that duplicates coalesce by
//! value when distributions are used as set members or cache keys.

use crate::accuracy::AccuracyParameters;
use crate::distribution::{DiscreteDistribution, Distribution};
use crate::error::{EngineError, Result};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Distribution of cumulative reward, tagged with the accuracy parameters
/// used to build it.
#[derive(Debug, Clone)]
pub struct RewardDistribution {
    distr: Distribution,
    params: AccuracyParameters,
}

impl RewardDistribution {
    /// Degenerate distribution: `value` with probability 1.
    pub fn unit(value: f64, params: &AccuracyParameters) -> Result<Self> {
        Ok(RewardDistribution { distr: Distribution::point(value)?, params: *params })
    }

    /// Build from `(outcome, probability)` pairs.
    pub fn from_pairs<I>(pairs: I, params: &AccuracyParameters) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Ok(RewardDistribution { distr: Distribution::from_pairs(pairs, params)?, params: *params })
    }

    /// Move every outcome by `scalar`, keeping its probability.
    ///
    /// Outcomes that land on the same value after the shift are summed;
    /// near-coincident ones merge only under a positive coalescing tolerance.
    pub fn shift(&self, scalar: f64, params: &AccuracyParameters) -> Result<Self> {
        if !scalar.is_finite() {
            return Err(EngineError::NonFiniteOutcome(scalar));
        }
        Self::from_pairs(self.distr.support().iter().map(|&(x, p)| (x + scalar, p)), params)
    }

    /// Weighted sum of the branch probability mass functions.
    ///
    /// Weights are renormalized by their total, so a single branch of any
    /// positive weight reduces to that branch.
    pub fn mixture<'a, I>(branches: I, params: &AccuracyParameters) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a RewardDistribution, f64)>,
    {
        let branches: Vec<(&RewardDistribution, f64)> = branches.into_iter().collect();
        if branches.is_empty() {
            return Err(EngineError::EmptyMixture);
        }
        let total: f64 = branches.iter().map(|&(_, w)| w).sum();
        let bad_weight = branches.iter().any(|&(_, w)| !w.is_finite() || w < 0.0);
        if bad_weight || !total.is_finite() || total <= 0.0 {
            return Err(EngineError::InvalidWeights(total));
        }
        let pairs = branches.iter().flat_map(|&(branch, w)| {
            let scale = w / total;
            branch.distr.support().iter().map(move |&(x, p)| (x, p * scale))
        });
        Self::from_pairs(pairs, params)
    }

    /// `Σ outcome · probability`.
    pub fn average_reward(&self) -> f64 {
        self.distr.mean()
    }

    pub fn precision_parameters(&self) -> &AccuracyParameters {
        &self.params
    }

    pub fn variance(&self) -> f64 {
        let mean = self.average_reward();
        self.distr.support().iter().map(|&(x, p)| p * (x - mean) * (x - mean)).sum()
    }

    /// Smallest outcome whose cumulative probability reaches `level`.
    pub fn quantile(&self, level: f64) -> f64 {
        let target = level.clamp(0.0, 1.0);
        self.cumulative()
            .into_iter()
            .find(|&(_, c)| c >= target - 1e-12)
            .map(|(x, _)| x)
            .unwrap_or_else(|| self.support_max())
    }

    /// Cumulative coordinates `(value,cumulativeProbability)...` in ascending
    /// order, for external plotting.
    pub fn to_cumulative_coordinates(&self) -> String {
        self.cumulative().iter().map(|(x, c)| format!("({},{})", x, c)).collect()
    }
}

impl DiscreteDistribution for RewardDistribution {
    fn support(&self) -> &[(f64, f64)] {
        self.distr.support()
    }
}

impl PartialEq for RewardDistribution {
    fn eq(&self, other: &Self) -> bool {
        self.distr == other.distr
    }
}

impl Eq for RewardDistribution {}

impl Hash for RewardDistribution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.distr.hash(state);
    }
}

/// Human-readable form: `value->probability` pairs, ascending by value.
impl fmt::Display for RewardDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (x, p)) in self.support().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}->{}", x, p)?;
        }
        Ok(())
    }
}
