//! Upper-tail truncation and reward-perception alterers
//!
//! A risk-averse observer discounts the most favourable outcomes: the top
//! `proba_removed` of the probability mass is discarded and the remainder is
//! renormalized, giving the conditional distribution of the lower quantile.

use crate::accuracy::AccuracyParameters;
use crate::distribution::DiscreteDistribution;
use crate::error::{EngineError, Result};
use crate::reward::RewardDistribution;

/// Conditional distribution of the lower `1 - proba_removed` quantile.
///
/// Outcomes are scanned in ascending order; the outcome that crosses the
/// retained mass is clipped to reach it exactly and every larger outcome is
/// discarded. `proba_removed` must lie in `[0, 1)`.
pub fn truncate_upper_tail(
    distribution: &RewardDistribution,
    proba_removed: f64,
    params: &AccuracyParameters,
) -> Result<RewardDistribution> {
    if !(0.0..1.0).contains(&proba_removed) {
        return Err(EngineError::InvalidSkew(proba_removed));
    }
    let to_preserve = 1.0 - proba_removed;
    let scaling = 1.0 / to_preserve;

    let mut covered = 0.0;
    let mut retained = Vec::with_capacity(distribution.len());
    for &(reward, probability) in distribution.support() {
        let over = probability + covered > to_preserve;
        let kept = if over { to_preserve - covered } else { probability };
        covered += kept;
        retained.push((reward, kept * scaling));
        if over {
            break;
        }
    }
    RewardDistribution::from_pairs(retained, params)
}

/// How a reward distribution is perceived when actions are compared.
///
/// Alterations apply once to the final cumulative distribution, never per step.
pub trait RewardAlterer: Send + Sync {
    fn altered(&self, distribution: &RewardDistribution) -> Result<RewardDistribution>;
}

/// Perceives distributions as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAlteration;

impl RewardAlterer for NoAlteration {
    fn altered(&self, distribution: &RewardDistribution) -> Result<RewardDistribution> {
        Ok(distribution.clone())
    }
}

/// Perceives distributions with their best `proba_removed` mass discarded.
#[derive(Debug, Clone, Copy)]
pub struct UpperTailTruncation {
    proba_removed: f64,
    params: AccuracyParameters,
}

impl UpperTailTruncation {
    pub fn new(proba_removed: f64, params: AccuracyParameters) -> Result<Self> {
        if !(0.0..1.0).contains(&proba_removed) {
            return Err(EngineError::InvalidSkew(proba_removed));
        }
        Ok(UpperTailTruncation { proba_removed, params })
    }

    pub fn proba_removed(&self) -> f64 {
        self.proba_removed
    }
}

impl RewardAlterer for UpperTailTruncation {
    fn altered(&self, distribution: &RewardDistribution) -> Result<RewardDistribution> {
        truncate_upper_tail(distribution, self.proba_removed, &self.params)
    }
}

/// Alterer selected by a skew fraction: `0.0` keeps perception unchanged.
pub fn alterer_for_skew(skew: f64, params: AccuracyParameters) -> Result<Box<dyn RewardAlterer>> {
    if skew == 0.0 {
        Ok(Box::new(NoAlteration))
    } else {
        Ok(Box::new(UpperTailTruncation::new(skew, params)?))
    }
}
