//! Reward-distribution instantiations of the backward-induction driver
//!
//! [`DistributionAlgebra`] propagates one full reward distribution per state
//! under a fixed policy. [`FrontierAlgebra`] propagates the set of
//! non-dominated distributions reachable by any policy, crossing successor
//! candidate sets with the combinatorial merger.

use crate::accuracy::AccuracyParameters;
use crate::backward::BackupAlgebra;
use crate::dominance::non_dominated;
use crate::error::{EngineError, Result};
use crate::merge::{dedup_preserving_order, weighted_merge};
use crate::reward::RewardDistribution;
use std::cmp::Ordering;

/// Unit / shift / mixture binding for policy evaluation.
///
/// Reward distributions have no total order, so [`BackupAlgebra::compare`]
/// always fails: under a fixed policy the driver must never need it.
#[derive(Debug, Clone, Copy)]
pub struct DistributionAlgebra {
    params: AccuracyParameters,
}

impl DistributionAlgebra {
    pub fn new(params: AccuracyParameters) -> Self {
        DistributionAlgebra { params }
    }
}

impl<S, A> BackupAlgebra<S, A> for DistributionAlgebra {
    type Value = RewardDistribution;

    fn initial(&self, _state: &S) -> Result<RewardDistribution> {
        RewardDistribution::unit(0.0, &self.params)
    }

    fn reward_value(&self, reward: f64) -> Result<RewardDistribution> {
        RewardDistribution::unit(reward, &self.params)
    }

    fn add(&self, value: &RewardDistribution, reward: f64) -> Result<RewardDistribution> {
        value.shift(reward, &self.params)
    }

    fn mix(&self, branches: Vec<(&RewardDistribution, f64)>) -> Result<RewardDistribution> {
        RewardDistribution::mixture(branches, &self.params)
    }

    fn compare(&self, _a: &RewardDistribution, _b: &RewardDistribution) -> Result<Ordering> {
        Err(EngineError::ComparatorInvoked)
    }
}

/// Set-valued instantiation: each state holds its non-dominated candidates.
#[derive(Debug, Clone, Copy)]
pub struct FrontierAlgebra {
    params: AccuracyParameters,
}

impl FrontierAlgebra {
    pub fn new(params: AccuracyParameters) -> Self {
        FrontierAlgebra { params }
    }
}

impl<S, A> BackupAlgebra<S, A> for FrontierAlgebra {
    type Value = Vec<RewardDistribution>;

    fn initial(&self, _state: &S) -> Result<Vec<RewardDistribution>> {
        Ok(vec![RewardDistribution::unit(0.0, &self.params)?])
    }

    fn reward_value(&self, reward: f64) -> Result<Vec<RewardDistribution>> {
        Ok(vec![RewardDistribution::unit(reward, &self.params)?])
    }

    fn add(&self, value: &Vec<RewardDistribution>, reward: f64) -> Result<Vec<RewardDistribution>> {
        let shifted = value
            .iter()
            .map(|d| d.shift(reward, &self.params))
            .collect::<Result<Vec<_>>>()?;
        Ok(dedup_preserving_order(shifted))
    }

    fn mix(
        &self,
        branches: Vec<(&Vec<RewardDistribution>, f64)>,
    ) -> Result<Vec<RewardDistribution>> {
        let dimensions: Vec<(Vec<RewardDistribution>, f64)> =
            branches.into_iter().map(|(set, w)| (set.clone(), w)).collect();
        Ok(non_dominated(weighted_merge(&dimensions, 0.0, &self.params)?))
    }

    fn compare(
        &self,
        _a: &Vec<RewardDistribution>,
        _b: &Vec<RewardDistribution>,
    ) -> Result<Ordering> {
        Err(EngineError::ComparatorInvoked)
    }

    fn select(&self, candidates: Vec<Vec<RewardDistribution>>) -> Result<Vec<RewardDistribution>> {
        if candidates.is_empty() {
            return Err(EngineError::NoCandidates);
        }
        Ok(non_dominated(candidates.into_iter().flatten().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backward::backward_induction;
    use crate::distribution::DiscreteDistribution;
    use crate::mdp::{PolicyRestriction, Unrestricted};
    use crate::test_mdp::{build_gamble_mdp, build_two_action_mdp, FixturePolicy, GAMBLE, SAFE};

    fn params() -> AccuracyParameters {
        AccuracyParameters::EXACT
    }

    fn rd(pairs: &[(f64, f64)]) -> RewardDistribution {
        RewardDistribution::from_pairs(pairs.iter().copied(), &params()).unwrap()
    }

    #[test]
    fn test_one_step_policy_value() {
        let mdp = build_two_action_mdp();
        let policy = FixturePolicy::always(1, GAMBLE);
        let algebra = DistributionAlgebra::new(params());
        let vf = backward_induction(&mdp, 1, &algebra, &PolicyRestriction::new(&policy)).unwrap();
        assert_eq!(vf.apply(&0).unwrap(), rd(&[(3.0, 1.0)]));
    }

    #[test]
    fn test_gamble_policy_distribution() {
        let mdp = build_gamble_mdp();
        let policy = FixturePolicy::always(mdp.num_states(), SAFE).with_action(0, GAMBLE);
        let algebra = DistributionAlgebra::new(params());
        let vf = backward_induction(&mdp, 2, &algebra, &PolicyRestriction::new(&policy)).unwrap();
        let d = vf.apply(&0).unwrap();
        assert_eq!(d, rd(&[(0.0, 0.5), (5.0, 0.5)]));
        assert_eq!(vf.apply(&1).unwrap(), rd(&[(5.0, 1.0)]));
    }

    #[test]
    fn test_mixed_policy_mixes_action_distributions() {
        let mdp = build_gamble_mdp();
        let policy = FixturePolicy::always(mdp.num_states(), SAFE)
            .with_mixed(0, &[(SAFE, 0.5), (GAMBLE, 0.5)]);
        let algebra = DistributionAlgebra::new(params());
        let vf = backward_induction(&mdp, 2, &algebra, &PolicyRestriction::new(&policy)).unwrap();
        let d = vf.apply(&0).unwrap();
        assert!((d.probability_of(2.0) - 0.5).abs() < 1e-10);
        assert!((d.probability_of(0.0) - 0.25).abs() < 1e-10);
        assert!((d.probability_of(5.0) - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_comparator_is_a_fatal_sentinel() {
        let mdp = build_gamble_mdp();
        let algebra = DistributionAlgebra::new(params());
        let result = backward_induction(&mdp, 2, &algebra, &Unrestricted);
        assert_eq!(result.err(), Some(EngineError::ComparatorInvoked));
    }

    #[test]
    fn test_frontier_keeps_incomparable_options() {
        let mdp = build_gamble_mdp();
        let algebra = FrontierAlgebra::new(params());
        let vf = backward_induction(&mdp, 2, &algebra, &Unrestricted).unwrap();
        let frontier = vf.apply(&0).unwrap();
        assert_eq!(frontier.len(), 2);
        assert!(frontier.contains(&rd(&[(2.0, 1.0)])));
        assert!(frontier.contains(&rd(&[(0.0, 0.5), (5.0, 0.5)])));
    }

    #[test]
    fn test_frontier_drops_dominated_option() {
        let mdp = build_two_action_mdp();
        let algebra = FrontierAlgebra::new(params());
        let vf = backward_induction(&mdp, 2, &algebra, &Unrestricted).unwrap();
        assert_eq!(vf.apply(&0).unwrap(), vec![rd(&[(6.0, 1.0)])]);
    }
}
