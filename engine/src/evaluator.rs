//! Distributional policy evaluation with a per-policy result cache
//!
//! `DistributionalEvaluator` binds the reward-distribution algebra to the
//! backward-induction driver for one MDP. Base value functions are cached per
//! (policy, horizon); skewed and averaged variants are lazy compositions over
//! the cached base, so repeated derived queries never redo the induction.

use crate::adapter::{DistributionAlgebra, FrontierAlgebra};
use crate::backward::{backward_induction, ExpectedRewardAlgebra, ValueFunction};
use crate::cache::PolicyCache;
use crate::config::EvaluatorConfig;
use crate::dominance::is_strongly_dominating;
use crate::error::Result;
use crate::mdp::{ActionKey, Mdp, Policy, PolicyRestriction, StateKey, Unrestricted};
use crate::reward::RewardDistribution;
use crate::truncate::alterer_for_skew;
use std::hash::Hash;
use std::marker::PhantomData;
use tracing::{info, instrument};

/// Outcome of comparing two policies' reward distributions at one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyComparison {
    Equal,
    FirstDominates,
    SecondDominates,
    Incomparable,
}

/// Reward-distribution evaluator for a fixed MDP.
pub struct DistributionalEvaluator<S, A, M, P> {
    mdp: M,
    config: EvaluatorConfig,
    cache: PolicyCache<(P, usize), ValueFunction<S, RewardDistribution>>,
    _actions: PhantomData<fn() -> A>,
}

impl<S, A, M, P> DistributionalEvaluator<S, A, M, P>
where
    S: StateKey + 'static,
    A: ActionKey,
    M: Mdp<S, A>,
    P: Policy<S, A> + Clone + Eq + Hash,
{
    pub fn new(mdp: M, config: EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(DistributionalEvaluator {
            mdp,
            cache: PolicyCache::new(config.cache_capacity),
            config,
            _actions: PhantomData,
        })
    }

    pub fn mdp(&self) -> &M {
        &self.mdp
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &PolicyCache<(P, usize), ValueFunction<S, RewardDistribution>> {
        &self.cache
    }

    /// State → cumulative-reward distribution of `policy` over `horizon` steps.
    #[instrument(level = "debug", skip(self, policy))]
    pub fn value_function(
        &self,
        policy: &P,
        horizon: usize,
    ) -> Result<ValueFunction<S, RewardDistribution>> {
        self.cache.get_or_try_compute((policy.clone(), horizon), || {
            info!(horizon, states = self.mdp.states().len(), "computing reward distributions");
            let algebra = DistributionAlgebra::new(self.config.accuracy);
            backward_induction(&self.mdp, horizon, &algebra, &PolicyRestriction::new(policy))
        })
    }

    /// Value function with the best `skew` fraction of mass removed per state.
    pub fn skewed_value_function(
        &self,
        policy: &P,
        horizon: usize,
        skew: f64,
    ) -> Result<ValueFunction<S, RewardDistribution>> {
        let alterer = alterer_for_skew(skew, self.config.accuracy)?;
        let base = self.value_function(policy, horizon)?;
        Ok(base.map(move |d| alterer.altered(&d)))
    }

    /// Risk-adjusted scalar summary: average of the skewed distribution.
    pub fn average_of_skewed_value_function(
        &self,
        policy: &P,
        horizon: usize,
        skew: f64,
    ) -> Result<ValueFunction<S, f64>> {
        Ok(self
            .skewed_value_function(policy, horizon, skew)?
            .map(|d| Ok(d.average_reward())))
    }

    /// Skewed value function using the configured default skew.
    pub fn default_skewed_value_function(
        &self,
        policy: &P,
        horizon: usize,
    ) -> Result<ValueFunction<S, RewardDistribution>> {
        self.skewed_value_function(policy, horizon, self.config.skew)
    }

    /// Scalar expected reward of `policy`, computed independently of the cache.
    pub fn expected_value_function(
        &self,
        policy: &P,
        horizon: usize,
    ) -> Result<ValueFunction<S, f64>> {
        let restriction = PolicyRestriction::new(policy);
        backward_induction(&self.mdp, horizon, &ExpectedRewardAlgebra, &restriction)
    }

    /// Non-dominated reward distributions reachable by any policy.
    #[instrument(level = "debug", skip(self))]
    pub fn frontier_value_function(
        &self,
        horizon: usize,
    ) -> Result<ValueFunction<S, Vec<RewardDistribution>>> {
        let algebra = FrontierAlgebra::new(self.config.accuracy);
        backward_induction(&self.mdp, horizon, &algebra, &Unrestricted)
    }

    /// Compare two policies by stochastic dominance of their distributions at `state`.
    pub fn compare_policies(
        &self,
        state: &S,
        first: &P,
        second: &P,
        horizon: usize,
    ) -> Result<PolicyComparison> {
        let a = self.value_function(first, horizon)?.apply(state)?;
        let b = self.value_function(second, horizon)?.apply(state)?;
        Ok(if a == b {
            PolicyComparison::Equal
        } else if is_strongly_dominating(&a, &b) {
            PolicyComparison::FirstDominates
        } else if is_strongly_dominating(&b, &a) {
            PolicyComparison::SecondDominates
        } else {
            PolicyComparison::Incomparable
        })
    }
}
