//! Finite-horizon backward induction, generic over the value type
//!
//! The driver knows nothing about what a value is. A [`BackupAlgebra`] supplies
//! the initial value, how an immediate reward is added, how successor values
//! are mixed, and how competing actions are compared. Each step is a pure
//! function of the previous step's table, so all states of one step are
//! backed up in parallel with Rayon using only shared references.

use crate::error::{EngineError, Result};
use crate::mdp::{ActionChoice, ActionKey, ActionRestriction, Mdp, StateKey};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Pure function from state to value.
///
/// Cheap to clone; evaluation is lazy, so composed functions do their work
/// per state on demand.
pub struct ValueFunction<S, V> {
    eval: Arc<dyn Fn(&S) -> Result<V> + Send + Sync>,
}

impl<S, V> Clone for ValueFunction<S, V> {
    fn clone(&self) -> Self {
        ValueFunction { eval: Arc::clone(&self.eval) }
    }
}

impl<S: 'static, V: 'static> ValueFunction<S, V> {
    pub fn new<F>(eval: F) -> Self
    where
        F: Fn(&S) -> Result<V> + Send + Sync + 'static,
    {
        ValueFunction { eval: Arc::new(eval) }
    }

    /// Value function backed by a computed table; unknown states are errors.
    pub fn from_table(table: HashMap<S, V>) -> Self
    where
        S: StateKey,
        V: Clone + Send + Sync,
    {
        Self::new(move |s| table.get(s).cloned().ok_or(EngineError::UnknownState))
    }

    pub fn apply(&self, state: &S) -> Result<V> {
        (self.eval)(state)
    }

    /// Compose with `f`, evaluated lazily per state.
    pub fn map<W, F>(&self, f: F) -> ValueFunction<S, W>
    where
        W: 'static,
        F: Fn(V) -> Result<W> + Send + Sync + 'static,
    {
        let inner = self.clone();
        ValueFunction::new(move |s| f(inner.apply(s)?))
    }
}

/// Value-type operations used by [`backward_induction`].
pub trait BackupAlgebra<S, A>: Sync {
    type Value: Clone + Send + Sync;

    /// Value of every state before the first backup.
    fn initial(&self, state: &S) -> Result<Self::Value>;

    /// An immediate reward lifted into the value type.
    fn reward_value(&self, reward: f64) -> Result<Self::Value>;

    /// Add an immediate scalar reward to a value.
    fn add(&self, value: &Self::Value, reward: f64) -> Result<Self::Value>;

    /// Mix values by probability weight.
    fn mix(&self, branches: Vec<(&Self::Value, f64)>) -> Result<Self::Value>;

    fn compare(&self, a: &Self::Value, b: &Self::Value) -> Result<Ordering>;

    /// Pick among competing action values. Defaults to the maximum under
    /// [`BackupAlgebra::compare`].
    fn select(&self, candidates: Vec<Self::Value>) -> Result<Self::Value> {
        let mut iter = candidates.into_iter();
        let mut best = iter.next().ok_or(EngineError::NoCandidates)?;
        for candidate in iter {
            if self.compare(&candidate, &best)? == Ordering::Greater {
                best = candidate;
            }
        }
        Ok(best)
    }
}

/// Run `horizon` synchronous backups over every state of `mdp`.
pub fn backward_induction<S, A, M, B, R>(
    mdp: &M,
    horizon: usize,
    algebra: &B,
    restriction: &R,
) -> Result<ValueFunction<S, B::Value>>
where
    S: StateKey + 'static,
    A: ActionKey,
    M: Mdp<S, A>,
    B: BackupAlgebra<S, A>,
    B::Value: 'static,
    R: ActionRestriction<S, A>,
{
    let states = mdp.states();
    let mut table: HashMap<S, B::Value> = states
        .iter()
        .map(|s| Ok((s.clone(), algebra.initial(s)?)))
        .collect::<Result<_>>()?;

    for step in 0..horizon {
        let next: Vec<(S, B::Value)> = states
            .par_iter()
            .map(|s| Ok((s.clone(), backup_state(mdp, algebra, restriction, &table, s)?)))
            .collect::<Result<_>>()?;
        table = next.into_iter().collect();
        debug!(step = step + 1, horizon, states = states.len(), "backup step complete");
    }

    Ok(ValueFunction::from_table(table))
}

/// One Bellman backup of `state` against the previous step's table.
fn backup_state<S, A, M, B, R>(
    mdp: &M,
    algebra: &B,
    restriction: &R,
    table: &HashMap<S, B::Value>,
    state: &S,
) -> Result<B::Value>
where
    S: StateKey,
    A: ActionKey,
    M: Mdp<S, A>,
    B: BackupAlgebra<S, A>,
    R: ActionRestriction<S, A>,
{
    let lookup = |s: &S| table.get(s).ok_or(EngineError::UnknownState);

    let available = mdp.actions(state);
    match restriction.restrict(state, available.clone()) {
        ActionChoice::Weighted(weights) => {
            if let Some(&(_, w)) = weights.iter().find(|&&(_, w)| !w.is_finite() || w < 0.0) {
                return Err(EngineError::InvalidWeights(w));
            }
            if weights.iter().any(|(a, _)| !available.contains(a)) {
                return Err(EngineError::UnavailableAction);
            }
            let played: Vec<(A, f64)> = weights.into_iter().filter(|&(_, w)| w > 0.0).collect();
            if played.is_empty() {
                return lookup(state).cloned();
            }
            let mut values = played
                .iter()
                .map(|(a, w)| Ok((action_value(mdp, algebra, table, state, a)?, *w)))
                .collect::<Result<Vec<_>>>()?;
            if values.len() == 1 {
                return Ok(values.remove(0).0);
            }
            algebra.mix(values.iter().map(|(v, w)| (v, *w)).collect())
        }
        ActionChoice::Optimize(actions) => {
            if actions.is_empty() {
                return lookup(state).cloned();
            }
            let mut values = actions
                .iter()
                .map(|a| action_value(mdp, algebra, table, state, a))
                .collect::<Result<Vec<_>>>()?;
            if values.len() == 1 {
                return Ok(values.remove(0));
            }
            algebra.select(values)
        }
    }
}

/// Value of playing `action` in `state`: successor values mixed by
/// transition probability, plus the immediate reward.
fn action_value<S, A, M, B>(
    mdp: &M,
    algebra: &B,
    table: &HashMap<S, B::Value>,
    state: &S,
    action: &A,
) -> Result<B::Value>
where
    S: StateKey,
    M: Mdp<S, A>,
    B: BackupAlgebra<S, A>,
{
    let reward = mdp.reward_for(state, action);
    let successors = mdp.transitions(state, action);
    if successors.is_empty() {
        return algebra.reward_value(reward);
    }
    let branches = successors
        .iter()
        .map(|(next, p)| Ok((table.get(next).ok_or(EngineError::UnknownState)?, *p)))
        .collect::<Result<Vec<_>>>()?;
    if branches.len() == 1 {
        return algebra.add(branches[0].0, reward);
    }
    algebra.add(&algebra.mix(branches)?, reward)
}

/// Classic expected-reward instantiation with scalar values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedRewardAlgebra;

impl<S, A> BackupAlgebra<S, A> for ExpectedRewardAlgebra {
    type Value = f64;

    fn initial(&self, _state: &S) -> Result<f64> {
        Ok(0.0)
    }

    fn reward_value(&self, reward: f64) -> Result<f64> {
        Ok(reward)
    }

    fn add(&self, value: &f64, reward: f64) -> Result<f64> {
        Ok(value + reward)
    }

    fn mix(&self, branches: Vec<(&f64, f64)>) -> Result<f64> {
        if branches.is_empty() {
            return Err(EngineError::EmptyMixture);
        }
        let total: f64 = branches.iter().map(|&(_, w)| w).sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(EngineError::InvalidWeights(total));
        }
        Ok(branches.iter().map(|&(v, w)| v * w).sum::<f64>() / total)
    }

    fn compare(&self, a: &f64, b: &f64) -> Result<Ordering> {
        Ok(a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::{PolicyRestriction, Unrestricted};
    use crate::test_mdp::{build_gamble_mdp, build_two_action_mdp, FixturePolicy, GAMBLE, SAFE};

    #[test]
    fn test_horizon_zero_returns_initial_values() {
        let mdp = build_two_action_mdp();
        let vf = backward_induction(&mdp, 0, &ExpectedRewardAlgebra, &Unrestricted).unwrap();
        assert_eq!(vf.apply(&0).unwrap(), 0.0);
    }

    #[test]
    fn test_expected_value_follows_policy() {
        let mdp = build_gamble_mdp();
        let policy = FixturePolicy::always(mdp.num_states(), SAFE).with_action(0, GAMBLE);
        let restriction = PolicyRestriction::new(&policy);
        let vf = backward_induction(&mdp, 2, &ExpectedRewardAlgebra, &restriction).unwrap();
        assert!((vf.apply(&0).unwrap() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_optimize_picks_best_action() {
        let mdp = build_gamble_mdp();
        let vf = backward_induction(&mdp, 2, &ExpectedRewardAlgebra, &Unrestricted).unwrap();
        // Gamble (2.5 in expectation) beats the safe reward of 2.0
        assert!((vf.apply(&0).unwrap() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_repeated_rewards_accumulate_over_horizon() {
        let mdp = build_two_action_mdp();
        let vf = backward_induction(&mdp, 3, &ExpectedRewardAlgebra, &Unrestricted).unwrap();
        assert!((vf.apply(&0).unwrap() - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_randomized_policy_mixes_action_values() {
        let mdp = build_gamble_mdp();
        let policy = FixturePolicy::always(mdp.num_states(), SAFE)
            .with_mixed(0, &[(SAFE, 0.5), (GAMBLE, 0.5)]);
        let restriction = PolicyRestriction::new(&policy);
        let vf = backward_induction(&mdp, 2, &ExpectedRewardAlgebra, &restriction).unwrap();
        assert!((vf.apply(&0).unwrap() - 2.25).abs() < 1e-10);
    }

    #[test]
    fn test_policy_playing_unoffered_action_is_an_error() {
        // GAMBLE only exists in state 0
        let mdp = build_gamble_mdp();
        let policy = FixturePolicy::always(mdp.num_states(), GAMBLE);
        let restriction = PolicyRestriction::new(&policy);
        let err = backward_induction(&mdp, 2, &ExpectedRewardAlgebra, &restriction).err();
        assert_eq!(err, Some(EngineError::UnavailableAction));
    }

    #[test]
    fn test_negative_or_nan_policy_weight_is_an_error() {
        let mdp = build_gamble_mdp();
        let negative = FixturePolicy::always(mdp.num_states(), SAFE)
            .with_mixed(0, &[(SAFE, -0.5), (GAMBLE, 1.5)]);
        let restriction = PolicyRestriction::new(&negative);
        let err = backward_induction(&mdp, 2, &ExpectedRewardAlgebra, &restriction).err();
        assert_eq!(err, Some(EngineError::InvalidWeights(-0.5)));

        let nan = FixturePolicy::always(mdp.num_states(), SAFE).with_mixed(0, &[(SAFE, f64::NAN)]);
        let restriction = PolicyRestriction::new(&nan);
        let err = backward_induction(&mdp, 2, &ExpectedRewardAlgebra, &restriction).err();
        assert!(matches!(err, Some(EngineError::InvalidWeights(w)) if w.is_nan()));
    }

    #[test]
    fn test_zero_weight_action_is_skipped() {
        let mdp = build_gamble_mdp();
        let policy = FixturePolicy::always(mdp.num_states(), SAFE)
            .with_mixed(0, &[(SAFE, 0.0), (GAMBLE, 1.0)]);
        let restriction = PolicyRestriction::new(&policy);
        let vf = backward_induction(&mdp, 2, &ExpectedRewardAlgebra, &restriction).unwrap();
        assert!((vf.apply(&0).unwrap() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_state_is_an_error() {
        let mdp = build_two_action_mdp();
        let vf = backward_induction(&mdp, 1, &ExpectedRewardAlgebra, &Unrestricted).unwrap();
        assert_eq!(vf.apply(&99).unwrap_err(), EngineError::UnknownState);
    }

    #[test]
    fn test_map_is_lazy_composition() {
        let mdp = build_two_action_mdp();
        let vf = backward_induction(&mdp, 1, &ExpectedRewardAlgebra, &Unrestricted).unwrap();
        let doubled = vf.map(|v| Ok(v * 2.0));
        assert!((doubled.apply(&0).unwrap() - 6.0).abs() < 1e-10);
    }
}
