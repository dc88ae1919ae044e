//! Decision-model boundary: MDPs, policies and action restriction
//!
//! The engine never owns a transition model. It reads one through [`Mdp`] and
//! learns which actions to back up through an [`ActionRestriction`], which is
//! either a fixed [`Policy`] or "leave it to the algebra".

use std::hash::Hash;

/// Requirements on state identifiers: hashable table keys shared across
/// rayon workers.
pub trait StateKey: Clone + Eq + Hash + Send + Sync {}

impl<T: Clone + Eq + Hash + Send + Sync> StateKey for T {}

/// Requirements on action identifiers.
pub trait ActionKey: Clone + PartialEq + Send + Sync {}

impl<T: Clone + PartialEq + Send + Sync> ActionKey for T {}

/// Finite Markov decision process with scalar rewards.
pub trait Mdp<S, A>: Sync {
    /// Every state the value table is computed for.
    fn states(&self) -> Vec<S>;

    /// Actions available in `state` (empty for absorbing states).
    fn actions(&self, state: &S) -> Vec<A>;

    /// Immediate reward for playing `action` in `state`.
    fn reward_for(&self, state: &S, action: &A) -> f64;

    /// Successor states with their probabilities. An empty list ends the
    /// episode after the immediate reward.
    fn transitions(&self, state: &S, action: &A) -> Vec<(S, f64)>;
}

/// Fixed (possibly randomized) policy.
pub trait Policy<S, A>: Sync {
    /// Actions chosen in `state` with their probabilities.
    fn action_weights(&self, state: &S) -> Vec<(A, f64)>;
}

/// Outcome of restricting the actions of a state.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionChoice<A> {
    /// Play these actions with these probabilities; values are mixed.
    Weighted(Vec<(A, f64)>),
    /// Any of these actions may be played; the algebra selects.
    Optimize(Vec<A>),
}

/// Decides which actions the driver backs up in each state.
pub trait ActionRestriction<S, A>: Sync {
    fn restrict(&self, state: &S, available: Vec<A>) -> ActionChoice<A>;
}

/// Restricts every state to the actions of a fixed policy.
#[derive(Debug, Clone, Copy)]
pub struct PolicyRestriction<'a, P> {
    policy: &'a P,
}

impl<'a, P> PolicyRestriction<'a, P> {
    pub fn new(policy: &'a P) -> Self {
        PolicyRestriction { policy }
    }
}

impl<S, A, P: Policy<S, A>> ActionRestriction<S, A> for PolicyRestriction<'_, P> {
    fn restrict(&self, state: &S, _available: Vec<A>) -> ActionChoice<A> {
        ActionChoice::Weighted(self.policy.action_weights(state))
    }
}

/// Leaves every available action to the algebra's selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl<S, A> ActionRestriction<S, A> for Unrestricted {
    fn restrict(&self, _state: &S, available: Vec<A>) -> ActionChoice<A> {
        ActionChoice::Optimize(available)
    }
}
