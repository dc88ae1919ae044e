//! Hardcoded fixture MDPs for driver and evaluator validation
//!
//! States are dense `u32` ids; actions are small integer ids. Every fixture
//! keeps its transition lists in state-id order so `transitions[id]` is the
//! row for state `id`.
//!
//! Two-action MDP (one state, self loop):
//!   0: [SAFE r=1 → 0, GAMBLE r=3 → 0]
//!
//! Gamble MDP:
//!   0: start   [SAFE r=2 → 3, GAMBLE r=0 → 1 (p=0.5) | 2 (p=0.5)]
//!   1: won     [SAFE r=5 → 3]
//!   2: lost    [SAFE r=0 → 3]
//!   3: end     [SAFE r=0 → 3]
//!
//! Two steps from state 0: SAFE yields {2: 1.0}, GAMBLE yields {0: 0.5, 5: 0.5}.

use crate::mdp::{Mdp, Policy};
use std::hash::{Hash, Hasher};

pub type FixtureState = u32;
pub type ActionId = u8;

pub const SAFE: ActionId = 0;
pub const GAMBLE: ActionId = 1;

/// One playable action of a fixture state.
#[derive(Debug, Clone)]
pub struct FixtureAction {
    pub action: ActionId,
    pub reward: f64,
    pub successors: Vec<(FixtureState, f64)>,
}

/// Table-driven MDP used by tests and benches.
#[derive(Debug, Clone)]
pub struct FixtureMdp {
    pub rows: Vec<Vec<FixtureAction>>,
}

impl FixtureMdp {
    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    fn find(&self, state: FixtureState, action: ActionId) -> Option<&FixtureAction> {
        self.rows.get(state as usize)?.iter().find(|a| a.action == action)
    }
}

impl Mdp<FixtureState, ActionId> for FixtureMdp {
    fn states(&self) -> Vec<FixtureState> {
        (0..self.rows.len() as FixtureState).collect()
    }

    fn actions(&self, state: &FixtureState) -> Vec<ActionId> {
        self.rows
            .get(*state as usize)
            .map(|row| row.iter().map(|a| a.action).collect())
            .unwrap_or_default()
    }

    fn reward_for(&self, state: &FixtureState, action: &ActionId) -> f64 {
        self.find(*state, *action).map(|a| a.reward).unwrap_or(0.0)
    }

    fn transitions(&self, state: &FixtureState, action: &ActionId) -> Vec<(FixtureState, f64)> {
        self.find(*state, *action).map(|a| a.successors.clone()).unwrap_or_default()
    }
}

fn action(action: ActionId, reward: f64, successors: Vec<(FixtureState, f64)>) -> FixtureAction {
    FixtureAction { action, reward, successors }
}

/// Single state with a reward-1 and a reward-3 action, both looping back.
pub fn build_two_action_mdp() -> FixtureMdp {
    FixtureMdp {
        rows: vec![vec![action(SAFE, 1.0, vec![(0, 1.0)]), action(GAMBLE, 3.0, vec![(0, 1.0)])]],
    }
}

/// Four-state gamble: a sure reward of 2 against a coin flip for 5.
pub fn build_gamble_mdp() -> FixtureMdp {
    FixtureMdp {
        rows: vec![
            vec![action(SAFE, 2.0, vec![(3, 1.0)]), action(GAMBLE, 0.0, vec![(1, 0.5), (2, 0.5)])],
            vec![action(SAFE, 5.0, vec![(3, 1.0)])],
            vec![action(SAFE, 0.0, vec![(3, 1.0)])],
            vec![action(SAFE, 0.0, vec![(3, 1.0)])],
        ],
    }
}

/// Chain of `length` independent coin flips for a reward of 0 or `stake`,
/// ending in an absorbing state. Used to grow supports in benches.
pub fn build_coin_chain_mdp(length: u32, stake: f64) -> FixtureMdp {
    let mut rows = Vec::with_capacity(length as usize * 2 + 1);
    for i in 0..length {
        let next = 2 * (i + 1);
        // Even ids are flip states, odd ids are their "won" states
        rows.push(vec![action(SAFE, 0.0, vec![(next, 0.5), (2 * i + 1, 0.5)])]);
        rows.push(vec![action(SAFE, stake, vec![(next, 1.0)])]);
    }
    let end = 2 * length;
    rows.push(vec![action(SAFE, 0.0, vec![(end, 1.0)])]);
    FixtureMdp { rows }
}

/// Per-state action weights, hashable so it can key the policy cache.
#[derive(Debug, Clone)]
pub struct FixturePolicy {
    choices: Vec<Vec<(ActionId, f64)>>,
}

impl FixturePolicy {
    /// Play `action` in every state.
    pub fn always(num_states: usize, action: ActionId) -> Self {
        FixturePolicy { choices: vec![vec![(action, 1.0)]; num_states] }
    }

    pub fn with_action(mut self, state: FixtureState, action: ActionId) -> Self {
        self.choices[state as usize] = vec![(action, 1.0)];
        self
    }

    pub fn with_mixed(mut self, state: FixtureState, weights: &[(ActionId, f64)]) -> Self {
        self.choices[state as usize] = weights.to_vec();
        self
    }
}

impl Policy<FixtureState, ActionId> for FixturePolicy {
    fn action_weights(&self, state: &FixtureState) -> Vec<(ActionId, f64)> {
        self.choices.get(*state as usize).cloned().unwrap_or_default()
    }
}

impl PartialEq for FixturePolicy {
    fn eq(&self, other: &Self) -> bool {
        self.choices.len() == other.choices.len()
            && self.choices.iter().zip(&other.choices).all(|(a, b)| {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.0 == y.0 && x.1.to_bits() == y.1.to_bits())
            })
    }
}

impl Eq for FixturePolicy {}

impl Hash for FixturePolicy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for row in &self.choices {
            row.len().hash(state);
            for (a, w) in row {
                a.hash(state);
                w.to_bits().hash(state);
            }
        }
    }
}
