//! Table-backed stochastic policies.

use crate::error::ModelError;
use crate::tabular::{ActionId, StateId, TabularMdp};
use riskdist_engine::{Mdp, Policy};
use std::hash::{Hash, Hasher};

/// Per-state action weights. States without an entry take no action.
#[derive(Debug, Clone)]
pub struct TablePolicy {
    weights: Vec<Vec<(ActionId, f64)>>,
}

impl TablePolicy {
    pub fn empty(num_states: usize) -> Self {
        TablePolicy { weights: vec![Vec::new(); num_states] }
    }

    /// Deterministic policy that plays the first listed action available in each state.
    pub fn first_available(mdp: &TabularMdp, preference: &[&str]) -> Result<Self, ModelError> {
        let ids = preference
            .iter()
            .map(|name| {
                mdp.action_id(name)
                    .ok_or_else(|| ModelError::UnknownAction(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut policy = Self::empty(mdp.num_states());
        for state in 0..mdp.num_states() as StateId {
            let available = mdp.actions(&state);
            if let Some(&chosen) = ids.iter().find(|id| available.contains(id)) {
                policy.weights[state as usize] = vec![(chosen, 1.0)];
            }
        }
        Ok(policy)
    }

    pub fn with_action(mut self, state: StateId, action: ActionId) -> Self {
        if let Some(slot) = self.weights.get_mut(state as usize) {
            *slot = vec![(action, 1.0)];
        }
        self
    }

    pub fn with_weights(mut self, state: StateId, weights: &[(ActionId, f64)]) -> Self {
        if let Some(slot) = self.weights.get_mut(state as usize) {
            *slot = weights.to_vec();
        }
        self
    }
}

impl Policy<StateId, ActionId> for TablePolicy {
    fn action_weights(&self, state: &StateId) -> Vec<(ActionId, f64)> {
        self.weights.get(*state as usize).cloned().unwrap_or_default()
    }
}

impl PartialEq for TablePolicy {
    fn eq(&self, other: &Self) -> bool {
        self.weights.len() == other.weights.len()
            && self.weights.iter().zip(&other.weights).all(|(a, b)| {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.0 == y.0 && x.1.to_bits() == y.1.to_bits())
            })
    }
}

impl Eq for TablePolicy {}

impl Hash for TablePolicy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.weights.len().hash(state);
        for row in &self.weights {
            row.len().hash(state);
            for &(a, w) in row {
                a.hash(state);
                w.to_bits().hash(state);
            }
        }
    }
}
