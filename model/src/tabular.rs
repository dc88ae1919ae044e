//! Table-backed MDPs with named states and actions.

use crate::error::ModelError;
use riskdist_engine::Mdp;
use std::collections::HashMap;

pub type StateId = u32;
pub type ActionId = u32;

/// Probability sums must match 1 within this slack.
const PROBABILITY_SLACK: f64 = 1e-9;

/// One action row: reward and successor distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRow {
    pub action: ActionId,
    pub reward: f64,
    pub successors: Vec<(StateId, f64)>,
}

/// Finite MDP stored as per-state action rows, indexed by `StateId`.
#[derive(Debug, Clone)]
pub struct TabularMdp {
    state_names: Vec<String>,
    action_names: Vec<String>,
    rows: Vec<Vec<ActionRow>>,
}

impl TabularMdp {
    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    pub fn state_name(&self, state: StateId) -> Option<&str> {
        self.state_names.get(state as usize).map(String::as_str)
    }

    pub fn action_name(&self, action: ActionId) -> Option<&str> {
        self.action_names.get(action as usize).map(String::as_str)
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_names.iter().position(|n| n == name).map(|i| i as StateId)
    }

    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.action_names.iter().position(|n| n == name).map(|i| i as ActionId)
    }

    fn row(&self, state: StateId, action: ActionId) -> Option<&ActionRow> {
        self.rows.get(state as usize)?.iter().find(|r| r.action == action)
    }
}

impl Mdp<StateId, ActionId> for TabularMdp {
    fn states(&self) -> Vec<StateId> {
        (0..self.rows.len() as StateId).collect()
    }

    fn actions(&self, state: &StateId) -> Vec<ActionId> {
        self.rows
            .get(*state as usize)
            .map(|rows| rows.iter().map(|r| r.action).collect())
            .unwrap_or_default()
    }

    fn reward_for(&self, state: &StateId, action: &ActionId) -> f64 {
        self.row(*state, *action).map(|r| r.reward).unwrap_or(0.0)
    }

    fn transitions(&self, state: &StateId, action: &ActionId) -> Vec<(StateId, f64)> {
        self.row(*state, *action).map(|r| r.successors.clone()).unwrap_or_default()
    }
}

/// Incremental construction of a [`TabularMdp`].
#[derive(Debug, Default)]
pub struct MdpBuilder {
    state_names: Vec<String>,
    action_index: HashMap<String, ActionId>,
    action_names: Vec<String>,
    rows: Vec<Vec<ActionRow>>,
}

impl MdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self, name: impl Into<String>) -> StateId {
        self.state_names.push(name.into());
        self.rows.push(Vec::new());
        (self.rows.len() - 1) as StateId
    }

    /// Intern an action name.
    pub fn action(&mut self, name: &str) -> ActionId {
        if let Some(&id) = self.action_index.get(name) {
            return id;
        }
        let id = self.action_names.len() as ActionId;
        self.action_names.push(name.to_string());
        self.action_index.insert(name.to_string(), id);
        id
    }

    /// Define `action` in `state`. An empty successor list ends the episode.
    pub fn add_transition(
        &mut self,
        state: StateId,
        action: &str,
        reward: f64,
        successors: Vec<(StateId, f64)>,
    ) -> Result<&mut Self, ModelError> {
        if !reward.is_finite() {
            return Err(ModelError::NonFiniteReward(reward));
        }
        if state as usize >= self.rows.len() {
            return Err(ModelError::UnknownState(state));
        }
        let state_name = self.state_names[state as usize].clone();
        if !successors.is_empty() {
            let total: f64 = successors.iter().map(|&(_, p)| p).sum();
            let out_of_range = successors.iter().any(|&(_, p)| !(0.0..=1.0).contains(&p));
            if (total - 1.0).abs() > PROBABILITY_SLACK || out_of_range {
                return Err(ModelError::InvalidProbabilities {
                    state: state_name,
                    action: action.to_string(),
                    total,
                });
            }
        }
        let action_id = self.action(action);
        if self.rows[state as usize].iter().any(|r| r.action == action_id) {
            return Err(ModelError::DuplicateAction {
                state: state_name,
                action: action.to_string(),
            });
        }
        self.rows[state as usize].push(ActionRow { action: action_id, reward, successors });
        Ok(self)
    }

    /// Validate successor ids and freeze the model.
    pub fn build(self) -> Result<TabularMdp, ModelError> {
        let n = self.rows.len() as StateId;
        for row in self.rows.iter().flatten() {
            if let Some(&(bad, _)) = row.successors.iter().find(|&&(s, _)| s >= n) {
                return Err(ModelError::UnknownState(bad));
            }
        }
        Ok(TabularMdp {
            state_names: self.state_names,
            action_names: self.action_names,
            rows: self.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_round_trip() {
        let mut b = MdpBuilder::new();
        let s0 = b.add_state("start");
        let s1 = b.add_state("end");
        b.add_transition(s0, "go", 2.0, vec![(s1, 1.0)]).unwrap();
        b.add_transition(s1, "stay", 0.0, vec![(s1, 1.0)]).unwrap();
        let mdp = b.build().unwrap();

        assert_eq!(mdp.num_states(), 2);
        assert_eq!(mdp.state_id("end"), Some(s1));
        let go = mdp.action_id("go").unwrap();
        assert_eq!(mdp.action_name(go), Some("go"));
        assert_eq!(mdp.actions(&s0), vec![go]);
        assert_eq!(mdp.reward_for(&s0, &go), 2.0);
        assert_eq!(mdp.transitions(&s0, &go), vec![(s1, 1.0)]);
    }

    #[test]
    fn test_rejects_bad_probabilities() {
        let mut b = MdpBuilder::new();
        let s0 = b.add_state("s");
        let err = b.add_transition(s0, "a", 0.0, vec![(s0, 0.5)]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidProbabilities { .. }));
    }

    #[test]
    fn test_rejects_duplicate_action_and_unknown_state() {
        let mut b = MdpBuilder::new();
        let s0 = b.add_state("s");
        b.add_transition(s0, "a", 0.0, vec![]).unwrap();
        assert!(matches!(
            b.add_transition(s0, "a", 1.0, vec![]),
            Err(ModelError::DuplicateAction { .. })
        ));
        assert_eq!(b.add_transition(7, "a", 0.0, vec![]).unwrap_err(), ModelError::UnknownState(7));
    }

    #[test]
    fn test_build_rejects_dangling_successor() {
        let mut b = MdpBuilder::new();
        let s0 = b.add_state("s");
        b.add_transition(s0, "a", 0.0, vec![(3, 1.0)]).unwrap();
        assert_eq!(b.build().unwrap_err(), ModelError::UnknownState(3));
    }

    #[test]
    fn test_rejects_non_finite_reward() {
        let mut b = MdpBuilder::new();
        let s0 = b.add_state("s");
        assert!(b.add_transition(s0, "a", f64::NAN, vec![]).is_err());
    }
}
