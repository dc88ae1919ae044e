//! Errors raised while building models.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unknown state id {0}")]
    UnknownState(u32),

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("state {state} already defines action {action:?}")]
    DuplicateAction { state: String, action: String },

    #[error("transition probabilities of state {state} / action {action:?} sum to {total}")]
    InvalidProbabilities { state: String, action: String, total: f64 },

    #[error("reward {0} is not finite")]
    NonFiniteReward(f64),

    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),

    #[error("unknown policy {policy:?} for scenario {scenario:?}")]
    UnknownPolicy { scenario: String, policy: String },

    #[error("invalid scenario parameter: {0}")]
    InvalidParameter(String),
}
