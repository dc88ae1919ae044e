//! Error type shared by every engine operation.
//!
//! Every variant is structural: the computation is pure and deterministic, so
//! retrying with the same inputs yields the same error.

use thiserror::Error;

/// Errors raised by the distribution algebra and the backward-induction driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("cannot build a distribution from an empty outcome set")]
    EmptyDistribution,

    #[error("outcome {0} is not a finite number")]
    NonFiniteOutcome(f64),

    #[error("probability {probability} for outcome {outcome} must be finite and non-negative")]
    InvalidProbability { outcome: f64, probability: f64 },

    #[error("probability mass sums to {0}, expected 1")]
    MassNotConserved(f64),

    #[error("mixture requires at least one branch")]
    EmptyMixture,

    #[error("mixture weights must be finite, non-negative and have a positive total (got {0})")]
    InvalidWeights(f64),

    #[error("cross-product merge requires at least one dimension")]
    NoDimensions,

    #[error("dimension {0} has no candidate distributions")]
    EmptyDimension(usize),

    #[error("skew fraction {0} must lie in [0, 1)")]
    InvalidSkew(f64),

    #[error("reward distributions have no total order; the comparator must not be invoked")]
    ComparatorInvoked,

    #[error("no action available to select from")]
    NoCandidates,

    #[error("policy plays an action the state does not offer")]
    UnavailableAction,

    #[error("state is missing from the computed value table")]
    UnknownState,

    #[error("invalid accuracy parameters: {0}")]
    InvalidAccuracy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
