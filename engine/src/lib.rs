//! riskdist Engine - Reward-distribution algebra and distributional policy evaluation
//!
//! This crate computes, for a fixed policy on a finite-horizon MDP, the full
//! probability distribution of cumulative reward at every state. It contains
//! the distribution algebra (unit, shift, mixture, combinatorial merge), risk
//! adjustments (upper-tail truncation, stochastic dominance), a generic
//! backward-induction driver and a bounded per-policy result cache.
//!
//! The engine owns no transition model; MDPs and policies come in through the
//! traits in [`mdp`].

pub mod accuracy;
pub mod adapter;
pub mod backward;
pub mod cache;
pub mod config;
pub mod distribution;
pub mod dominance;
pub mod error;
pub mod evaluator;
pub mod mdp;
pub mod merge;
pub mod reward;
pub mod test_mdp;
pub mod truncate;

pub use accuracy::AccuracyParameters;
pub use backward::{backward_induction, BackupAlgebra, ValueFunction};
pub use cache::PolicyCache;
pub use config::EvaluatorConfig;
pub use distribution::DiscreteDistribution;
pub use dominance::is_strongly_dominating;
pub use error::{EngineError, Result};
pub use evaluator::{DistributionalEvaluator, PolicyComparison};
pub use mdp::{ActionChoice, ActionRestriction, Mdp, Policy};
pub use reward::RewardDistribution;
pub use truncate::{truncate_upper_tail, NoAlteration, RewardAlterer, UpperTailTruncation};
