//! riskdist Model - MDP and policy construction
//!
//! This crate builds tabular MDPs and policies from named scenarios and
//! hands them to the engine for evaluation.

pub mod error;
pub mod policy;
pub mod scenario;
pub mod tabular;

pub use error::ModelError;
pub use policy::TablePolicy;
pub use scenario::{build_scenario, Scenario, SCENARIO_NAMES};
pub use tabular::{ActionId, MdpBuilder, StateId, TabularMdp};
