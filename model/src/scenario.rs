//! Named scenarios used by the CLI and the benches.

use crate::error::ModelError;
use crate::policy::TablePolicy;
use crate::tabular::{MdpBuilder, StateId, TabularMdp};

pub const SCENARIO_NAMES: &[&str] = &["two-action", "lottery", "ladder"];

/// Probability that a lottery gamble wins.
const LOTTERY_WIN_PROBABILITY: f64 = 0.4;
const LOTTERY_PRIZE: f64 = 3.0;
/// Probability that one ladder climb succeeds.
const LADDER_SUCCESS_PROBABILITY: f64 = 0.6;

/// An MDP with a start state and a few named policies.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub mdp: TabularMdp,
    pub start: StateId,
    pub default_horizon: usize,
    pub policies: Vec<(String, TablePolicy)>,
}

impl Scenario {
    pub fn policy(&self, name: &str) -> Result<&TablePolicy, ModelError> {
        self.policies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| ModelError::UnknownPolicy {
                scenario: self.name.clone(),
                policy: name.to_string(),
            })
    }

    pub fn policy_names(&self) -> Vec<&str> {
        self.policies.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// Build a scenario by name; `rounds` sizes the multi-stage ones.
pub fn build_scenario(name: &str, rounds: u32) -> Result<Scenario, ModelError> {
    if rounds == 0 {
        return Err(ModelError::InvalidParameter("rounds must be at least 1".to_string()));
    }
    match name {
        "two-action" => two_action(),
        "lottery" => lottery(rounds),
        "ladder" => ladder(rounds),
        other => Err(ModelError::UnknownScenario(other.to_string())),
    }
}

fn two_action() -> Result<Scenario, ModelError> {
    let mut b = MdpBuilder::new();
    let s = b.add_state("s");
    b.add_transition(s, "low", 1.0, vec![(s, 1.0)])?;
    b.add_transition(s, "high", 3.0, vec![(s, 1.0)])?;
    let mdp = b.build()?;

    let low = TablePolicy::first_available(&mdp, &["low"])?;
    let high = TablePolicy::first_available(&mdp, &["high"])?;
    Ok(Scenario {
        name: "two-action".to_string(),
        description: "one state, a sure reward of 1 or 3 every step".to_string(),
        mdp,
        start: s,
        default_horizon: 1,
        policies: vec![("low".to_string(), low), ("high".to_string(), high)],
    })
}

/// Each round: bank 1 for sure, or gamble for a prize paid on the next step.
fn lottery(rounds: u32) -> Result<Scenario, ModelError> {
    let mut b = MdpBuilder::new();
    let round: Vec<StateId> = (0..rounds).map(|i| b.add_state(format!("round{i}"))).collect();
    let win: Vec<StateId> = (0..rounds).map(|i| b.add_state(format!("win{i}"))).collect();
    let lose: Vec<StateId> = (0..rounds).map(|i| b.add_state(format!("lose{i}"))).collect();
    let done = b.add_state("done");

    for i in 0..rounds as usize {
        let next = round.get(i + 1).copied().unwrap_or(done);
        b.add_transition(round[i], "bank", 1.0, vec![(next, 1.0)])?;
        b.add_transition(
            round[i],
            "gamble",
            0.0,
            vec![(win[i], LOTTERY_WIN_PROBABILITY), (lose[i], 1.0 - LOTTERY_WIN_PROBABILITY)],
        )?;
        b.add_transition(win[i], "collect", LOTTERY_PRIZE, vec![(next, 1.0)])?;
        b.add_transition(lose[i], "collect", 0.0, vec![(next, 1.0)])?;
    }
    b.add_transition(done, "rest", 0.0, vec![(done, 1.0)])?;
    let mdp = b.build()?;

    let bank = TablePolicy::first_available(&mdp, &["bank", "collect", "rest"])?;
    let gamble = TablePolicy::first_available(&mdp, &["gamble", "collect", "rest"])?;
    let (bank_id, gamble_id) = match (mdp.action_id("bank"), mdp.action_id("gamble")) {
        (Some(bank_id), Some(gamble_id)) => (bank_id, gamble_id),
        _ => return Err(ModelError::UnknownAction("bank".to_string())),
    };
    let mixed = round
        .iter()
        .fold(gamble.clone(), |p, &s| p.with_weights(s, &[(bank_id, 0.5), (gamble_id, 0.5)]));

    Ok(Scenario {
        name: "lottery".to_string(),
        description: format!(
            "{rounds} rounds of bank 1 or gamble for {LOTTERY_PRIZE} at p={LOTTERY_WIN_PROBABILITY}"
        ),
        mdp,
        start: round[0],
        default_horizon: 2 * rounds as usize,
        policies: vec![
            ("bank".to_string(), bank),
            ("gamble".to_string(), gamble),
            ("mixed".to_string(), mixed),
        ],
    })
}

/// Climb a ladder of `rounds` rungs; stopping at rung k pays k, a failed climb pays nothing.
fn ladder(rounds: u32) -> Result<Scenario, ModelError> {
    let mut b = MdpBuilder::new();
    let rung: Vec<StateId> = (0..=rounds).map(|k| b.add_state(format!("rung{k}"))).collect();
    let bust = b.add_state("bust");

    for k in 0..=rounds as usize {
        b.add_transition(rung[k], "stop", k as f64, vec![])?;
        if let Some(&up) = rung.get(k + 1) {
            b.add_transition(
                rung[k],
                "climb",
                0.0,
                vec![(up, LADDER_SUCCESS_PROBABILITY), (bust, 1.0 - LADDER_SUCCESS_PROBABILITY)],
            )?;
        }
    }
    b.add_transition(bust, "stop", 0.0, vec![])?;
    let mdp = b.build()?;

    let cautious = TablePolicy::first_available(&mdp, &["stop"])?;
    let bold = TablePolicy::first_available(&mdp, &["climb", "stop"])?;
    Ok(Scenario {
        name: "ladder".to_string(),
        description: format!(
            "{rounds} rungs, each climb succeeds with p={LADDER_SUCCESS_PROBABILITY}"
        ),
        mdp,
        start: rung[0],
        default_horizon: rounds as usize + 1,
        policies: vec![("cautious".to_string(), cautious), ("bold".to_string(), bold)],
    })
}
