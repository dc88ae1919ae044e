//! riskdist CLI - Command-line harness for distributional policy evaluation
//!
//! Builds a named scenario, evaluates policies on it and prints reward
//! distributions, risk-adjusted averages and dominance verdicts.

use clap::{Args, Parser, Subcommand};
use riskdist_engine::{
    AccuracyParameters, DistributionalEvaluator, EngineError, EvaluatorConfig, PolicyComparison,
};
use riskdist_model::{
    build_scenario, ActionId, ModelError, Scenario, StateId, TablePolicy, TabularMdp,
    SCENARIO_NAMES,
};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{info, warn};

type Evaluator = DistributionalEvaluator<StateId, ActionId, TabularMdp, TablePolicy>;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("unknown state {0:?}")]
    UnknownState(String),
}

#[derive(Parser, Debug)]
#[command(name = "riskdist", version, about = "Reward-distribution evaluation of fixed policies")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in scenarios and their policies
    Scenarios {
        #[arg(long, default_value_t = 3)]
        rounds: u32,
    },
    /// Print the reward distribution of one policy
    Evaluate {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long)]
        policy: String,
        /// Fraction of best-case mass removed before averaging
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        skew: f64,
        /// Print cumulative coordinates instead of outcome->probability pairs
        #[arg(long)]
        cumulative: bool,
    },
    /// Compare two policies by stochastic dominance
    Compare {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long)]
        first: String,
        #[arg(long)]
        second: String,
    },
    /// Print the non-dominated distributions reachable by any policy
    Frontier {
        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Args, Debug)]
struct ModelArgs {
    #[arg(long, default_value = "lottery")]
    scenario: String,
    #[arg(long, default_value_t = 3)]
    rounds: u32,
    /// Defaults to the scenario's own horizon
    #[arg(long)]
    horizon: Option<usize>,
    /// State to report; defaults to the scenario's start state
    #[arg(long)]
    state: Option<String>,
    /// Outcomes closer than this are coalesced
    #[arg(long, default_value_t = 0.0)]
    tolerance: f64,
    /// Outcomes with less mass than this are dropped
    #[arg(long, default_value_t = 0.0)]
    floor: f64,
    #[arg(long)]
    max_outcomes: Option<usize>,
    #[arg(long, default_value_t = riskdist_engine::cache::DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,
}

impl ModelArgs {
    fn load(&self) -> Result<(Scenario, Evaluator, StateId, usize), CliError> {
        let scenario = build_scenario(&self.scenario, self.rounds)?;
        let mut accuracy =
            AccuracyParameters::EXACT.with_tolerance(self.tolerance).with_floor(self.floor);
        if let Some(max) = self.max_outcomes {
            accuracy = accuracy.with_max_outcomes(max);
        }
        let config = EvaluatorConfig::default()
            .with_accuracy(accuracy)
            .with_cache_capacity(self.cache_capacity);
        let evaluator = DistributionalEvaluator::new(scenario.mdp.clone(), config)?;
        let state = match &self.state {
            Some(name) => scenario
                .mdp
                .state_id(name)
                .ok_or_else(|| CliError::UnknownState(name.clone()))?,
            None => scenario.start,
        };
        let horizon = self.horizon.unwrap_or(scenario.default_horizon);
        info!(scenario = %scenario.name, horizon, state, "scenario loaded");
        Ok((scenario, evaluator, state, horizon))
    }
}

/// Read `RAYON_NUM_THREADS` and size the global pool; rayon's default otherwise.
fn init_rayon_threads() {
    let Some(num_threads) =
        std::env::var("RAYON_NUM_THREADS").ok().and_then(|s| s.parse::<usize>().ok())
    else {
        return;
    };
    if let Err(err) = rayon::ThreadPoolBuilder::new().num_threads(num_threads).build_global() {
        warn!(%err, "could not configure rayon thread pool");
    } else {
        info!(num_threads, "rayon threads");
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Scenarios { rounds } => {
            for name in SCENARIO_NAMES {
                let scenario = build_scenario(name, rounds)?;
                println!("{:<12} {}", scenario.name, scenario.description);
                println!("{:<12} policies: {}", "", scenario.policy_names().join(", "));
            }
        }
        Command::Evaluate { model, policy, skew, cumulative } => {
            let (scenario, evaluator, state, horizon) = model.load()?;
            let policy = scenario.policy(&policy)?;
            let distribution = evaluator.value_function(policy, horizon)?.apply(&state)?;
            let expected = evaluator.expected_value_function(policy, horizon)?.apply(&state)?;

            if cumulative {
                println!("{}", distribution.to_cumulative_coordinates());
            } else {
                println!("distribution: {distribution}");
            }
            println!("average:      {:.6}", distribution.average_reward());
            println!("expected:     {expected:.6}");
            println!("std dev:      {:.6}", distribution.variance().sqrt());
            println!("median:       {}", distribution.quantile(0.5));
            if skew != 0.0 {
                let skewed = evaluator.skewed_value_function(policy, horizon, skew)?.apply(&state)?;
                println!("skewed({skew}): {skewed}");
                println!("skewed avg:   {:.6}", skewed.average_reward());
            }
        }
        Command::Compare { model, first, second } => {
            let (scenario, evaluator, state, horizon) = model.load()?;
            let (a, b) = (scenario.policy(&first)?, scenario.policy(&second)?);
            let verdict = evaluator.compare_policies(&state, a, b, horizon)?;
            let text = match verdict {
                PolicyComparison::Equal => {
                    format!("{first} and {second} have the same distribution")
                }
                PolicyComparison::FirstDominates => format!("{first} dominates {second}"),
                PolicyComparison::SecondDominates => format!("{second} dominates {first}"),
                PolicyComparison::Incomparable => format!("{first} and {second} are incomparable"),
            };
            println!("{text}");
        }
        Command::Frontier { model } => {
            let (_, evaluator, state, horizon) = model.load()?;
            let frontier = evaluator.frontier_value_function(horizon)?.apply(&state)?;
            println!("{} non-dominated distributions", frontier.len());
            for d in &frontier {
                println!("  avg {:>10.4}  {d}", d.average_reward());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    init_rayon_threads();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
