use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Deserialize;

use crate::solver::Strategy;

#[derive(Parser, Debug, Default)]
#[command(
    name = "Relief Routing",
    about = "Search strategies for routing medication to the most urgent relief zone.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the scenario file (JSON or YAML)")]
    pub scenario_path: Option<String>,

    #[arg(long, help = "Path to the JSON report output file")]
    pub output_path: Option<String>,

    #[arg(long, help = "Strategy: dfs, bfs, ucs, iddfs, astar, greedy, sa or hc")]
    pub strategy: Option<String>,

    #[arg(long, help = "Zone the medication leaves from")]
    pub origin: Option<String>,

    #[arg(long, help = "Destination zone, defaults to the most urgent zone")]
    pub destination: Option<String>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Number of search and distribution rounds")]
    pub rounds: Option<usize>,

    #[arg(long, help = "Iterative deepening: maximum depth")]
    pub max_depth: Option<usize>,

    #[arg(long, help = "Simulated annealing: initial temperature")]
    pub initial_temperature: Option<f64>,

    #[arg(long, help = "Simulated annealing: iteration count")]
    pub iterations: Option<usize>,

    #[arg(long, help = "Hill climbing: number of random restarts")]
    pub max_restarts: Option<usize>,

    #[arg(long, help = "Hill climbing: iterations per restart")]
    pub max_iterations_per_restart: Option<usize>,

    #[arg(
        long,
        help = "Milliseconds between dynamic condition changes, 0 disables them"
    )]
    pub dynamics_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scenario_path: String,
    pub output_path: Option<String>,
    pub strategy: String,
    pub origin: String,
    pub destination: Option<String>,
    pub seed: u64,
    pub rounds: usize,
    pub max_depth: Option<usize>,
    pub initial_temperature: f64,
    pub iterations: usize,
    pub max_restarts: usize,
    pub max_iterations_per_restart: usize,
    pub dynamics_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scenario_path: "map_file/relief.json".to_string(),
            output_path: None,
            strategy: "ucs".to_string(),
            origin: "BRAGA".to_string(),
            destination: None,
            seed: 0,
            rounds: 1,
            max_depth: None,
            initial_temperature: 100.0,
            iterations: 1000,
            max_restarts: 10,
            max_iterations_per_restart: 100,
            dynamics_interval_ms: 0,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).context("invalid config yaml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(scenario_path) = &cli.scenario_path {
            self.scenario_path = scenario_path.clone();
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(strategy) = &cli.strategy {
            self.strategy = strategy.to_lowercase();
        }
        if let Some(origin) = &cli.origin {
            self.origin = origin.clone();
        }
        if let Some(destination) = &cli.destination {
            self.destination = Some(destination.clone());
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(rounds) = cli.rounds {
            self.rounds = rounds;
        }
        if let Some(max_depth) = cli.max_depth {
            self.max_depth = Some(max_depth);
        }
        if let Some(initial_temperature) = cli.initial_temperature {
            self.initial_temperature = initial_temperature;
        }
        if let Some(iterations) = cli.iterations {
            self.iterations = iterations;
        }
        if let Some(max_restarts) = cli.max_restarts {
            self.max_restarts = max_restarts;
        }
        if let Some(max_iterations_per_restart) = cli.max_iterations_per_restart {
            self.max_iterations_per_restart = max_iterations_per_restart;
        }
        if let Some(dynamics_interval_ms) = cli.dynamics_interval_ms {
            self.dynamics_interval_ms = dynamics_interval_ms;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !Strategy::NAMES.contains(&self.strategy.as_str()) {
            return Err(anyhow!(
                "Unknown strategy {}, expected one of {}",
                self.strategy,
                Strategy::NAMES.join(", ")
            ));
        }

        if self.origin.trim().is_empty() {
            return Err(anyhow!("Origin zone must not be empty"));
        }

        match self.strategy.as_str() {
            "sa" => {
                if self.initial_temperature.is_nan() || self.initial_temperature <= 0.0 {
                    return Err(anyhow!(
                        "Initial temperature must be greater than 0, got {}",
                        self.initial_temperature
                    ));
                }
                if self.iterations == 0 {
                    return Err(anyhow!("Simulated annealing needs at least one iteration"));
                }
            }
            "hc" => {
                if self.max_iterations_per_restart == 0 {
                    return Err(anyhow!("Hill climbing needs at least one iteration per restart"));
                }
            }
            _ => {}
        }

        Ok(())
    }
}
