use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Strategy {
    Dfs,
    Bfs,
    UniformCost,
    /// `None` searches up to one less than the number of zones.
    IterativeDeepening {
        max_depth: Option<usize>,
    },
    AStar,
    Greedy,
    SimulatedAnnealing {
        initial_temperature: f64,
        iterations: usize,
    },
    HillClimbing {
        max_restarts: usize,
        max_iterations: usize,
    },
}

impl Strategy {
    pub const NAMES: [&'static str; 8] = ["dfs", "bfs", "ucs", "iddfs", "astar", "greedy", "sa", "hc"];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Dfs => "dfs",
            Strategy::Bfs => "bfs",
            Strategy::UniformCost => "ucs",
            Strategy::IterativeDeepening { .. } => "iddfs",
            Strategy::AStar => "astar",
            Strategy::Greedy => "greedy",
            Strategy::SimulatedAnnealing { .. } => "sa",
            Strategy::HillClimbing { .. } => "hc",
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(match config.strategy.as_str() {
            "dfs" => Strategy::Dfs,
            "bfs" => Strategy::Bfs,
            "ucs" => Strategy::UniformCost,
            "iddfs" => Strategy::IterativeDeepening {
                max_depth: config.max_depth,
            },
            "astar" => Strategy::AStar,
            "greedy" => Strategy::Greedy,
            "sa" => Strategy::SimulatedAnnealing {
                initial_temperature: config.initial_temperature,
                iterations: config.iterations,
            },
            "hc" => Strategy::HillClimbing {
                max_restarts: config.max_restarts,
                max_iterations: config.max_iterations_per_restart,
            },
            other => bail!(
                "unknown strategy {other}, expected one of {}",
                Strategy::NAMES.join(", ")
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_round_trips() {
        for name in Strategy::NAMES {
            let config = Config {
                strategy: name.to_string(),
                ..Config::default()
            };
            assert_eq!(Strategy::from_config(&config).unwrap().name(), name);
        }
    }

    #[test]
    fn test_strategy_parameters_come_from_config() {
        let config = Config {
            strategy: "sa".into(),
            initial_temperature: 42.0,
            iterations: 7,
            ..Config::default()
        };
        assert_eq!(
            Strategy::from_config(&config).unwrap(),
            Strategy::SimulatedAnnealing {
                initial_temperature: 42.0,
                iterations: 7
            }
        );

        let unknown = Config {
            strategy: "cbs".into(),
            ..Config::default()
        };
        assert!(Strategy::from_config(&unknown).is_err());
    }
}
