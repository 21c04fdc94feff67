use relief_routing::config::{Cli, Config};
use relief_routing::distribution::rescue_cycle;
use relief_routing::dynamics::spawn_dynamic_conditions;
use relief_routing::graph::SharedGraph;
use relief_routing::scenario::load_graph;
use relief_routing::solver::{Request, RouteSolver, Strategy};

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let graph = load_graph(&config.scenario_path)?;
    let shared = SharedGraph::new(graph);

    let dynamics = (config.dynamics_interval_ms > 0).then(|| {
        spawn_dynamic_conditions(
            shared.clone(),
            Duration::from_millis(config.dynamics_interval_ms),
            config.seed,
        )
    });

    let mut solver = RouteSolver::new(Strategy::from_config(&config)?, config.seed);
    let request = Request::new(&config.origin, config.destination.as_deref());

    let mut reports = Vec::with_capacity(config.rounds);
    for round in 1..=config.rounds {
        info!("Round {round}/{}", config.rounds);
        reports.push(rescue_cycle(&shared, &mut solver, &request));
        if dynamics.is_some() && round < config.rounds {
            tokio::time::sleep(Duration::from_millis(config.dynamics_interval_ms)).await;
        }
    }

    if let Some(handle) = dynamics {
        handle.abort();
    }

    let delivered: u32 = reports.iter().map(|report| report.delivered).sum();
    info!("Delivered {delivered} units over {} rounds", reports.len());

    if let Some(output_path) = &config.output_path {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("cannot write report to {output_path}"))?;
        info!("Report written to {output_path}");
    }

    Ok(())
}
