mod strategy;

pub use strategy::Strategy;

use std::fmt;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::algorithm::{
    a_star_search, bfs_search, dfs_search, greedy_search, hill_climbing_search,
    iterative_deepening_search, simulated_annealing_search, uniform_cost_search, Candidate,
};
use crate::common::{Path, VehicleType, ZoneId};
use crate::graph::Graph;
use crate::stat::Stats;

/// Origin and, optionally, destination names. Without a destination the most
/// urgent zone other than the origin is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub origin: String,
    pub destination: Option<String>,
}

impl Request {
    pub fn new(origin: &str, destination: Option<&str>) -> Self {
        Request {
            origin: origin.to_uppercase(),
            destination: destination.map(str::to_uppercase),
        }
    }
}

/// The winning vehicle type and path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub vehicle: String,
    pub path: Path,
    pub cost: f64,
    pub rescued: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoSolution {
    UnknownZone(String),
    NoDestination,
    OriginIsDestination,
    NoVehicles,
    NoStock,
    OriginExpired,
    NoFeasiblePath,
}

impl fmt::Display for NoSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoSolution::UnknownZone(name) => write!(f, "zone {name} does not exist"),
            NoSolution::NoDestination => write!(f, "no zone is waiting for supplies"),
            NoSolution::OriginIsDestination => write!(f, "origin and destination are the same zone"),
            NoSolution::NoVehicles => write!(f, "origin has no vehicles available"),
            NoSolution::NoStock => write!(f, "origin has no supplies to dispatch"),
            NoSolution::OriginExpired => write!(f, "origin time window has expired"),
            NoSolution::NoFeasiblePath => write!(f, "no feasible path for any vehicle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Plan),
    NoSolution(NoSolution),
}

impl SearchOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SearchOutcome::Found(plan) => Some(plan),
            SearchOutcome::NoSolution(_) => None,
        }
    }
}

pub trait Solver {
    fn solve(&mut self, graph: &Graph, request: &Request) -> SearchOutcome;
}

/// Runs one strategy per vehicle type stationed at the origin and keeps the
/// cheapest plan across them.
pub struct RouteSolver {
    strategy: Strategy,
    rng: StdRng,
    stats: Stats,
}

impl RouteSolver {
    pub fn new(strategy: Strategy, seed: u64) -> Self {
        RouteSolver {
            strategy,
            rng: StdRng::seed_from_u64(seed),
            stats: Stats::default(),
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Stats of the most recent solve.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn resolve(&self, graph: &Graph, request: &Request) -> Result<(ZoneId, ZoneId), NoSolution> {
        let origin = graph
            .zone_id(&request.origin)
            .ok_or_else(|| NoSolution::UnknownZone(request.origin.clone()))?;

        let destination = match &request.destination {
            Some(name) => graph
                .zone_id(name)
                .ok_or_else(|| NoSolution::UnknownZone(name.clone()))?,
            None => {
                let destination = graph
                    .most_urgent_zone(|zone| zone != origin)
                    .ok_or(NoSolution::NoDestination)?;
                info!(
                    "Destination automatically chosen: {} (priority: {:?})",
                    graph.zone(destination).name,
                    graph.zone(destination).priority()
                );
                destination
            }
        };

        if origin == destination {
            return Err(NoSolution::OriginIsDestination);
        }

        let zone = graph.zone(origin);
        if zone.vehicles.is_empty() {
            return Err(NoSolution::NoVehicles);
        }
        if zone.resource_stock == 0 {
            return Err(NoSolution::NoStock);
        }
        if zone.is_expired() {
            return Err(NoSolution::OriginExpired);
        }

        Ok((origin, destination))
    }

    fn search_vehicle(
        &mut self,
        graph: &Graph,
        origin: ZoneId,
        destination: ZoneId,
        vehicle: &VehicleType,
    ) -> Option<Candidate> {
        let stats = &mut self.stats;
        match self.strategy {
            Strategy::Dfs => dfs_search(graph, origin, destination, vehicle, stats),
            Strategy::Bfs => bfs_search(graph, origin, destination, vehicle, stats),
            Strategy::UniformCost => uniform_cost_search(graph, origin, destination, vehicle, stats),
            Strategy::IterativeDeepening { max_depth } => iterative_deepening_search(
                graph,
                origin,
                destination,
                vehicle,
                max_depth.unwrap_or(graph.len().saturating_sub(1)),
                stats,
            ),
            Strategy::AStar => a_star_search(graph, origin, destination, vehicle, stats),
            Strategy::Greedy => greedy_search(graph, origin, destination, vehicle, stats),
            Strategy::SimulatedAnnealing {
                initial_temperature,
                iterations,
            } => simulated_annealing_search(
                graph,
                origin,
                destination,
                vehicle,
                initial_temperature,
                iterations,
                &mut self.rng,
                stats,
            ),
            Strategy::HillClimbing {
                max_restarts,
                max_iterations,
            } => hill_climbing_search(
                graph,
                origin,
                destination,
                vehicle,
                max_restarts,
                max_iterations,
                &mut self.rng,
                stats,
            ),
        }
    }
}

impl Solver for RouteSolver {
    fn solve(&mut self, graph: &Graph, request: &Request) -> SearchOutcome {
        let total_solve_start_time = Instant::now();
        self.stats = Stats::default();

        let (origin, destination) = match self.resolve(graph, request) {
            Ok(endpoints) => endpoints,
            Err(reason) => {
                info!("{} from {}: {reason}", self.strategy.name(), request.origin);
                return SearchOutcome::NoSolution(reason);
            }
        };

        let mut best: Option<Plan> = None;
        for tag in graph.zone(origin).vehicle_types() {
            let Some(vehicle) = graph.vehicle(tag) else {
                warn!("vehicle type {tag} has no characteristics, skipping");
                continue;
            };
            debug!("using vehicle: {tag}");

            if let Some(candidate) = self.search_vehicle(graph, origin, destination, vehicle) {
                if best.as_ref().map_or(true, |plan| candidate.cost < plan.cost) {
                    best = Some(Plan {
                        vehicle: tag.to_string(),
                        path: candidate.path,
                        cost: candidate.cost,
                        rescued: candidate.rescued,
                    });
                }
            }
        }

        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        self.stats.print(self.strategy.name());

        match best {
            Some(plan) => {
                info!(
                    "Best path: {:?} with vehicle {} and cost {}",
                    graph.path_names(&plan.path),
                    plan.vehicle,
                    plan.cost
                );
                SearchOutcome::Found(plan)
            }
            None => {
                info!("No valid path found.");
                SearchOutcome::NoSolution(NoSolution::NoFeasiblePath)
            }
        }
    }
}
