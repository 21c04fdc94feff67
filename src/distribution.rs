//! Hands out the medication carried along a chosen path and the search and
//! distribution cycle built on top of it.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::common::ZoneId;
use crate::graph::{Graph, SharedGraph};
use crate::solver::{Plan, Request, RouteSolver, SearchOutcome, Solver};
use crate::stat::Stats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub zone: String,
    pub units: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub transfers: Vec<Transfer>,
}

impl Distribution {
    pub fn total(&self) -> u32 {
        self.transfers.iter().map(|transfer| transfer.units).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

fn transfer(graph: &mut Graph, from: ZoneId, to: ZoneId, units: u32) -> Transfer {
    graph.zone_mut(from).resource_stock -= units;
    let zone = graph.zone_mut(to);
    zone.population -= units;
    debug!("transferred {units} units to {}", zone.name);
    Transfer {
        zone: zone.name.clone(),
        units,
    }
}

/// Applies a plan to the current state of `graph`.
///
/// The destination is served first with as much as origin stock, its
/// population and the vehicle's cargo allow. Spare cargo then goes to the
/// intermediate zones still in need, most urgent first. Quantities are read
/// from `graph` rather than from the plan, so a plan that has already been
/// applied, or whose destination has since been served, moves nothing.
pub fn distribute(graph: &mut Graph, plan: &Plan) -> Distribution {
    let mut distribution = Distribution::default();
    if plan.path.len() < 2 {
        return distribution;
    }
    let (origin, destination) = (plan.path[0], plan.path[plan.path.len() - 1]);

    let Some(cargo_capacity) = graph.vehicle(&plan.vehicle).map(|vehicle| vehicle.cargo_capacity)
    else {
        warn!("vehicle type {} is not in the catalog", plan.vehicle);
        return distribution;
    };

    let rescued = graph
        .zone(origin)
        .resource_stock
        .min(graph.zone(destination).population)
        .min(cargo_capacity);
    if rescued == 0 {
        debug!("nothing to deliver along {:?}", graph.path_names(&plan.path));
        return distribution;
    }
    distribution
        .transfers
        .push(transfer(graph, origin, destination, rescued));

    let mut remaining_capacity = cargo_capacity - rescued;
    let mut intermediate: Vec<(ZoneId, f64)> = plan.path[1..plan.path.len() - 1]
        .iter()
        .filter_map(|&zone| graph.zone(zone).priority().map(|priority| (zone, priority)))
        .collect();
    intermediate.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (zone, _) in intermediate {
        let stock = graph.zone(origin).resource_stock;
        if remaining_capacity == 0 || stock == 0 {
            break;
        }
        let units = remaining_capacity
            .min(graph.zone(zone).population)
            .min(stock);
        distribution.transfers.push(transfer(graph, origin, zone, units));
        remaining_capacity -= units;
    }

    graph.refresh_heuristics();
    info!(
        "Delivered {} units from {}: {:?}",
        distribution.total(),
        graph.zone(origin).name,
        distribution.transfers
    );
    distribution
}

/// What one search and distribution round did, ready to be written out.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub strategy: &'static str,
    pub origin: String,
    pub vehicle: Option<String>,
    pub path: Vec<String>,
    pub cost: Option<f64>,
    /// Units the search expected to deliver to the destination.
    pub rescued: u32,
    /// Units actually handed out, read from the graph at dispatch time.
    pub delivered: u32,
    pub no_solution: Option<String>,
    pub distribution: Distribution,
    pub stats: Stats,
}

/// Searches a snapshot of the shared graph, then applies the winning plan
/// under the write lock.
pub fn rescue_cycle(shared: &SharedGraph, solver: &mut RouteSolver, request: &Request) -> CycleReport {
    let snapshot = shared.snapshot();
    let outcome = solver.solve(&snapshot, request);

    let mut report = CycleReport {
        strategy: solver.strategy().name(),
        origin: request.origin.clone(),
        vehicle: None,
        path: Vec::new(),
        cost: None,
        rescued: 0,
        delivered: 0,
        no_solution: None,
        distribution: Distribution::default(),
        stats: solver.stats().clone(),
    };

    match outcome {
        SearchOutcome::Found(plan) => {
            report.distribution = shared.write(|graph| distribute(graph, &plan));
            report.vehicle = Some(plan.vehicle.clone());
            report.path = snapshot.path_names(&plan.path);
            report.cost = Some(plan.cost);
            report.rescued = plan.rescued;
            report.delivered = report.distribution.total();
        }
        SearchOutcome::NoSolution(reason) => {
            report.no_solution = Some(reason.to_string());
        }
    }
    report
}
