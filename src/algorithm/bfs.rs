use super::{best_candidate, evaluate_candidate, Candidate};
use crate::common::{Path, VehicleType, ZoneId};
use crate::graph::Graph;
use crate::stat::Stats;

use std::collections::VecDeque;
use tracing::{debug, instrument, trace};

/// Breadth-first enumeration of loop-free paths. Once a feasible path with
/// `n` edges is found, no longer path is considered, so the result has the
/// fewest edges among feasible paths; among those the cheapest wins.
#[instrument(skip_all, name = "bfs", fields(vehicle = %vehicle.tag, origin = origin, destination = destination), level = "debug")]
pub(crate) fn bfs_search(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    stats: &mut Stats,
) -> Option<Candidate> {
    let mut queue: VecDeque<(Path, f64)> = VecDeque::from([(vec![origin], 0.0)]);
    let mut candidates = Vec::new();
    let mut shortest: Option<usize> = None;

    while let Some((path, weight)) = queue.pop_front() {
        if shortest.is_some_and(|len| path.len() > len) {
            break;
        }

        let current = path[path.len() - 1];
        trace!("expand node: {current:?}, path: {path:?}");
        stats.expanded_nodes += 1;

        if current == destination {
            let len = path.len();
            if let Some(candidate) = evaluate_candidate(graph, path, vehicle, stats) {
                shortest = Some(len);
                candidates.push(candidate);
            }
            continue;
        }

        for route in graph.get_neighbors(current, &vehicle.tag) {
            if path.contains(&route.to) || weight + route.weight > vehicle.fuel_budget {
                continue;
            }
            let mut next_path = path.clone();
            next_path.push(route.to);
            queue.push_back((next_path, weight + route.weight));
        }
    }

    debug!("found {} feasible paths", candidates.len());
    best_candidate(candidates)
}
