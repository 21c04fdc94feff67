use super::{best_candidate, evaluate_candidate, Candidate};
use crate::common::{Path, VehicleType, ZoneId};
use crate::graph::Graph;
use crate::stat::Stats;

use tracing::{debug, instrument, trace};

/// Enumerates loop-free paths depth first and returns every feasible one that
/// reaches the destination. Each stack frame owns its path, so a zone seen on
/// one branch stays available to its siblings. Branches heavier than the fuel
/// budget are pruned, and with `depth_limit` so are paths longer than the
/// limit in edges.
fn depth_first_candidates(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    depth_limit: Option<usize>,
    stats: &mut Stats,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut stack: Vec<(Path, f64)> = vec![(vec![origin], 0.0)];

    while let Some((path, weight)) = stack.pop() {
        let current = path[path.len() - 1];
        trace!("expand node: {current:?}, path: {path:?}");
        stats.expanded_nodes += 1;

        if current == destination {
            candidates.extend(evaluate_candidate(graph, path, vehicle, stats));
            continue;
        }

        if depth_limit.is_some_and(|limit| path.len() > limit) {
            continue;
        }

        let neighbors: Vec<_> = graph
            .get_neighbors(current, &vehicle.tag)
            .filter(|route| !path.contains(&route.to))
            .filter(|route| weight + route.weight <= vehicle.fuel_budget)
            .collect();

        // Push in reverse so routes pop in stored order.
        for route in neighbors.into_iter().rev() {
            let mut next_path = path.clone();
            next_path.push(route.to);
            stack.push((next_path, weight + route.weight));
        }
    }

    candidates
}

#[instrument(skip_all, name = "dfs", fields(vehicle = %vehicle.tag, origin = origin, destination = destination), level = "debug")]
pub(crate) fn dfs_search(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    stats: &mut Stats,
) -> Option<Candidate> {
    let candidates = depth_first_candidates(graph, origin, destination, vehicle, None, stats);
    debug!("found {} feasible paths", candidates.len());
    best_candidate(candidates)
}

/// Depth-limited DFS with limits `0..=max_depth`, stopping at the first limit
/// that yields a feasible path.
#[instrument(skip_all, name = "iterative_deepening", fields(vehicle = %vehicle.tag, origin = origin, destination = destination, max_depth = max_depth), level = "debug")]
pub(crate) fn iterative_deepening_search(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    max_depth: usize,
    stats: &mut Stats,
) -> Option<Candidate> {
    for depth in 0..=max_depth {
        let candidates =
            depth_first_candidates(graph, origin, destination, vehicle, Some(depth), stats);
        if !candidates.is_empty() {
            debug!("found {} feasible paths at depth {depth}", candidates.len());
            return best_candidate(candidates);
        }
    }

    debug!("cannot find solution within depth {max_depth}");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_util::{diamond_graph, two_zone_graph};

    fn ids(graph: &Graph, names: &[&str]) -> Vec<ZoneId> {
        names.iter().map(|name| graph.zone_id(name).unwrap()).collect()
    }

    #[test]
    fn test_dfs_compares_all_paths() {
        let graph = diamond_graph();
        let stats = &mut Stats::default();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());

        // S-A-D is found first, S-B-C-D is cheaper and wins.
        let candidate = dfs_search(&graph, s, d, graph.vehicle("truck").unwrap(), stats).unwrap();
        assert_eq!(candidate.path, ids(&graph, &["S", "B", "C", "D"]));
        assert_eq!(stats.candidates, 2);
    }

    #[test]
    fn test_dfs_siblings_may_revisit_zones() {
        let graph = diamond_graph();
        let stats = &mut Stats::default();
        let (s, e) = (graph.zone_id("S").unwrap(), graph.zone_id("E").unwrap());

        // Both branches go through D. E has nobody to serve, so the oracle
        // rejects them, but both must have been reached.
        assert_eq!(
            dfs_search(&graph, s, e, graph.vehicle("truck").unwrap(), stats),
            None
        );
        assert_eq!(stats.rejected, 2);
    }

    #[test]
    fn test_dfs_blocked_and_fuel() {
        let stats = &mut Stats::default();
        let blocked = two_zone_graph(10.0, true);
        assert_eq!(
            dfs_search(&blocked, 0, 1, blocked.vehicle("truck").unwrap(), stats),
            None
        );

        let short = two_zone_graph(3.0, false);
        assert_eq!(
            dfs_search(&short, 0, 1, short.vehicle("truck").unwrap(), stats),
            None
        );
    }

    #[test]
    fn test_iterative_deepening_stops_at_shallowest_depth() {
        let graph = diamond_graph();
        let stats = &mut Stats::default();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());

        let candidate =
            iterative_deepening_search(&graph, s, d, graph.vehicle("truck").unwrap(), 5, stats)
                .unwrap();
        assert_eq!(candidate.path, ids(&graph, &["S", "A", "D"]));
        assert!((candidate.cost - 20.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_iterative_deepening_respects_max_depth() {
        let graph = diamond_graph();
        let stats = &mut Stats::default();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());

        assert_eq!(
            iterative_deepening_search(&graph, s, d, graph.vehicle("truck").unwrap(), 1, stats),
            None
        );
    }
}
