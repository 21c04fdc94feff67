use super::{evaluate_candidate, heuristic, Candidate};
use crate::common::{VehicleType, ZoneId};
use crate::graph::Graph;
use crate::stat::Stats;

use tracing::{debug, instrument, trace};

/// Greedy best-first walk: always step to the usable, unvisited neighbour with
/// the smallest heuristic score, never backtracking.
#[instrument(skip_all, name = "greedy", fields(vehicle = %vehicle.tag, origin = origin, destination = destination), level = "debug")]
pub(crate) fn greedy_search(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    stats: &mut Stats,
) -> Option<Candidate> {
    let mut path = vec![origin];
    let mut current = origin;

    while current != destination {
        stats.expanded_nodes += 1;

        // min_by keeps the first of equal scores, i.e. stored route order.
        let next = graph
            .get_neighbors(current, &vehicle.tag)
            .filter(|route| !path.contains(&route.to))
            .min_by(|a, b| {
                heuristic(graph, a.to, destination).total_cmp(&heuristic(graph, b.to, destination))
            });

        match next {
            Some(route) => {
                trace!("step {current:?} -> {:?}", route.to);
                current = route.to;
                path.push(current);
            }
            None => {
                debug!("dead end at {}", graph.zone(current).name);
                return None;
            }
        }
    }

    evaluate_candidate(graph, path, vehicle, stats)
}
