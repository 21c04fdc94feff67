use super::{evaluate_candidate, keep_best, Candidate};
use crate::common::{VehicleType, ZoneId};
use crate::graph::Graph;
use crate::stat::Stats;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, trace};

/// Hill climbing on straight-line distance to the destination, with random
/// restarts. The first climb starts at the origin; every restart first takes
/// a random usable route out of the origin. A climb ends at the destination,
/// when no neighbour is strictly closer, or after `max_iterations` steps.
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, name = "hill_climbing", fields(vehicle = %vehicle.tag, origin = origin, destination = destination, max_restarts = max_restarts), level = "debug")]
pub(crate) fn hill_climbing_search<R: Rng + ?Sized>(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    max_restarts: usize,
    max_iterations: usize,
    rng: &mut R,
    stats: &mut Stats,
) -> Option<Candidate> {
    let goal = graph.zone(destination);
    let distance_left = |zone: ZoneId| graph.zone(zone).distance_to(goal);
    let mut best = None;

    for restart in 0..=max_restarts {
        let mut path = vec![origin];
        if restart > 0 {
            let first_hops: Vec<_> = graph.get_neighbors(origin, &vehicle.tag).collect();
            match first_hops.choose(rng) {
                Some(route) => path.push(route.to),
                None => break,
            }
        }

        for _ in 0..max_iterations {
            let current = path[path.len() - 1];
            if current == destination {
                break;
            }
            stats.expanded_nodes += 1;

            let here = distance_left(current);
            let next = graph
                .get_neighbors(current, &vehicle.tag)
                .filter(|route| !path.contains(&route.to))
                .map(|route| (route.to, distance_left(route.to)))
                .filter(|&(_, distance)| distance < here)
                .min_by(|a, b| a.1.total_cmp(&b.1));

            match next {
                Some((zone, _)) => path.push(zone),
                None => {
                    trace!("restart {restart}: local optimum at {current:?}");
                    break;
                }
            }
        }

        if path[path.len() - 1] == destination {
            if let Some(candidate) = evaluate_candidate(graph, path, vehicle, stats) {
                debug!("restart {restart}: feasible path with cost {}", candidate.cost);
                keep_best(&mut best, candidate);
            }
        }
    }

    best
}
