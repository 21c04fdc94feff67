use super::{evaluate_candidate, keep_best, Candidate};
use crate::common::{VehicleType, ZoneId};
use crate::graph::Graph;
use crate::stat::Stats;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, trace};

/// Simulated annealing over walks from the origin.
///
/// Each iteration proposes a uniformly random usable neighbour not yet on the
/// walk whose weight stays within the fuel budget. The walk's energy is its
/// accumulated route weight plus the straight line distance left to the
/// destination; improving moves are always taken, others with probability
/// `exp(-delta / t)` where `t = t0 / (i + 1)`. A dead end drops the last step.
/// Arriving at the destination either ends the run with a feasible path or,
/// when the oracle rejects the walk, starts over from the origin.
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, name = "simulated_annealing", fields(vehicle = %vehicle.tag, origin = origin, destination = destination, initial_temperature = initial_temperature, iterations = iterations), level = "debug")]
pub(crate) fn simulated_annealing_search<R: Rng + ?Sized>(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    initial_temperature: f64,
    iterations: usize,
    rng: &mut R,
    stats: &mut Stats,
) -> Option<Candidate> {
    let goal = graph.zone(destination);
    let distance_left = |zone: ZoneId| graph.zone(zone).distance_to(goal);

    let mut best = None;
    let mut walk = vec![origin];
    let mut legs: Vec<f64> = Vec::new();

    for iteration in 0..iterations {
        stats.expanded_nodes += 1;
        let current = walk[walk.len() - 1];
        let walked: f64 = legs.iter().sum();

        let options: Vec<_> = graph
            .get_neighbors(current, &vehicle.tag)
            .filter(|route| !walk.contains(&route.to))
            .filter(|route| walked + route.weight <= vehicle.fuel_budget)
            .collect();
        let Some(route) = options.choose(rng) else {
            trace!("dead end at {current:?}, backing off");
            if walk.len() > 1 {
                walk.pop();
                legs.pop();
            }
            continue;
        };

        let temperature = initial_temperature / (iteration + 1) as f64;
        let delta = route.weight + distance_left(route.to) - distance_left(current);
        if delta >= 0.0 && rng.gen::<f64>() >= (-delta / temperature).exp() {
            continue;
        }

        walk.push(route.to);
        legs.push(route.weight);
        trace!("accepted {current:?} -> {:?} (delta {delta}, t {temperature})", route.to);

        if route.to == destination {
            match evaluate_candidate(graph, walk.clone(), vehicle, stats) {
                Some(candidate) => {
                    debug!("reached destination after {} iterations", iteration + 1);
                    keep_best(&mut best, candidate);
                    break;
                }
                None => {
                    walk.truncate(1);
                    legs.clear();
                }
            }
        }
    }

    if best.is_none() {
        debug!(
            "no feasible walk within {iterations} iterations, last walk weight {}",
            legs.iter().sum::<f64>()
        );
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_util::{diamond_graph, two_zone_graph};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_annealing_single_route() {
        let graph = two_zone_graph(10.0, false);
        let mut rng = StdRng::seed_from_u64(0);
        let stats = &mut Stats::default();

        // The only move leaves the energy flat and is always accepted.
        let candidate = simulated_annealing_search(
            &graph,
            0,
            1,
            graph.vehicle("truck").unwrap(),
            10.0,
            5,
            &mut rng,
            stats,
        )
        .unwrap();
        assert_eq!(candidate.path, vec![0, 1]);
        assert_eq!(candidate.rescued, 30);
        assert_eq!(stats.expanded_nodes, 1);
    }

    #[test]
    fn test_annealing_returns_valid_paths() {
        let graph = diamond_graph();
        let truck = graph.vehicle("truck").unwrap();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = &mut Stats::default();
            if let Some(candidate) =
                simulated_annealing_search(&graph, s, d, truck, 50.0, 200, &mut rng, stats)
            {
                assert_eq!(candidate.path.first(), Some(&s));
                assert_eq!(candidate.path.last(), Some(&d));
                assert!(crate::oracle::is_feasible(&graph, &candidate.path, truck));
            }
        }
    }

    #[test]
    fn test_annealing_is_reproducible_per_seed() {
        let graph = diamond_graph();
        let truck = graph.vehicle("truck").unwrap();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            simulated_annealing_search(&graph, 0, 4, truck, 20.0, 100, &mut rng, &mut Stats::default())
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_annealing_never_walks_past_fuel_budget() {
        let graph = two_zone_graph(3.0, false);
        let mut rng = StdRng::seed_from_u64(0);
        let stats = &mut Stats::default();

        // The only route weighs 4, so no walk reaches the oracle.
        assert_eq!(
            simulated_annealing_search(
                &graph,
                0,
                1,
                graph.vehicle("truck").unwrap(),
                10.0,
                50,
                &mut rng,
                stats,
            ),
            None
        );
        assert_eq!(stats.candidates, 0);
        assert_eq!(stats.rejected, 0);

        let graph = diamond_graph();
        let drone = graph.vehicle("drone").unwrap();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = &mut Stats::default();
            // S - A alone weighs 10, over the drone's budget of 6.
            assert_eq!(
                simulated_annealing_search(&graph, s, d, drone, 50.0, 100, &mut rng, stats),
                None
            );
            assert_eq!(stats.rejected, 0);
        }
    }

    #[test]
    fn test_annealing_blocked_route() {
        let graph = two_zone_graph(10.0, true);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            simulated_annealing_search(
                &graph,
                0,
                1,
                graph.vehicle("truck").unwrap(),
                10.0,
                50,
                &mut rng,
                &mut Stats::default(),
            ),
            None
        );
    }
}
