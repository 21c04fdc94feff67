use super::{construct_path, evaluate_candidate, heuristic, Candidate, OpenNode};
use crate::common::{VehicleType, ZoneId};
use crate::graph::Graph;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// Best-first search over accumulated route weight plus `h`. The first time
/// the destination leaves the open list its path is handed to the oracle.
fn standard_a_star_search(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    h: impl Fn(ZoneId) -> f64,
    stats: &mut Stats,
) -> Option<Candidate> {
    let mut open_list = BTreeSet::new();
    let mut closed_list = HashSet::new();
    let mut g_cost = HashMap::new();
    let mut trace = HashMap::new();

    g_cost.insert(origin, 0.0);
    open_list.insert(OpenNode {
        zone: origin,
        f_cost: h(origin),
        g_cost: 0.0,
    });

    while let Some(current) = open_list.pop_first() {
        // Stale entries for zones already expanded through a cheaper route.
        if !closed_list.insert(current.zone) {
            continue;
        }
        trace!("expand node: {current:?}");
        stats.expanded_nodes += 1;

        if current.zone == destination {
            return evaluate_candidate(graph, construct_path(&trace, destination), vehicle, stats);
        }

        for route in graph.get_neighbors(current.zone, &vehicle.tag) {
            if closed_list.contains(&route.to) {
                continue;
            }

            let tentative_g_cost = current.g_cost + route.weight;
            if tentative_g_cost < *g_cost.get(&route.to).unwrap_or(&f64::INFINITY) {
                g_cost.insert(route.to, tentative_g_cost);
                trace.insert(route.to, current.zone);
                open_list.insert(OpenNode {
                    zone: route.to,
                    f_cost: tentative_g_cost + h(route.to),
                    g_cost: tentative_g_cost,
                });
            }
        }
    }

    debug!("cannot find solution");
    None
}

/// Dijkstra: the destination is popped with the lightest allowed path for
/// this vehicle. Fuel and deadline are checked afterwards.
#[instrument(skip_all, name = "uniform_cost", fields(vehicle = %vehicle.tag, origin = origin, destination = destination), level = "debug")]
pub(crate) fn uniform_cost_search(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    stats: &mut Stats,
) -> Option<Candidate> {
    standard_a_star_search(graph, origin, destination, vehicle, |_| 0.0, stats)
}

/// A* guided by the urgency heuristic. The heuristic is not a lower bound on
/// the remaining route weight, so the result is best effort rather than the
/// lightest path.
#[instrument(skip_all, name = "a_star", fields(vehicle = %vehicle.tag, origin = origin, destination = destination), level = "debug")]
pub(crate) fn a_star_search(
    graph: &Graph,
    origin: ZoneId,
    destination: ZoneId,
    vehicle: &VehicleType,
    stats: &mut Stats,
) -> Option<Candidate> {
    standard_a_star_search(
        graph,
        origin,
        destination,
        vehicle,
        |zone| heuristic(graph, zone, destination),
        stats,
    )
}

#[cfg(test)]
mod tests {
    use tracing_subscriber;

    use super::*;
    use crate::common::Zone;
    use crate::graph::test_util::{diamond_graph, truck, two_zone_graph, zone};

    // Helper function to setup tracing
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("trace")
            .try_init();
    }

    fn ids(graph: &Graph, names: &[&str]) -> Vec<ZoneId> {
        names.iter().map(|name| graph.zone_id(name).unwrap()).collect()
    }

    #[test]
    fn test_uniform_cost_finds_lightest_path() {
        init_tracing();
        let graph = diamond_graph();
        let stats = &mut Stats::default();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());

        let candidate =
            uniform_cost_search(&graph, s, d, graph.vehicle("truck").unwrap(), stats).unwrap();
        assert_eq!(candidate.path, ids(&graph, &["S", "B", "C", "D"]));
        assert_eq!(candidate.rescued, 20);
        assert!((candidate.cost - 3.0 / 20.0).abs() < 1e-9);
        assert_eq!(stats.candidates, 1);
    }

    #[test]
    fn test_uniform_cost_respects_allowed_vehicles() {
        init_tracing();
        let graph = diamond_graph();
        let stats = &mut Stats::default();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());

        // Drones may only fly S - A - D (20), which exceeds their budget of 6.
        assert_eq!(
            uniform_cost_search(&graph, s, d, graph.vehicle("drone").unwrap(), stats),
            None
        );
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_uniform_cost_weight_beats_hop_count() {
        init_tracing();
        let mut graph = Graph::new([truck(100.0)]);
        let mut o = zone("O", 10, 0, 24.0, (0.0, 0.0));
        o.vehicles.push("truck".into());
        graph.add_zone(o).unwrap();
        for name in ["X", "Y"] {
            graph.add_zone(Zone::new(name)).unwrap();
        }
        graph.add_zone(zone("T", 0, 5, 50.0, (0.0, 0.0))).unwrap();
        let truck = || vec!["truck".to_string()];
        graph.add_route("O", "T", 9.0, false, truck()).unwrap();
        graph.add_route("O", "X", 1.0, false, truck()).unwrap();
        graph.add_route("X", "Y", 1.0, false, truck()).unwrap();
        graph.add_route("Y", "T", 1.0, false, truck()).unwrap();

        let stats = &mut Stats::default();
        let (o, t) = (graph.zone_id("O").unwrap(), graph.zone_id("T").unwrap());
        let candidate =
            uniform_cost_search(&graph, o, t, graph.vehicle("truck").unwrap(), stats).unwrap();
        assert_eq!(candidate.path, ids(&graph, &["O", "X", "Y", "T"]));
    }

    #[test]
    fn test_a_star_reaches_destination() {
        init_tracing();
        let graph = diamond_graph();
        let stats = &mut Stats::default();
        let (s, d) = (graph.zone_id("S").unwrap(), graph.zone_id("D").unwrap());

        let candidate =
            a_star_search(&graph, s, d, graph.vehicle("truck").unwrap(), stats).unwrap();
        assert_eq!(candidate.path.first(), Some(&s));
        assert_eq!(candidate.path.last(), Some(&d));
        assert_eq!(candidate.rescued, 20);
    }

    #[test]
    fn test_a_star_follows_urgency_over_weight() {
        init_tracing();
        let mut graph = Graph::new([truck(100.0)]);
        let mut s = zone("S", 100, 0, 24.0, (0.0, 0.0));
        s.vehicles.push("truck".into());
        graph.add_zone(s).unwrap();
        // X is light to reach but far from the most urgent zone T, Y sits on T.
        graph.add_zone(zone("X", 0, 1, 20.0, (100.0, 0.0))).unwrap();
        graph.add_zone(zone("Y", 0, 1, 20.0, (0.0, 10.0))).unwrap();
        graph.add_zone(zone("T", 0, 100, 10.0, (0.0, 10.0))).unwrap();
        let allowed = || vec!["truck".to_string()];
        graph.add_route("S", "X", 1.0, false, allowed()).unwrap();
        graph.add_route("X", "T", 1.0, false, allowed()).unwrap();
        graph.add_route("S", "Y", 5.0, false, allowed()).unwrap();
        graph.add_route("Y", "T", 5.0, false, allowed()).unwrap();

        let vehicle = graph.vehicle("truck").unwrap();
        let (s, t) = (graph.zone_id("S").unwrap(), graph.zone_id("T").unwrap());
        let lightest = uniform_cost_search(&graph, s, t, vehicle, &mut Stats::default()).unwrap();
        let guided = a_star_search(&graph, s, t, vehicle, &mut Stats::default()).unwrap();

        assert_eq!(lightest.path, ids(&graph, &["S", "X", "T"]));
        assert_eq!(guided.path, ids(&graph, &["S", "Y", "T"]));
        assert!(guided.cost > lightest.cost);
    }

    #[test]
    fn test_a_star_blocked_route() {
        init_tracing();
        let graph = two_zone_graph(10.0, true);
        let stats = &mut Stats::default();
        assert_eq!(
            a_star_search(&graph, 0, 1, graph.vehicle("truck").unwrap(), stats),
            None
        );
    }
}
