//! Feasibility and cost checks shared by every search strategy.
//!
//! Infeasible edges and paths are reported as `None`; nothing here fails.

use crate::common::{VehicleType, ZoneId};
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub cost: f64,
    pub rescued: u32,
}

pub fn edge_cost(graph: &Graph, from: ZoneId, to: ZoneId, tag: &str) -> Option<f64> {
    graph
        .route(from, to)
        .filter(|route| route.is_usable_by(tag))
        .map(|route| route.weight)
}

pub fn accumulated_cost(graph: &Graph, path: &[ZoneId], vehicle: &VehicleType) -> Option<f64> {
    path.windows(2)
        .map(|pair| edge_cost(graph, pair[0], pair[1], &vehicle.tag))
        .sum()
}

pub fn travel_time(weight: f64, vehicle: &VehicleType) -> f64 {
    weight / vehicle.speed
}

/// Fuel and deadline check. The deadline is the destination's window only.
pub fn is_feasible(graph: &Graph, path: &[ZoneId], vehicle: &VehicleType) -> bool {
    let (Some(cost), Some(&destination)) = (accumulated_cost(graph, path, vehicle), path.last())
    else {
        return false;
    };
    cost <= vehicle.fuel_budget
        && travel_time(cost, vehicle) <= graph.zone(destination).time_window
}

pub fn rescue_quantity(graph: &Graph, origin: ZoneId, destination: ZoneId, vehicle: &VehicleType) -> u32 {
    graph
        .zone(origin)
        .resource_stock
        .min(graph.zone(destination).population)
        .min(vehicle.cargo_capacity)
}

/// Scores a complete path. The route cost is divided by the number of people
/// served, so a route that helps more people per unit of effort wins.
pub fn evaluate(graph: &Graph, path: &[ZoneId], vehicle: &VehicleType) -> Option<Evaluation> {
    let (&origin, &destination) = (path.first()?, path.last()?);
    let rescued = rescue_quantity(graph, origin, destination, vehicle);
    if rescued == 0 || !is_feasible(graph, path, vehicle) {
        return None;
    }
    let cost = accumulated_cost(graph, path, vehicle)?;
    Some(Evaluation {
        cost: cost * (vehicle.cost_factor / rescued as f64),
        rescued,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_util::{diamond_graph, truck, two_zone_graph};

    #[test]
    fn test_two_zone_rescue_scenario() {
        let graph = two_zone_graph(10.0, false);
        let truck = graph.vehicle("truck").unwrap();
        let path = vec![0, 1];

        assert_eq!(accumulated_cost(&graph, &path, truck), Some(4.0));
        assert_eq!(travel_time(4.0, truck), 2.0);
        assert!(is_feasible(&graph, &path, truck));

        let evaluation = evaluate(&graph, &path, truck).unwrap();
        assert_eq!(evaluation.rescued, 30);
        assert!((evaluation.cost - 4.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_blocked_route_is_infeasible() {
        let graph = two_zone_graph(10.0, true);
        let truck = graph.vehicle("truck").unwrap();
        assert_eq!(edge_cost(&graph, 0, 1, "truck"), None);
        assert_eq!(accumulated_cost(&graph, &[0, 1], truck), None);
        assert!(!is_feasible(&graph, &[0, 1], truck));
        assert_eq!(evaluate(&graph, &[0, 1], truck), None);
    }

    #[test]
    fn test_fuel_overrun_is_infeasible() {
        let graph = two_zone_graph(3.0, false);
        let truck = graph.vehicle("truck").unwrap();
        assert!(accumulated_cost(&graph, &[0, 1], truck).unwrap() > truck.fuel_budget);
        assert!(!is_feasible(&graph, &[0, 1], truck));
        assert_eq!(evaluate(&graph, &[0, 1], truck), None);
    }

    #[test]
    fn test_deadline_and_expired_destination() {
        let mut graph = two_zone_graph(10.0, false);
        let slow = VehicleType {
            speed: 0.5,
            ..truck(10.0)
        };
        // 4 / 0.5 = 8 hours against a 5 hour window.
        assert!(!is_feasible(&graph, &[0, 1], &slow));

        graph.zone_mut(1).time_window = 0.0;
        assert!(!is_feasible(&graph, &[0, 1], graph.vehicle("truck").unwrap()));
    }

    #[test]
    fn test_nothing_to_rescue_is_infeasible() {
        let mut graph = two_zone_graph(10.0, false);
        graph.zone_mut(0).resource_stock = 0;
        let truck = graph.vehicle("truck").unwrap();
        assert!(is_feasible(&graph, &[0, 1], truck));
        assert_eq!(evaluate(&graph, &[0, 1], truck), None);
    }

    #[test]
    fn test_disallowed_vehicle_on_multi_hop_path() {
        let graph = diamond_graph();
        let drone = graph.vehicle("drone").unwrap();
        let path: Vec<_> = ["S", "B", "C", "D"]
            .iter()
            .map(|name| graph.zone_id(name).unwrap())
            .collect();
        assert_eq!(accumulated_cost(&graph, &path, drone), None);
        assert_eq!(
            accumulated_cost(&graph, &path, graph.vehicle("truck").unwrap()),
            Some(3.0)
        );
    }
}
