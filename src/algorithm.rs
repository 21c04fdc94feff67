mod annealing;
mod astar;
mod bfs;
mod dfs;
mod greedy;
mod hill_climbing;

pub(crate) use annealing::simulated_annealing_search;
pub(crate) use astar::{a_star_search, uniform_cost_search};
pub(crate) use bfs::bfs_search;
pub(crate) use dfs::{dfs_search, iterative_deepening_search};
pub(crate) use greedy::greedy_search;
pub(crate) use hill_climbing::hill_climbing_search;

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::common::{Path, VehicleType, ZoneId};
use crate::graph::Graph;
use crate::oracle;
use crate::stat::Stats;

type Trace = HashMap<ZoneId, ZoneId>;

/// An oracle-approved path for one vehicle type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub path: Path,
    pub cost: f64,
    pub rescued: u32,
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    zone: ZoneId,
    f_cost: f64,
    g_cost: f64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            // Higher g cost has higher priority
            .then_with(|| other.g_cost.total_cmp(&self.g_cost))
            .then_with(|| self.zone.cmp(&other.zone))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Heuristic score used by the informed strategies. The search destination
/// always scores zero.
fn heuristic(graph: &Graph, zone: ZoneId, destination: ZoneId) -> f64 {
    if zone == destination {
        0.0
    } else {
        graph.heuristic(zone)
    }
}

fn construct_path(trace: &Trace, mut current: ZoneId) -> Path {
    let mut path = vec![current];
    while let Some(&previous) = trace.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Runs a destination-reaching path through the oracle and keeps the books.
fn evaluate_candidate(
    graph: &Graph,
    path: Path,
    vehicle: &VehicleType,
    stats: &mut Stats,
) -> Option<Candidate> {
    match oracle::evaluate(graph, &path, vehicle) {
        Some(evaluation) => {
            stats.candidates += 1;
            trace!(
                "{} can complete {:?} with cost {}",
                vehicle.tag,
                graph.path_names(&path),
                evaluation.cost
            );
            Some(Candidate {
                path,
                cost: evaluation.cost,
                rescued: evaluation.rescued,
            })
        }
        None => {
            stats.rejected += 1;
            debug!(
                "{} cannot complete {:?}",
                vehicle.tag,
                graph.path_names(&path)
            );
            None
        }
    }
}

/// Replaces `best` only on a strictly lower cost, so the first of equal
/// candidates wins.
fn keep_best(best: &mut Option<Candidate>, candidate: Candidate) {
    if best
        .as_ref()
        .map_or(true, |current| candidate.cost < current.cost)
    {
        *best = Some(candidate);
    }
}

fn best_candidate(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.into_iter().fold(None, |mut best, candidate| {
        keep_best(&mut best, candidate);
        best
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_open_node_order() {
        let mut open = BTreeSet::new();
        open.insert(OpenNode { zone: 3, f_cost: 2.0, g_cost: 1.0 });
        open.insert(OpenNode { zone: 1, f_cost: f64::INFINITY, g_cost: 0.0 });
        open.insert(OpenNode { zone: 2, f_cost: 2.0, g_cost: 1.5 });
        open.insert(OpenNode { zone: 4, f_cost: 0.5, g_cost: 0.5 });

        let order: Vec<_> = std::iter::from_fn(|| open.pop_first().map(|node| node.zone)).collect();
        assert_eq!(order, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_construct_path() {
        let trace = Trace::from([(3, 2), (2, 0), (5, 3)]);
        assert_eq!(construct_path(&trace, 5), vec![0, 2, 3, 5]);
        assert_eq!(construct_path(&trace, 0), vec![0]);
    }

    #[test]
    fn test_best_candidate_prefers_first_on_ties() {
        let candidate = |path: Path, cost| Candidate { path, cost, rescued: 1 };
        let best = best_candidate(vec![
            candidate(vec![0, 1], 3.0),
            candidate(vec![0, 2], 1.0),
            candidate(vec![0, 3], 1.0),
        ]);
        assert_eq!(best.unwrap().path, vec![0, 2]);
        assert_eq!(best_candidate(Vec::new()), None);
    }
}
