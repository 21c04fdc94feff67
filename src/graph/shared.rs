use std::sync::{Arc, PoisonError, RwLock};

use super::Graph;

/// The single mutation boundary around a graph shared between the engine and
/// the dynamic-conditions task.
///
/// Searches work on a [`SharedGraph::snapshot`] so they see one consistent
/// state for their entire run. Distribution and perturbation go through
/// [`SharedGraph::write`], which holds the write lock for the whole closure.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        SharedGraph {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub fn snapshot(&self) -> Graph {
        self.read(Graph::clone)
    }

    pub fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
        // A poisoned lock still guards a usable graph.
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::two_zone_graph;
    use super::*;

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let shared = SharedGraph::new(two_zone_graph(10.0, false));
        let snapshot = shared.snapshot();

        shared.write(|graph| graph.set_route_blocked(0, 1, true));

        assert!(!snapshot.route(0, 1).unwrap().blocked);
        assert!(shared.read(|graph| graph.route(0, 1).unwrap().blocked));
    }

    #[test]
    fn test_writes_from_other_threads_are_visible() {
        let shared = SharedGraph::new(two_zone_graph(10.0, false));
        let writer = shared.clone();
        std::thread::spawn(move || writer.write(|graph| graph.zone_mut(1).population = 7))
            .join()
            .unwrap();
        assert_eq!(shared.read(|graph| graph.zone(1).population), 7);
    }
}
