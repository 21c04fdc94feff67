use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub expanded_nodes: usize,
    pub candidates: usize,
    pub rejected: usize,
    pub time_us: usize,
}

impl Stats {
    pub(crate) fn print(&self, strategy: &str) {
        info!(
            "Strategy {strategy} Time(microseconds) {:?} Expanded nodes {:?} Feasible candidates {:?} Rejected candidates {:?}",
            self.time_us, self.expanded_nodes, self.candidates, self.rejected
        );
    }
}
