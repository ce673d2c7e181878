use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    /// Nodes moved to the closed set.
    pub expansions: usize,
    /// Closed plus still-open nodes at termination.
    pub nodes_created: usize,
    pub time_us: u64,
}

impl Stats {
    pub fn print(&self, found: bool, cost: f64) {
        info!(
            "Path {} Cost {:?} Time(microseconds) {:?} Expanded nodes number: {:?} Created nodes number {:?}",
            if found { "found" } else { "NOT found" },
            cost,
            self.time_us,
            self.expansions,
            self.nodes_created
        );
    }
}
