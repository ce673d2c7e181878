use anyhow::Result;

use crate::common::{EnvironmentOptions, SearchResult, TieBreak};
use crate::map::GridMap;
use crate::solver::comm::{ParentStrategy, SearchObserver, SearchRunner};
use crate::solver::Solver;

/// Grid A*: the shared expansion loop with successors parented to the node
/// that generated them.
pub struct Astar {
    hweight: f64,
    tie_break: TieBreak,
}

impl Astar {
    pub fn new(hweight: f64, tie_break: TieBreak) -> Self {
        Astar { hweight, tie_break }
    }
}

impl Solver for Astar {
    fn solve_observed(
        &mut self,
        map: &GridMap,
        options: &EnvironmentOptions,
        observer: Option<&mut dyn SearchObserver>,
    ) -> Result<SearchResult> {
        SearchRunner::new(
            map,
            options,
            self.hweight,
            self.tie_break,
            ParentStrategy::Baseline,
        )
        .run(observer)
    }
}
