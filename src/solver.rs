mod astar;
mod comm;
mod path;
mod theta;

pub use astar::Astar;
pub use comm::{Node, SearchObserver, SearchSnapshot, TraceLogger};
pub use theta::{line_of_sight, Theta};

use anyhow::Result;

use crate::common::{EnvironmentOptions, SearchResult};
use crate::map::GridMap;

pub trait Solver {
    fn solve_observed(
        &mut self,
        map: &GridMap,
        options: &EnvironmentOptions,
        observer: Option<&mut dyn SearchObserver>,
    ) -> Result<SearchResult>;

    fn solve(&mut self, map: &GridMap, options: &EnvironmentOptions) -> Result<SearchResult> {
        self.solve_observed(map, options, None)
    }
}
