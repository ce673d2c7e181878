use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::warn;

use crate::common::{EnvironmentOptions, Metric, Point, TieBreak};

#[derive(Parser, Debug)]
#[command(
    name = "Rust Any-Angle",
    about = "Grid A* and Theta* any-angle pathfinding implemented in Rust.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to the map file", default_value = "maps/demo-8x8.map")]
    pub map_path: String,

    #[arg(long, help = "Path to a MovingAI scenario file with routes")]
    pub scen_path: Option<String>,

    #[arg(long, help = "Scenario bucket to draw the route from")]
    pub bucket: Option<usize>,

    #[arg(long, help = "Path to a YAML task file with map and route")]
    pub task_path: Option<String>,

    #[arg(long, help = "Start cell as row,col", value_delimiter = ',')]
    pub start: Option<Vec<i32>>,

    #[arg(long, help = "Goal cell as row,col", value_delimiter = ',')]
    pub goal: Option<Vec<i32>>,

    #[arg(long, help = "Search algorithm to use", default_value = "theta")]
    pub algorithm: String,

    #[arg(long, help = "Heuristic weight, at least 1", default_value_t = 1.0)]
    pub heuristic_weight: f64,

    #[arg(long, help = "Distance metric for the heuristic", default_value = "euclidean")]
    pub metric: String,

    #[arg(long, help = "Tie-break policy for equal F values", default_value = "g-max")]
    pub tie_break: String,

    #[arg(long, help = "Disable diagonal moves", default_value_t = false)]
    pub no_diagonal: bool,

    #[arg(
        long,
        help = "Allow diagonal moves to cut obstacle corners",
        default_value_t = false
    )]
    pub cut_corners: bool,

    #[arg(
        long,
        help = "Seed for the random number generator",
        default_value_t = 0
    )]
    pub seed: usize,

    #[arg(long, help = "Write the search result as JSON to this path")]
    pub output_path: Option<String>,

    #[arg(
        long,
        help = "Log open/closed snapshots at every expansion",
        default_value_t = false
    )]
    pub log_search: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Astar,
    Theta,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub map_path: String,
    pub scen_path: Option<String>,
    pub bucket: Option<usize>,
    pub task_path: Option<String>,
    pub start: Option<Point>,
    pub goal: Option<Point>,
    pub algorithm: Algorithm,
    pub heuristic_weight: f64,
    pub tie_break: TieBreak,
    pub options: EnvironmentOptions,
    pub seed: usize,
    pub output_path: Option<String>,
    pub log_search: bool,
}

impl Config {
    pub fn new(cli: &Cli) -> Result<Self> {
        let algorithm = match cli.algorithm.as_str() {
            "astar" => Algorithm::Astar,
            "theta" => Algorithm::Theta,
            other => {
                return Err(anyhow!(
                    "unknown algorithm {other:?}, expected astar or theta"
                ))
            }
        };

        let metric = match cli.metric.as_str() {
            "euclidean" => Metric::Euclidean,
            "manhattan" => Metric::Manhattan,
            "diagonal" => Metric::Diagonal,
            "chebyshev" => Metric::Chebyshev,
            other => return Err(anyhow!("unknown metric {other:?}")),
        };

        let tie_break = match cli.tie_break.as_str() {
            "g-min" => TieBreak::GMin,
            "g-max" => TieBreak::GMax,
            other => {
                return Err(anyhow!(
                    "unknown tie-break {other:?}, expected g-min or g-max"
                ))
            }
        };

        let mut heuristic_weight = cli.heuristic_weight;
        if heuristic_weight < 1.0 {
            warn!("Heuristic weight {heuristic_weight} is below 1, clamping to 1");
            heuristic_weight = 1.0;
        }
        if algorithm == Algorithm::Theta && metric != Metric::Euclidean {
            warn!("Metric {metric:?} is not admissible for any-angle search");
        }

        let as_point = |cell: &Option<Vec<i32>>| -> Result<Option<Point>> {
            match cell {
                None => Ok(None),
                Some(v) if v.len() == 2 => Ok(Some((v[0], v[1]))),
                Some(v) => Err(anyhow!("expected a row,col pair, got {v:?}")),
            }
        };

        Ok(Config {
            map_path: cli.map_path.clone(),
            scen_path: cli.scen_path.clone(),
            bucket: cli.bucket,
            task_path: cli.task_path.clone(),
            start: as_point(&cli.start)?,
            goal: as_point(&cli.goal)?,
            algorithm,
            heuristic_weight,
            tie_break,
            options: EnvironmentOptions {
                allow_diagonal: !cli.no_diagonal,
                cut_corners: cli.cut_corners,
                metric,
            },
            seed: cli.seed,
            output_path: cli.output_path.clone(),
            log_search: cli.log_search,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.start.is_some() != self.goal.is_some() {
            return Err(anyhow!("--start and --goal must be given together"));
        }
        if self.heuristic_weight < 1.0 {
            return Err(anyhow!(
                "heuristic weight must be at least 1.0, got {}",
                self.heuristic_weight
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["anyangle_rust"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::new(&cli(&[])).unwrap();
        assert_eq!(config.algorithm, Algorithm::Theta);
        assert_eq!(config.tie_break, TieBreak::GMax);
        assert_eq!(config.options.metric, Metric::Euclidean);
        assert!(config.options.allow_diagonal);
        assert!(!config.options.cut_corners);
        assert_eq!(config.heuristic_weight, 1.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_unknown_names() {
        assert!(Config::new(&cli(&["--algorithm", "dijkstra"])).is_err());
        assert!(Config::new(&cli(&["--metric", "taxicab"])).is_err());
        assert!(Config::new(&cli(&["--tie-break", "random"])).is_err());
    }

    #[test]
    fn test_low_weight_is_clamped() {
        let config = Config::new(&cli(&["--heuristic-weight", "0.5"])).unwrap();
        assert_eq!(config.heuristic_weight, 1.0);
    }

    #[test]
    fn test_route_flags_come_in_pairs() {
        let config = Config::new(&cli(&["--start", "1,0"])).unwrap();
        assert!(config.validate().is_err());

        let config = Config::new(&cli(&["--start", "1,0", "--goal", "4,7"])).unwrap();
        config.validate().unwrap();
        assert_eq!(config.start, Some((1, 0)));
        assert_eq!(config.goal, Some((4, 7)));
    }
}
