use anyangle_rust::common::Point;
use anyangle_rust::config::{Algorithm, Cli, Config};
use anyangle_rust::map::GridMap;
use anyangle_rust::scenario::Scenario;
use anyangle_rust::solver::{Astar, Solver, Theta, TraceLogger};
use anyangle_rust::yaml::TaskYaml;

use anyhow::{anyhow, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, Level};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();
    let cli = Cli::parse();
    let config = Config::new(&cli)?;
    config.validate()?;

    let (map_path, start, goal) = resolve_route(&config)?;
    let map = GridMap::from_file(&map_path, start, goal)
        .with_context(|| format!("error with map file: {map_path}"))?;
    info!(
        "Map {}x{}, start {:?}, goal {:?}",
        map.height(),
        map.width(),
        map.start(),
        map.goal()
    );

    let mut solver: Box<dyn Solver> = match config.algorithm {
        Algorithm::Astar => {
            info!("Using A* search algorithm");
            Box::new(Astar::new(config.heuristic_weight, config.tie_break))
        }
        Algorithm::Theta => {
            info!("Using Theta* search algorithm");
            Box::new(Theta::new(config.heuristic_weight, config.tie_break))
        }
    };

    let mut logger = TraceLogger::default();
    let result = if config.log_search {
        solver.solve_observed(&map, &config.options, Some(&mut logger))?
    } else {
        solver.solve(&map, &config.options)?
    };

    result.stats.print(result.found, result.cost);
    if result.found {
        info!("waypoints: {:?}", result.waypoints);
        info!("cells: {:?}", result.cells);
    } else {
        error!("no path between {start:?} and {goal:?}");
    }

    if let Some(output_path) = &config.output_path {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("error writing result to {output_path}"))?;
        info!("Result written to {output_path}");
    }

    Ok(())
}

/// Explicit coordinates win, then a scenario route, then the task file.
fn resolve_route(config: &Config) -> anyhow::Result<(String, Point, Point)> {
    if let (Some(start), Some(goal)) = (config.start, config.goal) {
        return Ok((config.map_path.clone(), start, goal));
    }

    if let Some(scen_path) = &config.scen_path {
        let scen = Scenario::load_from_scen(scen_path)?;
        let mut rng = StdRng::seed_from_u64(config.seed as u64);
        let route = scen.choose_route(config.bucket, &mut rng)?;
        return Ok((config.map_path.clone(), route.start, route.goal));
    }

    if let Some(task_path) = &config.task_path {
        let task = TaskYaml::from_yaml(task_path)?;
        return Ok((
            task.map,
            (task.start[0], task.start[1]),
            (task.goal[0], task.goal[1]),
        ));
    }

    Err(anyhow!(
        "no route given: pass --start/--goal, --scen-path, or --task-path"
    ))
}
