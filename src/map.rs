use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::common::Point;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("start cell ({0}, {1}) is off the grid")]
    StartOffGrid(i32, i32),
    #[error("goal cell ({0}, {1}) is off the grid")]
    GoalOffGrid(i32, i32),
    #[error("start cell ({0}, {1}) is on an obstacle")]
    StartOnObstacle(i32, i32),
    #[error("goal cell ({0}, {1}) is on an obstacle")]
    GoalOnObstacle(i32, i32),
    #[error("cell ({0}, {1}) queried outside grid bounds")]
    OutOfBounds(i32, i32),
}

/// Immutable occupancy grid plus the start/goal pair of one planning task.
///
/// Start and goal are validated at construction; afterwards the map only
/// answers bounds and obstacle queries.
#[derive(Debug, Clone)]
pub struct GridMap {
    height: i32,
    width: i32,
    grid: Vec<Vec<bool>>, // true = obstacle
    start: Point,
    goal: Point,
}

impl GridMap {
    /// Builds a map from raw cell values: 0 is traversable, any nonzero
    /// value is an obstacle.
    pub fn new(cells: Vec<Vec<i32>>, start: Point, goal: Point) -> Result<Self, MapError> {
        let height = cells.len() as i32;
        let width = if cells.is_empty() {
            0
        } else {
            cells[0].len() as i32
        };

        let grid: Vec<Vec<bool>> = cells
            .into_iter()
            .map(|row| row.into_iter().map(|v| v != 0).collect())
            .collect();

        let map = GridMap {
            height,
            width,
            grid,
            start,
            goal,
        };

        if !map.in_bounds(start.0, start.1) {
            return Err(MapError::StartOffGrid(start.0, start.1));
        }
        if !map.in_bounds(goal.0, goal.1) {
            return Err(MapError::GoalOffGrid(goal.0, goal.1));
        }
        if map.is_obstacle(start.0, start.1)? {
            return Err(MapError::StartOnObstacle(start.0, start.1));
        }
        if map.is_obstacle(goal.0, goal.1)? {
            return Err(MapError::GoalOnObstacle(goal.0, goal.1));
        }

        Ok(map)
    }

    /// Reads a MovingAI `.map` file. The route endpoints come from the
    /// caller since the format carries no start/goal.
    pub fn from_file(path: &str, start: Point, goal: Point) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open map file {path}"))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let _type = lines
            .next()
            .context("map file is empty")?
            .context("failed to read map type line")?;
        let height = lines
            .next()
            .context("missing height line")??
            .split_whitespace()
            .last()
            .context("malformed height line")?
            .parse::<usize>()
            .context("height is not a number")?;
        let width = lines
            .next()
            .context("missing width line")??
            .split_whitespace()
            .last()
            .context("malformed width line")?
            .parse::<usize>()
            .context("width is not a number")?;
        let _map = lines.next().context("missing map header line")??;

        let mut cells = Vec::with_capacity(height);
        for line in lines.take(height) {
            let row: Vec<i32> = line?.chars().map(|ch| i32::from(ch != '.')).collect();
            if row.len() != width {
                anyhow::bail!("map row {} does not match width {width}", cells.len());
            }
            cells.push(row);
        }
        if cells.len() != height {
            anyhow::bail!("map has {} rows, expected {height}", cells.len());
        }

        Ok(GridMap::new(cells, start, goal)?)
    }

    pub fn in_bounds(&self, i: i32, j: i32) -> bool {
        i >= 0 && i < self.height && j >= 0 && j < self.width
    }

    /// Fails with `MapError::OutOfBounds` for off-grid coordinates;
    /// callers are expected to bounds-check first.
    pub fn is_obstacle(&self, i: i32, j: i32) -> Result<bool, MapError> {
        if !self.in_bounds(i, j) {
            return Err(MapError::OutOfBounds(i, j));
        }
        Ok(self.grid[i as usize][j as usize])
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_3x3() -> Vec<Vec<i32>> {
        vec![vec![0; 3]; 3]
    }

    #[test]
    fn test_construction_validates_endpoints() {
        assert_eq!(
            GridMap::new(open_3x3(), (-1, 0), (2, 2)).unwrap_err(),
            MapError::StartOffGrid(-1, 0)
        );
        assert_eq!(
            GridMap::new(open_3x3(), (0, 0), (2, 3)).unwrap_err(),
            MapError::GoalOffGrid(2, 3)
        );

        let mut blocked = open_3x3();
        blocked[0][0] = 100;
        assert_eq!(
            GridMap::new(blocked.clone(), (0, 0), (2, 2)).unwrap_err(),
            MapError::StartOnObstacle(0, 0)
        );
        assert_eq!(
            GridMap::new(blocked, (2, 2), (0, 0)).unwrap_err(),
            MapError::GoalOnObstacle(0, 0)
        );
    }

    #[test]
    fn test_obstacle_query_is_bounds_checked() {
        let map = GridMap::new(open_3x3(), (0, 0), (2, 2)).unwrap();
        assert_eq!(map.is_obstacle(3, 0).unwrap_err(), MapError::OutOfBounds(3, 0));
        assert_eq!(map.is_obstacle(0, -1).unwrap_err(), MapError::OutOfBounds(0, -1));
        assert!(!map.is_obstacle(1, 1).unwrap());
    }

    #[test]
    fn test_nonzero_cells_are_obstacles() {
        let mut cells = open_3x3();
        cells[1][1] = 1;
        cells[1][2] = 100;
        let map = GridMap::new(cells, (0, 0), (2, 2)).unwrap();
        assert!(map.is_obstacle(1, 1).unwrap());
        assert!(map.is_obstacle(1, 2).unwrap());
        assert!(!map.is_obstacle(0, 1).unwrap());
    }

    #[test]
    fn test_read_map() {
        let map = GridMap::from_file("maps/demo-8x8.map", (1, 0), (4, 7)).unwrap();

        assert_eq!(map.height(), 8);
        assert_eq!(map.width(), 8);

        assert!(!map.is_obstacle(0, 0).unwrap());
        assert!(map.is_obstacle(1, 1).unwrap());
        assert!(map.is_obstacle(4, 6).unwrap());
        assert!(!map.is_obstacle(4, 7).unwrap());
    }
}
