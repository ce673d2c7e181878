use anyhow::Result;

use crate::common::{EnvironmentOptions, Metric, Point, SearchResult, TieBreak};
use crate::map::{GridMap, MapError};
use crate::solver::comm::{ClosedList, Node, ParentStrategy, SearchObserver, SearchRunner};
use crate::solver::Solver;

/// Rasterized visibility test between two cells.
///
/// Endpoints must be on the grid and traversable. Horizontal and vertical
/// segments need every strictly-intermediate cell free. Oblique segments
/// walk a Bresenham rasterization; without `cut_corners` a diagonal step is
/// additionally blocked when the two orthogonal cells it squeezes between
/// are both obstacles.
pub fn line_of_sight(
    from: Point,
    to: Point,
    map: &GridMap,
    cut_corners: bool,
) -> Result<bool, MapError> {
    let (i1, j1) = from;
    let (i2, j2) = to;

    if !map.in_bounds(i1, j1) || !map.in_bounds(i2, j2) {
        return Ok(false);
    }
    if map.is_obstacle(i1, j1)? || map.is_obstacle(i2, j2)? {
        return Ok(false);
    }
    if i1 == i2 && j1 == j2 {
        return Ok(true);
    }

    let delta_i = (i1 - i2).abs();
    let delta_j = (j1 - j2).abs();
    let step_i = if i1 < i2 { 1 } else { -1 };
    let step_j = if j1 < j2 { 1 } else { -1 };

    let mut current_i = i1;
    let mut current_j = j1;

    if delta_i == 0 {
        while current_j != j2 - step_j {
            current_j += step_j;
            if map.is_obstacle(current_i, current_j)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }
    if delta_j == 0 {
        while current_i != i2 - step_i {
            current_i += step_i;
            if map.is_obstacle(current_i, current_j)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    if cut_corners {
        // Only the rasterized cells themselves must be free.
        if delta_i > delta_j {
            let mut error = (delta_j << 1) - delta_i;
            for _ in 0..delta_i - 1 {
                current_i += step_i;
                if error >= 0 {
                    current_j += step_j;
                    error -= delta_i << 1;
                }
                error += delta_j << 1;
                if map.is_obstacle(current_i, current_j)? {
                    return Ok(false);
                }
            }
        } else {
            let mut error = (delta_i << 1) - delta_j;
            for _ in 0..delta_j - 1 {
                current_j += step_j;
                if error >= 0 {
                    current_i += step_i;
                    error -= delta_j << 1;
                }
                error += delta_i << 1;
                if map.is_obstacle(current_i, current_j)? {
                    return Ok(false);
                }
            }
        }
    } else if delta_i > delta_j {
        let mut error = (delta_j << 1) - delta_i;
        for step in 0..delta_i {
            if step > 0 && map.is_obstacle(current_i, current_j)? {
                return Ok(false);
            }
            if error >= 0 {
                // A diagonal step may not squeeze between two obstacles.
                if map.is_obstacle(current_i + step_i, current_j)?
                    && map.is_obstacle(current_i, current_j + step_j)?
                {
                    return Ok(false);
                }
                current_j += step_j;
                error -= delta_i << 1;
            }
            error += delta_j << 1;
            current_i += step_i;
        }
    } else {
        let mut error = (delta_i << 1) - delta_j;
        for step in 0..delta_j {
            if step > 0 && map.is_obstacle(current_i, current_j)? {
                return Ok(false);
            }
            if error >= 0 {
                if map.is_obstacle(current_i + step_i, current_j)?
                    && map.is_obstacle(current_i, current_j + step_j)?
                {
                    return Ok(false);
                }
                current_i += step_i;
                error -= delta_j << 1;
            }
            error += delta_i << 1;
            current_j += step_j;
        }
    }

    Ok(true)
}

/// Any-angle re-parenting rule: a fresh successor is re-attached to its
/// grandparent whenever line of sight holds, skipping the intermediate hop.
pub(crate) fn reset_parent(
    mut current: Node,
    parent_idx: usize,
    closed: &ClosedList,
    map: &GridMap,
    options: &EnvironmentOptions,
) -> Result<Node, MapError> {
    let Some(grand_idx) = closed.get(parent_idx).parent else {
        return Ok(current);
    };
    let grand = closed.get(grand_idx);

    if line_of_sight(grand.pos(), current.pos(), map, options.cut_corners)? {
        // Shortcut edges are always costed with Euclidean distance,
        // independent of the heuristic metric.
        current.g = grand.g + Metric::Euclidean.distance(grand.pos(), current.pos());
        current.parent = Some(grand_idx);
    }
    Ok(current)
}

/// Theta* any-angle search: the shared expansion loop with line-of-sight
/// re-parenting applied to every successor.
pub struct Theta {
    hweight: f64,
    tie_break: TieBreak,
}

impl Theta {
    pub fn new(hweight: f64, tie_break: TieBreak) -> Self {
        Theta { hweight, tie_break }
    }
}

impl Solver for Theta {
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
            ParentStrategy::AnyAngle,
        )
        .run(observer)
    }
}
