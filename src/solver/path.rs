use crate::common::Point;
use crate::solver::comm::Node;

/// Walks the parent chain from the closed goal entry back to the root,
/// yielding coordinates in start..goal order.
pub(crate) fn waypoint_path(arena: &[Node], goal_idx: usize) -> Vec<Point> {
    let mut waypoints = Vec::new();
    let mut at = Some(goal_idx);
    while let Some(idx) = at {
        waypoints.push(arena[idx].pos());
        at = arena[idx].parent;
    }
    waypoints.reverse();
    waypoints
}

/// Rasterizes consecutive waypoints into the full cell sequence. Integer
/// Bresenham stepping, major axis chosen by the larger absolute delta; each
/// segment appends every stepped cell through its endpoint.
pub(crate) fn cell_path(waypoints: &[Point]) -> Vec<Point> {
    let Some(&first) = waypoints.first() else {
        return Vec::new();
    };
    let mut cells = vec![first];

    for pair in waypoints.windows(2) {
        let (i1, j1) = pair[0];
        let (i2, j2) = pair[1];
        if i1 == i2 && j1 == j2 {
            continue;
        }

        let delta_i = (i1 - i2).abs();
        let delta_j = (j1 - j2).abs();
        let step_i = if i1 < i2 { 1 } else { -1 };
        let step_j = if j1 < j2 { 1 } else { -1 };

        let mut current_i = i1;
        let mut current_j = j1;

        if delta_i > delta_j {
            let mut error = (delta_j << 1) - delta_i;
            while current_i != i2 {
                current_i += step_i;
                if error >= 0 {
                    current_j += step_j;
                    error -= delta_i << 1;
                }
                error += delta_j << 1;
                cells.push((current_i, current_j));
            }
        } else {
            let mut error = (delta_i << 1) - delta_j;
            while current_j != j2 {
                current_j += step_j;
                if error >= 0 {
                    current_i += step_i;
                    error -= delta_j << 1;
                }
                error += delta_i << 1;
                cells.push((current_i, current_j));
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacent(a: Point, b: Point) -> bool {
        (a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1 && a != b
    }

    fn arena_node(i: i32, j: i32, parent: Option<usize>) -> Node {
        Node {
            i,
            j,
            f: 0.0,
            g: 0.0,
            h: 0.0,
            parent,
        }
    }

    #[test]
    fn test_waypoints_run_start_to_goal() {
        let arena = vec![
            arena_node(0, 0, None),
            arena_node(0, 3, Some(0)),
            arena_node(2, 5, Some(1)),
        ];
        assert_eq!(waypoint_path(&arena, 2), vec![(0, 0), (0, 3), (2, 5)]);
    }

    #[test]
    fn test_straight_segment_rasterization() {
        let cells = cell_path(&[(0, 0), (0, 3)]);
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (0, 3)]);

        let cells = cell_path(&[(3, 1), (0, 1)]);
        assert_eq!(cells, vec![(3, 1), (2, 1), (1, 1), (0, 1)]);
    }

    #[test]
    fn test_oblique_segment_stays_adjacent() {
        let cells = cell_path(&[(0, 0), (2, 5)]);
        assert_eq!(*cells.first().unwrap(), (0, 0));
        assert_eq!(*cells.last().unwrap(), (2, 5));
        assert_eq!(cells.len(), 6);
        for pair in cells.windows(2) {
            assert!(adjacent(pair[0], pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_multi_segment_path_has_no_duplicate_joints() {
        let cells = cell_path(&[(0, 0), (0, 2), (2, 2)]);
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_degenerate_paths() {
        assert!(cell_path(&[]).is_empty());
        assert_eq!(cell_path(&[(4, 4)]), vec![(4, 4)]);
        // Identical consecutive waypoints contribute nothing.
        assert_eq!(cell_path(&[(1, 1), (1, 1), (1, 2)]), vec![(1, 1), (1, 2)]);
    }
}
