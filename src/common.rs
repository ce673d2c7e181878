use serde::{Deserialize, Serialize};

use crate::stat::Stats;

/// Grid coordinate as (row, col).
pub type Point = (i32, i32);

/// Distance metric used to shape the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Euclidean,
    Manhattan,
    Diagonal,
    Chebyshev,
}

impl Metric {
    pub fn distance(&self, from: Point, to: Point) -> f64 {
        let di = (from.0 - to.0).abs() as f64;
        let dj = (from.1 - to.1).abs() as f64;
        match self {
            Metric::Euclidean => (di * di + dj * dj).sqrt(),
            Metric::Manhattan => di + dj,
            Metric::Diagonal => std::f64::consts::SQRT_2 * di.min(dj) + (di - dj).abs(),
            Metric::Chebyshev => di.max(dj),
        }
    }
}

/// Policy applied when two open nodes share the same F value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    #[serde(rename = "g-min")]
    GMin,
    #[serde(rename = "g-max")]
    GMax,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentOptions {
    pub allow_diagonal: bool,
    pub cut_corners: bool,
    pub metric: Metric,
}

impl Default for EnvironmentOptions {
    fn default() -> Self {
        EnvironmentOptions {
            allow_diagonal: true,
            cut_corners: false,
            metric: Metric::Euclidean,
        }
    }
}

/// Outcome of one search invocation. Immutable once returned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    pub found: bool,
    pub cost: f64,
    pub stats: Stats,
    /// One entry per direction change (per expansion step for plain A*).
    pub waypoints: Vec<Point>,
    /// Rasterized superset of `waypoints` holding every traversed cell.
    pub cells: Vec<Point>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_shapes() {
        let a = (0, 0);
        let b = (3, 1);
        assert!((Metric::Euclidean.distance(a, b) - 10.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(Metric::Manhattan.distance(a, b), 4.0);
        assert!((Metric::Diagonal.distance(a, b) - (std::f64::consts::SQRT_2 + 2.0)).abs() < 1e-9);
        assert_eq!(Metric::Chebyshev.distance(a, b), 3.0);
    }

    #[test]
    fn test_metric_symmetry() {
        let a = (2, 5);
        let b = (7, 1);
        for metric in [
            Metric::Euclidean,
            Metric::Manhattan,
            Metric::Diagonal,
            Metric::Chebyshev,
        ] {
            assert_eq!(metric.distance(a, b), metric.distance(b, a));
            assert_eq!(metric.distance(a, a), 0.0);
        }
    }
}
