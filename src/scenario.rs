use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{anyhow, Context, Result};
use rand::prelude::*;
use tracing::info;

use crate::common::Point;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub start: Point,
    pub goal: Point,
}

type Bucket = Vec<Route>;

/// Routes read from a MovingAI `.scen` file, grouped by bucket.
#[derive(Debug)]
pub struct Scenario {
    pub map: String,
    pub map_width: usize,
    pub map_height: usize,
    pub buckets: HashMap<usize, Bucket>,
}

impl Scenario {
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let file =
            File::open(path).with_context(|| format!("failed to open scenario file {path}"))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        // First line is "version x.x".
        let _version = lines.next().context("scenario file is empty")??;

        let mut scenario = Scenario {
            map: String::new(),
            map_width: 0,
            map_height: 0,
            buckets: HashMap::new(),
        };

        for (number, line) in lines.enumerate() {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 8 {
                return Err(anyhow!("scenario line {} is malformed", number + 2));
            }
            let bucket_index: usize = parts[0]
                .parse()
                .with_context(|| format!("bad bucket on scenario line {}", number + 2))?;

            // The format stores x (column) before y (row).
            let route = Route {
                start: (parts[5].parse()?, parts[4].parse()?),
                goal: (parts[7].parse()?, parts[6].parse()?),
            };

            if scenario.map.is_empty() {
                scenario.map = parts[1].to_string();
                scenario.map_width = parts[2].parse()?;
                scenario.map_height = parts[3].parse()?;
            }

            scenario
                .buckets
                .entry(bucket_index)
                .or_default()
                .push(route);
        }

        Ok(scenario)
    }

    /// Picks one route, either from the given bucket or from the whole file.
    pub fn choose_route<R: Rng + ?Sized>(
        &self,
        bucket: Option<usize>,
        rng: &mut R,
    ) -> Result<Route> {
        let route = match bucket {
            Some(index) => {
                let bucket = self
                    .buckets
                    .get(&index)
                    .ok_or_else(|| anyhow!("bucket {index} not found"))?;
                bucket.choose(rng)
            }
            None => {
                let mut routes: Vec<&Route> = self.buckets.values().flatten().collect();
                routes.sort_by_key(|r| (r.start, r.goal));
                routes.choose(rng).copied()
            }
        }
        .ok_or_else(|| anyhow!("scenario holds no routes"))?
        .clone();

        info!("Chose route: {route:?}");
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_read_scenario() {
        let scen = Scenario::load_from_scen("maps/demo-8x8.scen").unwrap();

        assert_eq!(scen.map, "demo-8x8.map");
        assert_eq!(scen.map_width, 8);
        assert_eq!(scen.map_height, 8);
        assert_eq!(scen.buckets.len(), 2);

        let mut rng = StdRng::seed_from_u64(0);
        let route = scen.choose_route(Some(0), &mut rng).unwrap();
        assert_eq!(
            route,
            Route {
                start: (1, 0),
                goal: (4, 7),
            }
        );

        let route = scen.choose_route(Some(1), &mut rng).unwrap();
        assert_eq!(
            route,
            Route {
                start: (0, 0),
                goal: (7, 7),
            }
        );

        assert!(scen.choose_route(Some(9), &mut rng).is_err());
    }
}
