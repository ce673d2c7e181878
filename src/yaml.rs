use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One planning task: a map file plus the route endpoints, as YAML.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskYaml {
    pub map: String,
    pub start: [i32; 2],
    pub goal: [i32; 2],
}

impl TaskYaml {
    pub fn from_yaml(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open task file {path}"))?;
        let reader = BufReader::new(file);
        let task = serde_yaml::from_reader(reader)
            .with_context(|| format!("task file {path} is not valid YAML"))?;
        Ok(task)
    }
}
