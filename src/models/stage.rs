use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One named transformation at a fixed position in the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Transform name, passed to the tool as `--<name>`
    pub name: String,
    /// Position in the pipeline (0-based)
    pub order: usize,
}

/// Errors raised while building a stage list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageListError {
    #[error("stage at position {0} has an empty name")]
    EmptyName(usize),
    #[error("stage '{name}' appears more than once (positions {first} and {second})")]
    Duplicate {
        name: String,
        first: usize,
        second: usize,
    },
}

/// An ordered list of uniquely named stages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageList {
    stages: Vec<Stage>,
}

impl StageList {
    /// Build a stage list from transform names, in pipeline order
    pub fn from_names<I, S>(names: I) -> Result<Self, StageListError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stages: Vec<Stage> = Vec::new();
        let mut seen = HashSet::new();

        for (order, name) in names.into_iter().enumerate() {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(StageListError::EmptyName(order));
            }
            if !seen.insert(name.clone()) {
                let first = stages
                    .iter()
                    .position(|s| s.name == name)
                    .unwrap_or_default();
                return Err(StageListError::Duplicate {
                    name,
                    first,
                    second: order,
                });
            }
            stages.push(Stage { name, order });
        }

        Ok(Self { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stage> {
        self.stages.iter()
    }

    pub fn get(&self, order: usize) -> Option<&Stage> {
        self.stages.get(order)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name.as_str())
    }
}

impl<'a> IntoIterator for &'a StageList {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}
