use std::collections::{hash_map, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityMap(HashMap<String, f64>);

impl ProbabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, driver: impl Into<String>, probability: f64) -> Option<f64> {
        self.0.insert(driver.into(), probability)
    }

    pub fn get(&self, driver: &str) -> Option<f64> {
        self.0.get(driver).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, f64> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ProbabilityMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(driver, probability)| (driver.into(), probability))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ProbabilityMap {
    type Item = (&'a String, &'a f64);
    type IntoIter = hash_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The `error` flag in the body is the only discriminant, never the HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SimulationResult {
    Success {
        probabilities: ProbabilityMap,
        simulations_run: u64,
        remaining_races: u64,
    },
    Failure {
        message: String,
    },
}

impl SimulationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Driver(String),
    /// No driver could be picked because the probability map was empty.
    Unknown,
}

impl Winner {
    pub fn driver_name(&self) -> Option<&str> {
        match self {
            Self::Driver(name) => Some(name),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub driver: String,
    pub probability: f64,
    pub rank: usize,
}
