use serde::Serialize;
use shared::{
    assets::{asset_for_winner, DriverAsset},
    domain::{RankedEntry, SimulationResult, Winner},
    standings::{derive_winner, rank},
};

use crate::query::QueryState;

pub const IDLE_PROMPT: &str = "Start a simulation to see the championship odds.";
pub const LOADING_MESSAGE: &str = "Simulating championship...";
pub const CONNECTIVITY_MESSAGE: &str = "Error while fetching simulation results.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum SimulationView {
    Idle,
    Loading,
    ConnectivityError,
    ApiError { message: String },
    Standings(StandingsView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsView {
    pub winner: Winner,
    pub asset: DriverAsset,
    pub entries: Vec<RankedEntry>,
    pub simulations_run: u64,
    pub remaining_races: u64,
}

impl SimulationView {
    pub fn from_state(state: &QueryState) -> Self {
        match state {
            QueryState::NotStarted => Self::Idle,
            QueryState::Pending => Self::Loading,
            QueryState::Failed(_) => Self::ConnectivityError,
            QueryState::Succeeded(result) => Self::from_result(result),
        }
    }

    pub fn from_result(result: &SimulationResult) -> Self {
        match result {
            SimulationResult::Failure { message } => Self::ApiError {
                message: message.clone(),
            },
            SimulationResult::Success {
                probabilities,
                simulations_run,
                remaining_races,
            } => {
                let winner = derive_winner(probabilities);
                Self::Standings(StandingsView {
                    asset: *asset_for_winner(&winner),
                    winner,
                    entries: rank(probabilities),
                    simulations_run: *simulations_run,
                    remaining_races: *remaining_races,
                })
            }
        }
    }

    pub fn headline(&self) -> String {
        match self {
            Self::Idle => IDLE_PROMPT.to_string(),
            Self::Loading => LOADING_MESSAGE.to_string(),
            Self::ConnectivityError => CONNECTIVITY_MESSAGE.to_string(),
            Self::ApiError { message } => format!("API Error: {message}"),
            Self::Standings(standings) => match &standings.winner {
                Winner::Driver(name) => format!(
                    "Projected champion: {name} ({} simulations, {} races remaining)",
                    standings.simulations_run, standings.remaining_races
                ),
                Winner::Unknown => format!(
                    "No projected champion ({} simulations, {} races remaining)",
                    standings.simulations_run, standings.remaining_races
                ),
            },
        }
    }
}

pub fn format_probability(probability: f64) -> String {
    format!("{probability:.2}%")
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
