use std::sync::Arc;

use parking_lot::Mutex;
use shared::domain::SimulationResult;
use tokio::{
    sync::watch,
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, error, info, warn};

use crate::{error::FetchError, transport::SimulationTransport};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    NotStarted,
    Pending,
    Succeeded(SimulationResult),
    Failed(FetchError),
}

impl QueryState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    AlreadyPending,
}

struct AttemptSlot {
    generation: u64,
    task: Option<JoinHandle<()>>,
    fetch: Option<AbortHandle>,
}

pub struct SimulationQuery {
    transport: Arc<dyn SimulationTransport>,
    state: watch::Sender<QueryState>,
    attempt: Mutex<AttemptSlot>,
}

impl SimulationQuery {
    pub fn new(transport: Arc<dyn SimulationTransport>) -> Arc<Self> {
        let (state, _) = watch::channel(QueryState::NotStarted);
        Arc::new(Self {
            transport,
            state,
            attempt: Mutex::new(AttemptSlot {
                generation: 0,
                task: None,
                fetch: None,
            }),
        })
    }

    /// Starts a fetch on the current tokio runtime and returns immediately.
    pub fn trigger(self: &Arc<Self>) -> TriggerOutcome {
        let mut slot = self.attempt.lock();

        if self.state.borrow().is_pending() {
            debug!(generation = slot.generation, "simulation already pending; trigger ignored");
            return TriggerOutcome::AlreadyPending;
        }

        slot.generation += 1;
        let generation = slot.generation;
        self.state.send_replace(QueryState::Pending);
        info!(generation, "simulation requested");

        let transport = Arc::clone(&self.transport);
        let fetch = tokio::spawn(async move { transport.fetch_simulation().await });
        slot.fetch = Some(fetch.abort_handle());

        let query = Arc::clone(self);
        slot.task = Some(tokio::spawn(async move {
            let outcome = match fetch.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(FetchError::Internal(join_err.to_string())),
            };
            query.complete(generation, outcome);
        }));

        TriggerOutcome::Started
    }

    pub fn reset(&self) {
        let mut slot = self.attempt.lock();
        slot.generation += 1;
        if let Some(fetch) = slot.fetch.take() {
            fetch.abort();
        }
        if let Some(task) = slot.task.take() {
            if !task.is_finished() {
                task.abort();
                info!(generation = slot.generation, "in-flight simulation request aborted");
            }
        }
        self.state.send_replace(QueryState::NotStarted);
    }

    pub fn current_state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    pub async fn settled(&self) -> QueryState {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(|state| !state.is_pending()).await;
        match settled {
            Ok(state) => state.clone(),
            Err(_) => self.current_state(),
        }
    }

    fn complete(&self, generation: u64, outcome: Result<SimulationResult, FetchError>) {
        let mut slot = self.attempt.lock();
        if slot.generation != generation {
            debug!(
                generation,
                current = slot.generation,
                "discarding response from superseded simulation attempt"
            );
            return;
        }
        slot.task = None;
        slot.fetch = None;

        let next = match outcome {
            Ok(result) => {
                match &result {
                    SimulationResult::Success {
                        probabilities,
                        simulations_run,
                        remaining_races,
                    } => info!(
                        generation,
                        drivers = probabilities.len(),
                        simulations_run,
                        remaining_races,
                        "simulation completed"
                    ),
                    SimulationResult::Failure { message } => {
                        warn!(generation, %message, "simulation service reported an error")
                    }
                }
                QueryState::Succeeded(result)
            }
            Err(err) if err.is_malformed() => {
                warn!(generation, malformed = true, error = %err, "simulation response violated the wire contract");
                QueryState::Failed(err)
            }
            Err(err) => {
                error!(generation, kind = err.kind(), error = %err, "simulation request failed");
                QueryState::Failed(err)
            }
        };

        self.state.send_replace(next);
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
