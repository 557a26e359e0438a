pub mod config;
pub mod error;
pub mod query;
pub mod transport;
pub mod view;

pub use config::{load_settings, ClientSettings};
pub use error::{ConfigError, FetchError};
pub use query::{QueryState, SimulationQuery, TriggerOutcome};
pub use transport::{HttpSimulationClient, SimulationTransport};
pub use view::{SimulationView, StandingsView};
