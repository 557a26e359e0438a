use std::{path::PathBuf, time::Duration};

use shared::error::MalformedResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `api_base_url` (set {env} or add it to the config file)")]
    MissingBaseUrl { env: &'static str },
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", .path.display())]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("simulation service responded with HTTP {status}")]
    Status { status: u16 },
    #[error("malformed simulation response: {0}")]
    Malformed(#[from] MalformedResponse),
    #[error("simulation fetch task failed: {0}")]
    Internal(String),
}

impl FetchError {
    /// Contract violations by the server, as opposed to connectivity problems.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
            Self::Internal(_) => "internal",
        }
    }
}
