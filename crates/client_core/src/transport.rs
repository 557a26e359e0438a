use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::{
    domain::SimulationResult,
    protocol::{classify_bytes, SIMULATE_PATH},
};
use tracing::{debug, info};
use url::Url;

use crate::{
    config::{ClientSettings, BASE_URL_ENV},
    error::{ConfigError, FetchError},
};

#[async_trait]
pub trait SimulationTransport: Send + Sync {
    async fn fetch_simulation(&self) -> Result<SimulationResult, FetchError>;
}

/// HTTP client for the simulation service's `/simulate` endpoint.
pub struct HttpSimulationClient {
    http: Client,
    endpoint: Url,
    request_timeout: Duration,
}

impl HttpSimulationClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ConfigError> {
        let endpoint = simulate_endpoint(settings.api_base_url.as_deref())?;
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        info!(
            %endpoint,
            timeout_secs = settings.request_timeout.as_secs(),
            "simulation client configured"
        );

        Ok(Self {
            http,
            endpoint,
            request_timeout: settings.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.request_timeout)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl SimulationTransport for HttpSimulationClient {
    async fn fetch_simulation(&self) -> Result<SimulationResult, FetchError> {
        debug!(endpoint = %self.endpoint, "requesting simulation");
        let response = self
            .http
            .get(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        Ok(classify_bytes(&body)?)
    }
}

/// Resolves `{base}/simulate`, appending to the base path the way a client
/// `baseURL` does instead of replacing its last segment.
pub fn simulate_endpoint(api_base_url: Option<&str>) -> Result<Url, ConfigError> {
    let base = api_base_url
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .ok_or(ConfigError::MissingBaseUrl { env: BASE_URL_ENV })?;

    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };

    let parsed = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("base url must not carry a query or fragment".to_string()));
    }

    let joined = format!("{}{SIMULATE_PATH}", base.trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
