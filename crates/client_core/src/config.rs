use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "redline.toml";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_ENV: &str = "REDLINE_API_BASE_URL";
const BASE_URL_ENV_ALIAS: &str = "APP__API_BASE_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "REDLINE_REQUEST_TIMEOUT_SECS";
const REQUEST_TIMEOUT_ENV_ALIAS: &str = "APP__REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// An explicit `config_path` must exist; the default `redline.toml` is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<ClientSettings, ConfigError> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

pub fn load_settings_with<F>(
    config_path: Option<&Path>,
    env: F,
) -> Result<ClientSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = ClientSettings::default();

    if let Some(file_cfg) = read_file_settings(config_path)? {
        if let Some(v) = file_cfg.api_base_url {
            settings.api_base_url = Some(v);
        }
        if let Some(secs) = file_cfg.request_timeout_secs {
            settings.request_timeout = timeout_from_secs("request_timeout_secs", secs)?;
        }
    }

    for key in [BASE_URL_ENV_ALIAS, BASE_URL_ENV] {
        if let Some(v) = env(key) {
            settings.api_base_url = Some(v);
        }
    }

    for key in [REQUEST_TIMEOUT_ENV_ALIAS, REQUEST_TIMEOUT_ENV] {
        if let Some(v) = env(key) {
            let secs = v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: v.clone(),
            })?;
            settings.request_timeout = timeout_from_secs(key, secs)?;
        }
    }

    Ok(settings)
}

pub const BASE_URL_FLAG: &str = "--api-base-url";
pub const REQUEST_TIMEOUT_FLAG: &str = "--timeout-secs";

/// Applies command-line values on top of the file and environment layers.
pub fn apply_overrides(
    mut settings: ClientSettings,
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<ClientSettings, ConfigError> {
    if let Some(url) = api_base_url {
        debug!(flag = BASE_URL_FLAG, "base url overridden from command line");
        settings.api_base_url = Some(url);
    }
    if let Some(secs) = timeout_secs {
        settings.request_timeout = timeout_from_secs(REQUEST_TIMEOUT_FLAG, secs)?;
    }
    Ok(settings)
}

pub fn timeout_from_secs(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn read_file_settings(config_path: Option<&Path>) -> Result<Option<FileSettings>, ConfigError> {
    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(source) if !required && source.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file found; using environment only");
            return Ok(None);
        }
        Err(source) => return Err(ConfigError::ReadFile { path, source }),
    };

    toml::from_str::<FileSettings>(&raw)
        .map(Some)
        .map_err(|source| ConfigError::ParseFile { path, source })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
