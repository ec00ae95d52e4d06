use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_MEDIA_BASE_URL: &str = "http://localhost:8000/media";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub media_base_url: String,
    #[serde(with = "crate::utils::duration_ms")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_media_base_url(mut self, media_base_url: impl Into<String>) -> Self {
        self.media_base_url = media_base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_base_url = lookup("ADMIN_API_BASE_URL")
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_base_url);
        let media_base_url = lookup("ADMIN_MEDIA_BASE_URL")
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.media_base_url);
        let timeout = match lookup("ADMIN_API_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidValue {
                    key: "ADMIN_API_TIMEOUT_MS",
                    value: raw.clone(),
                })?,
            None => defaults.timeout,
        };

        Ok(Self {
            api_base_url,
            media_base_url,
            timeout,
        })
    }
}
