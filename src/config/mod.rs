#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{PredictError, Result};
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};

pub const ENDPOINT_URL_VAR: &str = "PREDICT_ENDPOINT_URL";
pub const INFO_URL_VAR: &str = "PREDICT_INFO_URL";
pub const LOG_PAYLOAD_VAR: &str = "PREDICT_LOG_PAYLOAD";

/// Settings consumed by [`crate::PredictionClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoint_url: String,
    #[serde(default)]
    pub info_url: Option<String>,
    #[serde(default)]
    pub log_payload: bool,
}

impl ClientConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            info_url: None,
            log_payload: false,
        }
    }

    pub fn with_info_url(mut self, info_url: impl Into<String>) -> Self {
        self.info_url = Some(info_url.into());
        self
    }

    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payload = enabled;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint_url = lookup(ENDPOINT_URL_VAR).ok_or_else(|| PredictError::MissingConfig {
            field: ENDPOINT_URL_VAR.to_string(),
        })?;

        let log_payload = match lookup(LOG_PAYLOAD_VAR) {
            Some(raw) => parse_flag(LOG_PAYLOAD_VAR, &raw)?,
            None => false,
        };

        Ok(Self {
            endpoint_url,
            info_url: lookup(INFO_URL_VAR),
            log_payload,
        })
    }
}

fn parse_flag(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(PredictError::InvalidConfigValue {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "Expected a boolean (true/false)".to_string(),
        }),
    }
}

impl ConfigProvider for ClientConfig {
    fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn info_url(&self) -> Option<&str> {
        self.info_url.as_deref()
    }

    fn log_payload(&self) -> bool {
        self.log_payload
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint_url", &self.endpoint_url)?;
        if let Some(info_url) = &self.info_url {
            validate_url("info_url", info_url)?;
        }
        Ok(())
    }
}
