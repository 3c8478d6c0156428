use crate::config::ClientConfig;
use crate::utils::error::{PredictError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_INTENSITY: u16 = 255;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub endpoint: EndpointConfig,
    pub pixels: Option<PixelsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    pub info_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelsConfig {
    pub max_intensity: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_payload: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PredictError::TomlParse {
            message: e.to_string(),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PredictError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn max_intensity(&self) -> u16 {
        self.pixels
            .as_ref()
            .and_then(|p| p.max_intensity)
            .unwrap_or(DEFAULT_MAX_INTENSITY)
    }

    pub fn log_payload(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.log_payload)
            .unwrap_or(false)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint_url: self.endpoint.url.clone(),
            info_url: self.endpoint.info_url.clone(),
            log_payload: self.log_payload(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint.url", &self.endpoint.url)?;
        if let Some(info_url) = &self.endpoint.info_url {
            validate_url("endpoint.info_url", info_url)?;
        }
        validate_range("pixels.max_intensity", self.max_intensity(), 1, 255)?;
        Ok(())
    }
}
