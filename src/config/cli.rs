use crate::adapters::GridFormat;
use crate::config::toml_config::{TomlConfig, DEFAULT_MAX_INTENSITY};
use crate::config::{ClientConfig, ENDPOINT_URL_VAR, INFO_URL_VAR};
use crate::utils::error::{PredictError, Result};
use crate::utils::validation::{
    validate_path, validate_range, validate_required_field, validate_url, Validate,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pixel-predict")]
#[command(about = "Send a pixel grid to a digit prediction service")]
pub struct CliConfig {
    /// Prediction endpoint, e.g. http://localhost:8000/predict
    #[arg(long, env = "PREDICT_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Service info endpoint used by --health
    #[arg(long, env = "PREDICT_INFO_URL")]
    pub info_url: Option<String>,

    /// Grid file to send
    #[arg(long, required_unless_present = "health")]
    pub input: Option<PathBuf>,

    /// Grid file format; inferred from the extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<GridFormat>,

    /// Intensity that inverts to zero
    #[arg(long)]
    pub max_intensity: Option<u16>,

    /// TOML config file; flags and environment take precedence over it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Query the service info endpoint instead of predicting")]
    pub health: bool,

    #[arg(long, help = "Log request bodies at debug level")]
    pub log_payload: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

/// Effective settings after merging flags, environment and the config file.
///
/// With `--health` the endpoint URL may be empty; only `info_url` is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub client: ClientConfig,
    pub max_intensity: u8,
}

impl CliConfig {
    pub fn resolve(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading config file {}", path.display());
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Some(file)
            }
            None => None,
        };
        self.merge(file.as_ref())
    }

    fn merge(&self, file: Option<&TomlConfig>) -> Result<Settings> {
        let endpoint_url = self
            .endpoint_url
            .clone()
            .or_else(|| file.map(|f| f.endpoint.url.clone()));

        let info_url = self
            .info_url
            .clone()
            .or_else(|| file.and_then(|f| f.endpoint.info_url.clone()));

        let log_payload = self.log_payload || file.is_some_and(|f| f.log_payload());

        let max_intensity = self
            .max_intensity
            .or_else(|| file.map(|f| f.max_intensity()))
            .unwrap_or(DEFAULT_MAX_INTENSITY);
        validate_range("max_intensity", max_intensity, 1, 255)?;

        let client = if self.health {
            // the health check only talks to the info endpoint
            let info_url = validate_required_field(
                &format!("--info-url or {}", INFO_URL_VAR),
                &info_url,
            )?;
            validate_url("info_url", info_url)?;
            if let Some(url) = &endpoint_url {
                validate_url("endpoint_url", url)?;
            }
            ClientConfig {
                endpoint_url: endpoint_url.unwrap_or_default(),
                info_url: Some(info_url.clone()),
                log_payload,
            }
        } else {
            let endpoint_url = endpoint_url.ok_or_else(|| PredictError::MissingConfig {
                field: format!("--endpoint-url or {}", ENDPOINT_URL_VAR),
            })?;
            let client = ClientConfig {
                endpoint_url,
                info_url,
                log_payload,
            };
            client.validate()?;
            client
        };

        Ok(Settings {
            client,
            max_intensity: max_intensity as u8,
        })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.endpoint_url {
            validate_url("endpoint_url", url)?;
        }
        if let Some(url) = &self.info_url {
            validate_url("info_url", url)?;
        }
        if let Some(input) = &self.input {
            validate_path("input", &input.to_string_lossy())?;
        }
        if let Some(max) = self.max_intensity {
            validate_range("max_intensity", max, 1, 255)?;
        }
        Ok(())
    }
}
