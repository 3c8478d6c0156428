use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Prediction service unavailable (status {status})")]
    ServiceUnavailable { status: u16 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("TOML parsing error: {message}")]
    TomlParse { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PredictError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PredictError::Transport(_) | PredictError::ServiceUnavailable { .. } => {
                ErrorCategory::Network
            }
            PredictError::Serialization(_)
            | PredictError::Csv(_)
            | PredictError::InvalidInput { .. } => ErrorCategory::Data,
            PredictError::ConfigError { .. }
            | PredictError::InvalidConfigValue { .. }
            | PredictError::MissingConfig { .. }
            | PredictError::TomlParse { .. } => ErrorCategory::Configuration,
            PredictError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // network problems are usually worth trying again by hand
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PredictError::Transport(_) => {
                "Check that the prediction service is running and the endpoint URL is reachable"
            }
            PredictError::ServiceUnavailable { .. } => {
                "The service answered but reported a failure; check its logs"
            }
            PredictError::Serialization(_) => {
                "Make sure pixel values are finite numbers and input files are valid JSON"
            }
            PredictError::Csv(_) | PredictError::InvalidInput { .. } => {
                "Check the grid file: one row of integer intensities per line"
            }
            PredictError::Io(_) => "Check that the input file exists and is readable",
            PredictError::ConfigError { .. }
            | PredictError::InvalidConfigValue { .. }
            | PredictError::TomlParse { .. } => "Review the configuration file and CLI flags",
            PredictError::MissingConfig { .. } => {
                "Set the missing value via CLI flag, environment variable or config file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PredictError::Transport(e) if e.is_connect() => {
                "Could not connect to the prediction service".to_string()
            }
            PredictError::Transport(e) if e.is_builder() => {
                "The prediction endpoint URL could not be used".to_string()
            }
            PredictError::Transport(_) => "The request to the prediction service failed".to_string(),
            PredictError::MissingConfig { field } => format!("Missing setting: {}", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
