pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, Settings};

pub use crate::app::PredictApp;
pub use crate::config::{toml_config::TomlConfig, ClientConfig};
pub use crate::core::{client::PredictionClient, pixels::GridPixelSource};
pub use crate::domain::model::{FailureReason, Prediction, PredictionOutcome, ServiceInfo};
pub use crate::utils::error::{PredictError, Result};
