pub mod client;
pub mod pixels;

pub use crate::domain::model::{
    FailureReason, FlattenedPixels, PixelGrid, Prediction, PredictionOutcome, PredictionResponse,
    ServiceInfo,
};
pub use crate::domain::ports::{ConfigProvider, Notifier, PixelSource, Predictor};
pub use crate::utils::error::Result;
