use crate::domain::model::{FlattenedPixels, PixelGrid, PredictionOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Read-only access to the current drawing plus the provider's transforms.
pub trait PixelSource: Send + Sync {
    type Pixel: Serialize + Clone + Send + Sync;

    /// Snapshot of the grid at call time.
    fn pixels(&self) -> PixelGrid<Self::Pixel>;

    fn invert(&self, grid: PixelGrid<Self::Pixel>) -> PixelGrid<Self::Pixel>;

    fn flatten(&self, grid: PixelGrid<Self::Pixel>) -> FlattenedPixels<Self::Pixel> {
        grid.into_iter().flatten().collect()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint_url(&self) -> &str;
    fn info_url(&self) -> Option<&str>;
    fn log_payload(&self) -> bool;
}

/// User-facing notification channel, owned by the presentation layer.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict_digit(&self) -> Result<PredictionOutcome>;
}
