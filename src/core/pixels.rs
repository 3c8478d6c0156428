use crate::domain::model::PixelGrid;
use crate::domain::ports::PixelSource;
use serde::Serialize;
use std::sync::RwLock;

/// An intensity value that can be mirrored within `0..=max`.
pub trait Pixel: Serialize + Copy + Send + Sync + 'static {
    fn invert(self, max: Self) -> Self;
}

impl Pixel for u8 {
    fn invert(self, max: Self) -> Self {
        max.saturating_sub(self)
    }
}

impl Pixel for u16 {
    fn invert(self, max: Self) -> Self {
        max.saturating_sub(self)
    }
}

impl Pixel for f32 {
    fn invert(self, max: Self) -> Self {
        max - self
    }
}

impl Pixel for f64 {
    fn invert(self, max: Self) -> Self {
        max - self
    }
}

/// In-memory pixel store. The grid can be swapped between predictions,
/// the way a drawing canvas would update it.
#[derive(Debug)]
pub struct GridPixelSource<T: Pixel> {
    grid: RwLock<PixelGrid<T>>,
    max_intensity: T,
}

impl<T: Pixel> GridPixelSource<T> {
    pub fn new(grid: PixelGrid<T>, max_intensity: T) -> Self {
        Self {
            grid: RwLock::new(grid),
            max_intensity,
        }
    }

    pub fn max_intensity(&self) -> T {
        self.max_intensity
    }

    pub fn set_pixels(&self, grid: PixelGrid<T>) {
        let mut current = self.grid.write().unwrap_or_else(|e| e.into_inner());
        *current = grid;
    }
}

impl GridPixelSource<u8> {
    /// 0-255 grayscale, the range the prediction service accepts.
    pub fn grayscale(grid: PixelGrid<u8>) -> Self {
        Self::new(grid, u8::MAX)
    }
}

impl GridPixelSource<f64> {
    pub fn normalized(grid: PixelGrid<f64>) -> Self {
        Self::new(grid, 1.0)
    }
}

impl<T: Pixel> PixelSource for GridPixelSource<T> {
    type Pixel = T;

    fn pixels(&self) -> PixelGrid<T> {
        self.grid.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn invert(&self, grid: PixelGrid<T>) -> PixelGrid<T> {
        let max = self.max_intensity;
        grid.into_iter()
            .map(|row| row.into_iter().map(|v| v.invert(max)).collect())
            .collect()
    }
}
