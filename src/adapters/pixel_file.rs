use crate::core::pixels::GridPixelSource;
use crate::core::PixelGrid;
use crate::utils::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Side of an MNIST sample; a sample is `SIDE * SIDE` pixels.
pub const MNIST_SIDE: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum GridFormat {
    /// One row of intensities per line, no header.
    Csv,
    /// `[[0, 255, ...], ...]`
    Json,
    /// A training record: `label,p0,...,p783`.
    Mnist,
}

impl GridFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(GridFormat::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(GridFormat::Json),
            _ => Err(PredictError::InvalidInput {
                message: format!(
                    "Cannot infer grid format from '{}', pass --format",
                    path.display()
                ),
            }),
        }
    }
}

pub fn load_grid(path: impl AsRef<Path>, format: Option<GridFormat>) -> Result<PixelGrid<u8>> {
    let path = path.as_ref();
    let format = match format {
        Some(format) => format,
        None => GridFormat::from_path(path)?,
    };

    tracing::debug!("Loading {:?} grid from {}", format, path.display());

    let grid = match format {
        GridFormat::Csv => read_csv_rows(path)?,
        GridFormat::Json => {
            let data = std::fs::read(path)?;
            serde_json::from_slice(&data)?
        }
        GridFormat::Mnist => read_mnist_record(path)?,
    };

    tracing::debug!(
        "Loaded grid with {} rows, {} pixels",
        grid.len(),
        grid.iter().map(Vec::len).sum::<usize>()
    );
    Ok(grid)
}

pub fn load_pixel_source(
    path: impl AsRef<Path>,
    format: Option<GridFormat>,
    max_intensity: u8,
) -> Result<GridPixelSource<u8>> {
    let grid = load_grid(path, format)?;
    Ok(GridPixelSource::new(grid, max_intensity))
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn parse_record(record: &csv::StringRecord, line: usize) -> Result<Vec<u8>> {
    record
        .iter()
        .enumerate()
        .map(|(column, field)| {
            field.parse::<u8>().map_err(|e| PredictError::InvalidInput {
                message: format!(
                    "Line {}, column {}: '{}' is not an intensity: {}",
                    line,
                    column + 1,
                    field,
                    e
                ),
            })
        })
        .collect()
}

fn read_csv_rows(path: &Path) -> Result<PixelGrid<u8>> {
    let mut reader = csv_reader(path)?;
    let mut grid = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        grid.push(parse_record(&record, index + 1)?);
    }

    Ok(grid)
}

fn read_mnist_record(path: &Path) -> Result<PixelGrid<u8>> {
    let mut reader = csv_reader(path)?;
    let mut records = reader.records();

    let mut line = 1;
    let mut record = records.next().transpose()?;
    // training exports start with a `label,pixel0,...` header row
    if let Some(first) = &record {
        if first.get(0).is_some_and(|label| label.parse::<i64>().is_err()) {
            tracing::debug!("Skipping MNIST header row in {}", path.display());
            line += 1;
            record = records.next().transpose()?;
        }
    }

    let record = record.ok_or_else(|| PredictError::InvalidInput {
        message: format!("{} contains no sample", path.display()),
    })?;

    let expected = MNIST_SIDE * MNIST_SIDE + 1;
    if record.len() != expected {
        return Err(PredictError::InvalidInput {
            message: format!(
                "Expected {} fields (label + {} pixels), found {}",
                expected,
                MNIST_SIDE * MNIST_SIDE,
                record.len()
            ),
        });
    }

    let values = parse_record(&record, line)?;
    Ok(values[1..]
        .chunks(MNIST_SIDE)
        .map(|row| row.to_vec())
        .collect())
}
