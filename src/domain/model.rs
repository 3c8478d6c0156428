use serde::{Deserialize, Serialize};

/// Rows of intensities, outer index is the row.
pub type PixelGrid<T> = Vec<Vec<T>>;

/// Row-major concatenation of a grid.
pub type FlattenedPixels<T> = Vec<T>;

/// Digit reported by the service. Expected 0-9 but taken as-is.
pub type Prediction = i64;

/// Success body of the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Prediction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The service answered with a non-success status.
    Rejected { status: u16, detail: Option<String> },
    /// Success status, but the body is not `{"prediction": <integer>}`.
    MalformedResponse { detail: String },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Rejected {
                status,
                detail: Some(detail),
            } => write!(f, "service rejected the request ({}): {}", status, detail),
            FailureReason::Rejected {
                status,
                detail: None,
            } => write!(f, "service rejected the request ({})", status),
            FailureReason::MalformedResponse { detail } => {
                write!(f, "malformed prediction response: {}", detail)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionOutcome {
    Predicted(Prediction),
    Failed(FailureReason),
}

impl PredictionOutcome {
    pub fn prediction(&self) -> Option<Prediction> {
        match self {
            PredictionOutcome::Predicted(digit) => Some(*digit),
            PredictionOutcome::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Predicted(_))
    }
}

/// Info endpoint payload: `{"service": ..., "uptime": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    #[serde(default)]
    pub uptime: serde_json::Value,
}
