use crate::core::{Notifier, Prediction, PredictionOutcome, Predictor, Result};

/// Message shown to the user when the service did not produce a digit.
pub const FAILURE_ALERT: &str = "error";

/// Presentation-side wrapper around a [`Predictor`].
///
/// Failed predictions become a single user alert and the digit `0`.
/// Transport errors are not swallowed.
pub struct PredictApp<P: Predictor, N: Notifier> {
    predictor: P,
    notifier: N,
}

impl<P: Predictor, N: Notifier> PredictApp<P, N> {
    pub fn new(predictor: P, notifier: N) -> Self {
        Self {
            predictor,
            notifier,
        }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub async fn predict(&self) -> Result<Prediction> {
        match self.predictor.predict_digit().await? {
            PredictionOutcome::Predicted(digit) => Ok(digit),
            PredictionOutcome::Failed(reason) => {
                tracing::error!("Prediction failed: {}", reason);
                self.notifier.alert(FAILURE_ALERT);
                Ok(0)
            }
        }
    }

    pub async fn predict_detailed(&self) -> Result<PredictionOutcome> {
        self.predictor.predict_digit().await
    }
}
