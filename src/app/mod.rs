// Application layer: wires the prediction client to whatever shows results to the user.

pub mod predict;

pub use predict::{PredictApp, FAILURE_ALERT};
