use thiserror::Error;

use crate::executor::ExecutorError;
use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Did not find {0} in provided TLE")]
    SatelliteNotFound(String),
    #[error("No passes found for {0}")]
    NoPassFound(String),
    #[error("prediction failed: {0}")]
    Predict(#[from] PredictError),
    #[error("scheduling failed: {0}")]
    Job(#[from] ExecutorError),
}
