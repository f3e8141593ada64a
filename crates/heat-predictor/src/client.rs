use crate::PredictionResult;
use async_trait::async_trait;
use heat_core::SubjectState;
use std::time::Duration;
use thiserror::Error;

/// Raw failure of a single prediction round-trip, before classification.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictorFailure {
    #[error("transport error: {message}")]
    Transport {
        message: String,
        timed_out: bool,
        connect: bool,
    },
    #[error("predictor returned status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("malformed predictor response: {0}")]
    Malformed(String),
    #[error("predictor field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("no predictor response within {0:?}")]
    Elapsed(Duration),
}

/// Remote risk predictor. Any failure, including a response that does not
/// validate, is returned as an error and never defaulted.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, readings: &SubjectState) -> Result<PredictionResult, PredictorFailure>;
}
