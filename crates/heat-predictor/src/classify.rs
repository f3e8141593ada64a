use crate::PredictorFailure;
use thiserror::Error;

/// Categorised predictor failure surfaced to error observers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictionError {
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("server error: {0}")]
    Server(String),
}

impl PredictionError {
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Network(_) => "network",
            PredictionError::Timeout(_) => "timeout",
            PredictionError::Protocol(_) => "protocol",
            PredictionError::Server(_) => "server",
        }
    }
}

pub fn classify(failure: &PredictorFailure) -> PredictionError {
    let message = failure.to_string();
    match failure {
        PredictorFailure::Transport { timed_out: true, .. } | PredictorFailure::Elapsed(_) => {
            PredictionError::Timeout(message)
        }
        PredictorFailure::Transport {
            connect: true,
            message,
            ..
        } => PredictionError::Network(format!("could not reach predictor: {message}")),
        PredictorFailure::Transport { message, .. } => {
            PredictionError::Network(format!("connection to predictor lost: {message}"))
        }
        PredictorFailure::Status { code, .. } if *code >= 500 => PredictionError::Server(message),
        PredictorFailure::Status { .. }
        | PredictorFailure::Malformed(_)
        | PredictorFailure::OutOfRange { .. } => PredictionError::Protocol(message),
    }
}
