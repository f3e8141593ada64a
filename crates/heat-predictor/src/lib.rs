pub mod classify;
pub mod client;
pub mod http;
pub mod prediction;

pub use classify::{classify, PredictionError};
pub use client::{PredictionClient, PredictorFailure};
pub use http::{HttpPredictionClient, PredictorConfig};
pub use prediction::PredictionResult;
