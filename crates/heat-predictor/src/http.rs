use crate::{PredictionClient, PredictionResult, PredictorFailure};
use async_trait::async_trait;
use heat_core::SubjectState;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            request_timeout_ms: 2_000,
        }
    }
}

/// Predictor reached over HTTP: `POST {base_url}/predict` with the readings
/// as a JSON body.
#[derive(Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(cfg: &PredictorConfig) -> Result<Self, PredictorFailure> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(PredictorFailure::from)?;
        Ok(Self {
            http,
            endpoint: format!("{}/predict", cfg.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl From<reqwest::Error> for PredictorFailure {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return PredictorFailure::Status {
                code: status.as_u16(),
                body: e.to_string(),
            };
        }
        if e.is_decode() {
            return PredictorFailure::Malformed(e.to_string());
        }
        PredictorFailure::Transport {
            message: e.to_string(),
            timed_out: e.is_timeout(),
            connect: e.is_connect(),
        }
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, readings: &SubjectState) -> Result<PredictionResult, PredictorFailure> {
        let resp = self.http.post(&self.endpoint).json(readings).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(PredictorFailure::Status {
                code: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        let prediction = PredictionResult::from_body(&body)?;
        debug!(
            endpoint = %self.endpoint,
            risk_score = prediction.risk_score,
            class = %prediction.predicted_class,
            "prediction received"
        );
        Ok(prediction)
    }
}
