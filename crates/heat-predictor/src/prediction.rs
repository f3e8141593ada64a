use crate::client::PredictorFailure;
use heat_core::RiskLevel;
use serde::{Deserialize, Serialize};

/// Risk assessment returned by the predictor for one set of readings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    #[serde(alias = "risk_score")]
    pub risk_score: f64,
    #[serde(alias = "predicted_class")]
    pub predicted_class: String,
    pub confidence: f64,
}

impl PredictionResult {
    /// Rejects a response whose score or confidence leaves [0, 1] or whose
    /// class label is blank.
    pub fn validate(&self) -> Result<(), PredictorFailure> {
        check_unit("riskScore", self.risk_score)?;
        check_unit("confidence", self.confidence)?;
        if self.predicted_class.trim().is_empty() {
            return Err(PredictorFailure::Malformed("predictedClass is empty".into()));
        }
        Ok(())
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    /// Parses and validates a raw response body.
    pub fn from_body(body: &[u8]) -> Result<Self, PredictorFailure> {
        let parsed: PredictionResult = serde_json::from_slice(body)
            .map_err(|e| PredictorFailure::Malformed(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), PredictorFailure> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PredictorFailure::OutOfRange { field, value })
    }
}
