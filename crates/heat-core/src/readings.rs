use crate::bounds::{FieldBounds, HEART_RATE_MEAN, HUMIDITY, RMSSD, SDNN, TEMPERATURE};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a monitored subject (one worker on the roster).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Environmental and physiological readings of one subject.
///
/// Field names follow the predictor's wire format (camelCase).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectState {
    /// Ambient temperature, °C.
    pub temperature: f64,
    /// Relative humidity, %.
    pub humidity: f64,
    pub heart_rate_mean: f64,
    pub heart_rate_min: f64,
    pub heart_rate_max: f64,
    pub heart_rate_std: f64,
    /// Root mean square of successive RR differences, ms.
    pub rmssd: f64,
    /// Standard deviation of NN intervals, ms.
    pub sdnn: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ReadingError {
    #[error("reading {field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("reading {field} = {value} outside [{}, {}]", bounds.min, bounds.max)]
    OutOfBounds {
        field: &'static str,
        value: f64,
        bounds: FieldBounds,
    },
}

impl SubjectState {
    pub fn fields(&self) -> [(&'static str, f64); 8] {
        [
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("heartRateMean", self.heart_rate_mean),
            ("heartRateMin", self.heart_rate_min),
            ("heartRateMax", self.heart_rate_max),
            ("heartRateStd", self.heart_rate_std),
            ("rmssd", self.rmssd),
            ("sdnn", self.sdnn),
        ]
    }

    /// The readings the step calculator holds within a closed interval.
    pub fn bounded_fields(&self) -> [(&'static str, f64, FieldBounds); 5] {
        [
            ("temperature", self.temperature, TEMPERATURE),
            ("humidity", self.humidity, HUMIDITY),
            ("heartRateMean", self.heart_rate_mean, HEART_RATE_MEAN),
            ("rmssd", self.rmssd, RMSSD),
            ("sdnn", self.sdnn, SDNN),
        ]
    }

    pub fn validate(&self) -> Result<(), ReadingError> {
        if let Some((field, value)) = self.fields().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ReadingError::NonFinite { field, value });
        }
        match self
            .bounded_fields()
            .into_iter()
            .find(|(_, v, bounds)| !bounds.contains(*v))
        {
            Some((field, value, bounds)) => Err(ReadingError::OutOfBounds { field, value, bounds }),
            None => Ok(()),
        }
    }

    /// Returns a copy with temperature and humidity replaced, keeping the
    /// physiological readings.
    pub fn with_environment(mut self, temperature: f64, humidity: f64) -> Self {
        self.temperature = temperature;
        self.humidity = humidity;
        self
    }
}
