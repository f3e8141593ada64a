use crate::bounds::{FieldBounds, HEART_RATE_MEAN, HUMIDITY, RMSSD, SDNN, TEMPERATURE};
use crate::step::round1;
use crate::SubjectState;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("{field} range {start}..{end} is empty")]
    EmptyRange { field: &'static str, start: f64, end: f64 },
    #[error("{field} range {start}..{end} leaves [{}, {}]", bounds.min, bounds.max)]
    OutOfBounds {
        field: &'static str,
        start: f64,
        end: f64,
        bounds: FieldBounds,
    },
}

/// Ranges a freshly generated baseline is drawn from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineProfile {
    pub temperature: Range<f64>,
    pub humidity: Range<f64>,
    pub heart_rate_mean: Range<f64>,
    pub rmssd: Range<f64>,
    pub sdnn: Range<f64>,
}

impl Default for BaselineProfile {
    fn default() -> Self {
        Self {
            temperature: 22.0..26.0,
            humidity: 40.0..60.0,
            heart_rate_mean: 65.0..80.0,
            rmssd: 35.0..60.0,
            sdnn: 45.0..70.0,
        }
    }
}

impl BaselineProfile {
    fn ranges(&self) -> [(&'static str, &Range<f64>, FieldBounds); 5] {
        [
            ("temperature", &self.temperature, TEMPERATURE),
            ("humidity", &self.humidity, HUMIDITY),
            ("heart_rate_mean", &self.heart_rate_mean, HEART_RATE_MEAN),
            ("rmssd", &self.rmssd, RMSSD),
            ("sdnn", &self.sdnn, SDNN),
        ]
    }

    /// Every range must be non-empty and lie inside its field's interval,
    /// otherwise `generate` would panic or produce out-of-bounds readings.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (field, range, bounds) in self.ranges() {
            let (start, end) = (range.start, range.end);
            // Also rejects NaN endpoints.
            if !(start < end) {
                return Err(ProfileError::EmptyRange { field, start, end });
            }
            if !bounds.contains(start) || !bounds.contains(end) {
                return Err(ProfileError::OutOfBounds {
                    field,
                    start,
                    end,
                    bounds,
                });
            }
        }
        Ok(())
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> SubjectState {
        let heart_rate_mean = round1(rng.gen_range(self.heart_rate_mean.clone()));
        let sdnn = round1(rng.gen_range(self.sdnn.clone()));
        SubjectState {
            temperature: round1(rng.gen_range(self.temperature.clone())),
            humidity: round1(rng.gen_range(self.humidity.clone())),
            heart_rate_mean,
            heart_rate_min: round1(heart_rate_mean - 15.0),
            heart_rate_max: round1(heart_rate_mean + 25.0),
            heart_rate_std: round1(sdnn * 0.3),
            rmssd: round1(rng.gen_range(self.rmssd.clone())),
            sdnn,
        }
    }
}

/// A resting, comfortable-conditions profile drawn from the default ranges.
pub fn fresh_baseline() -> SubjectState {
    BaselineProfile::default().generate(&mut rand::thread_rng())
}
