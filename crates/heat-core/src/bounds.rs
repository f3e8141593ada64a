use serde::{Deserialize, Serialize};

/// Closed interval a single reading is held within.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Position of `value` inside the interval, 0.0 at `min` and 1.0 at `max`.
    pub fn fraction(self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 1.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

// Ambient temperature, °C.
pub const TEMPERATURE: FieldBounds = FieldBounds::new(20.0, 38.0);
// Relative humidity, %.
pub const HUMIDITY: FieldBounds = FieldBounds::new(35.0, 85.0);
// Mean heart rate, bpm.
pub const HEART_RATE_MEAN: FieldBounds = FieldBounds::new(55.0, 110.0);
pub const RMSSD: FieldBounds = FieldBounds::new(15.0, 120.0);
pub const SDNN: FieldBounds = FieldBounds::new(20.0, 150.0);

pub const MAX_TEMP: f64 = TEMPERATURE.max;
pub const MIN_TEMP: f64 = TEMPERATURE.min;
pub const MAX_HUMIDITY: f64 = HUMIDITY.max;
pub const MIN_HUMIDITY: f64 = HUMIDITY.min;
