use crate::bounds::{HEART_RATE_MEAN, HUMIDITY, RMSSD, SDNN, TEMPERATURE};
use crate::{Direction, SubjectState};

/// Per-tick increments applied to the stepped readings.
struct StepDeltas {
    temperature: f64,
    humidity: f64,
    heart_rate_mean: f64,
    hrv_factor: f64,
}

const HEAT_UP: StepDeltas = StepDeltas {
    temperature: 0.8,
    humidity: 2.5,
    heart_rate_mean: 1.5,
    hrv_factor: 0.95,
};

const COOL_DOWN: StepDeltas = StepDeltas {
    temperature: -0.8,
    humidity: -2.5,
    heart_rate_mean: -1.2,
    hrv_factor: 1.02,
};

/// Rounds half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes the readings one tick after `current` in `direction`.
///
/// Temperature, humidity, heart-rate mean, rmssd and sdnn are stepped and
/// clamped to their bounds; heart-rate min/max/std are derived from the new
/// mean and sdnn. Every output is rounded to one decimal.
pub fn next_state(current: &SubjectState, direction: Direction) -> SubjectState {
    let d = match direction {
        Direction::HeatUp => &HEAT_UP,
        Direction::CoolDown => &COOL_DOWN,
    };

    let temperature = round1(TEMPERATURE.clamp(current.temperature + d.temperature));
    let humidity = round1(HUMIDITY.clamp(current.humidity + d.humidity));
    let heart_rate_mean = round1(HEART_RATE_MEAN.clamp(current.heart_rate_mean + d.heart_rate_mean));
    let rmssd = round1(RMSSD.clamp(current.rmssd * d.hrv_factor));
    let sdnn = round1(SDNN.clamp(current.sdnn * d.hrv_factor));

    SubjectState {
        temperature,
        humidity,
        heart_rate_mean,
        heart_rate_min: round1(heart_rate_mean - 15.0),
        heart_rate_max: round1(heart_rate_mean + 25.0),
        heart_rate_std: round1(sdnn * 0.3),
        rmssd,
        sdnn,
    }
}
