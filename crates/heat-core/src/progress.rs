use crate::bounds::{HUMIDITY, TEMPERATURE};
use crate::{next_state, should_continue, Direction, SubjectState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Fraction of the way from the opposite bound to the direction's terminal
/// bound, averaged over temperature and humidity.
pub fn session_progress(state: &SubjectState, direction: Direction) -> f64 {
    let t = TEMPERATURE.fraction(state.temperature);
    let h = HUMIDITY.fraction(state.humidity);
    let toward_max = (t + h) / 2.0;
    match direction {
        Direction::HeatUp => toward_max,
        Direction::CoolDown => 1.0 - toward_max,
    }
}

/// Ticks left before the continuation policy ends a session that starts
/// from `state` with no steps taken yet.
pub fn estimated_remaining_steps(state: &SubjectState, direction: Direction) -> u32 {
    let mut current = *state;
    let mut steps = 0;
    while should_continue(&current, direction, steps) {
        current = next_state(&current, direction);
        steps += 1;
    }
    steps
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.25 {
            RiskLevel::Low
        } else if score < 0.5 {
            RiskLevel::Moderate
        } else if score < 0.75 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

pub fn format_readings(state: &SubjectState) -> String {
    format!(
        "{:.1}°C / {:.1}% RH / HR {:.1} bpm",
        state.temperature, state.humidity, state.heart_rate_mean
    )
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
