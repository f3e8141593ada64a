use chrono::{DateTime, Utc};
use heat_core::{session_progress, Direction, SubjectId, SubjectState};
use heat_predictor::PredictionResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a session ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    MaxStepsReached,
    TooManyConsecutiveErrors,
    TooManyTotalErrors,
    NoLongerActive,
    TargetUnavailable,
    Resetting,
    Superseded,
    StoppedByCaller,
    ControllerDropped,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::MaxStepsReached => "maximum steps reached",
            StopReason::TooManyConsecutiveErrors => "too many consecutive errors",
            StopReason::TooManyTotalErrors => "too many total errors",
            StopReason::NoLongerActive => "no longer active",
            StopReason::TargetUnavailable => "target subject unavailable",
            StopReason::Resetting => "resetting",
            StopReason::Superseded => "superseded by a new session",
            StopReason::StoppedByCaller => "stopped by caller",
            StopReason::ControllerDropped => "controller dropped",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters of a finished session, captured before they are zeroed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub reason: StopReason,
    pub direction: Direction,
    pub step_count: u32,
    pub consecutive_errors: u32,
    pub total_errors: u32,
    pub finished_at: DateTime<Utc>,
}

/// Read-only view of the controller's session record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub direction: Option<Direction>,
    pub active: bool,
    pub target_id: Option<SubjectId>,
    pub session_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub step_count: u32,
    pub consecutive_errors: u32,
    pub total_errors: u32,
    pub baseline: Option<SubjectState>,
    pub latest_readings: Option<SubjectState>,
    pub latest_prediction: Option<PredictionResult>,
    pub last_outcome: Option<SessionOutcome>,
}

impl SessionSnapshot {
    pub fn progress(&self) -> Option<f64> {
        Some(session_progress(self.latest_readings.as_ref()?, self.direction?))
    }
}

/// The controller-owned session record. `generation` increases on every
/// `start`, so work captured under an older generation can be recognised as
/// stale.
#[derive(Debug, Default)]
pub(crate) struct SimulationSession {
    pub generation: u64,
    pub direction: Option<Direction>,
    pub active: bool,
    pub target: Option<SubjectId>,
    pub session_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub step_count: u32,
    pub consecutive_errors: u32,
    pub total_errors: u32,
    pub baseline: Option<SubjectState>,
    /// Working readings the next tick steps from.
    pub cached: Option<SubjectState>,
    pub latest_readings: Option<SubjectState>,
    pub latest_prediction: Option<PredictionResult>,
    pub last_outcome: Option<SessionOutcome>,
}

impl SimulationSession {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            direction: self.direction,
            active: self.active,
            target_id: self.target.clone(),
            session_id: self.session_id,
            started_at: self.started_at,
            step_count: self.step_count,
            consecutive_errors: self.consecutive_errors,
            total_errors: self.total_errors,
            baseline: self.baseline,
            latest_readings: self.latest_readings,
            latest_prediction: self.latest_prediction.clone(),
            last_outcome: self.last_outcome.clone(),
        }
    }

    /// Ends the current session. Returns the outcome when a session was
    /// actually running; stopping an idle record changes nothing.
    pub fn finish(&mut self, reason: StopReason) -> Option<SessionOutcome> {
        if !self.active {
            return None;
        }
        let outcome = match (self.session_id, self.direction) {
            (Some(session_id), Some(direction)) => Some(SessionOutcome {
                session_id,
                reason,
                direction,
                step_count: self.step_count,
                consecutive_errors: self.consecutive_errors,
                total_errors: self.total_errors,
                finished_at: Utc::now(),
            }),
            _ => None,
        };
        self.active = false;
        self.direction = None;
        self.cached = None;
        self.step_count = 0;
        self.consecutive_errors = 0;
        self.total_errors = 0;
        if outcome.is_some() {
            self.last_outcome = outcome.clone();
        }
        outcome
    }
}
