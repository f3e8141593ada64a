use heat_core::{format_readings, RiskLevel, SubjectId};
use heat_predictor::PredictionError;
use heat_sim::{ErrorContext, PredictionUpdate, SessionOutcome, SimulationObserver, SubjectUpdate};
use tracing::{info, warn};

/// Writes every published update to the log.
pub struct LogObserver;

impl SimulationObserver for LogObserver {
    fn on_subject_update(&self, id: &SubjectId, update: &SubjectUpdate) {
        let readings = format_readings(&update.readings);
        match &update.prediction {
            PredictionUpdate::Set(p) => info!(
                subject = %id,
                risk = p.risk_score,
                level = %RiskLevel::from_score(p.risk_score),
                class = %p.predicted_class,
                "{readings}"
            ),
            PredictionUpdate::Unchanged => info!(subject = %id, "{readings} (no prediction)"),
            PredictionUpdate::Cleared => info!(subject = %id, "reset to {readings}"),
        }
    }

    fn on_error(&self, error: &PredictionError, ctx: &ErrorContext) {
        warn!(
            step = ctx.step,
            direction = %ctx.direction,
            consecutive = ctx.consecutive_errors,
            total = ctx.total_errors,
            kind = error.kind(),
            "predictor call failed: {error}"
        );
    }

    fn on_stopped(&self, id: &SubjectId, outcome: &SessionOutcome) {
        info!(
            subject = %id,
            session = %outcome.session_id,
            steps = outcome.step_count,
            total_errors = outcome.total_errors,
            "session finished: {}",
            outcome.reason
        );
    }
}
