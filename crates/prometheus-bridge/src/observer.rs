use crate::SimulationMetrics;
use heat_core::SubjectId;
use heat_predictor::PredictionError;
use heat_sim::{ErrorContext, PredictionUpdate, SessionOutcome, SimulationObserver, SubjectUpdate};

impl SimulationObserver for SimulationMetrics {
    fn on_subject_update(&self, id: &SubjectId, update: &SubjectUpdate) {
        let subject = id.as_str();
        let r = &update.readings;
        self.temperature_celsius.with_label_values(&[subject]).set(r.temperature);
        self.humidity_percent.with_label_values(&[subject]).set(r.humidity);
        self.heart_rate_bpm.with_label_values(&[subject]).set(r.heart_rate_mean);

        let outcome = match &update.prediction {
            PredictionUpdate::Set(p) => {
                self.risk_score.with_label_values(&[subject]).set(p.risk_score);
                "predicted"
            }
            PredictionUpdate::Unchanged => "environment_only",
            PredictionUpdate::Cleared => {
                // Series may not exist yet; nothing to clear then.
                let _ = self.risk_score.remove_label_values(&[subject]);
                "reset"
            }
        };
        self.ticks_total.with_label_values(&[subject, outcome]).inc();
    }

    fn on_error(&self, error: &PredictionError, ctx: &ErrorContext) {
        self.prediction_errors_total
            .with_label_values(&[error.kind(), ctx.direction.as_str()])
            .inc();
    }

    fn on_stopped(&self, _id: &SubjectId, outcome: &SessionOutcome) {
        self.sessions_stopped_total
            .with_label_values(&[outcome.reason.as_str(), outcome.direction.as_str()])
            .inc();
    }
}
