use crate::session::SessionOutcome;
use heat_core::{Direction, SubjectId, SubjectState};
use heat_predictor::{PredictionError, PredictionResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What happens to a subject's prediction fields on an update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PredictionUpdate {
    Set(PredictionResult),
    /// Environment-only update; the previous prediction is left in place.
    Unchanged,
    Cleared,
}

/// Partial subject state published by the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectUpdate {
    pub readings: SubjectState,
    pub prediction: PredictionUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorContext {
    /// 1-based tick number the failure happened on.
    pub step: u32,
    pub direction: Direction,
    pub consecutive_errors: u32,
    pub total_errors: u32,
}

/// Hooks the controller publishes through.
///
/// Callbacks arrive in mutation order, one at a time. A callback may call
/// back into the controller; events that call produces are delivered after
/// the current callback returns.
pub trait SimulationObserver: Send + Sync {
    fn on_subject_update(&self, id: &SubjectId, update: &SubjectUpdate);

    fn on_error(&self, error: &PredictionError, ctx: &ErrorContext);

    fn on_stopped(&self, _id: &SubjectId, _outcome: &SessionOutcome) {}
}

/// Fans every callback out to a list of observers.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn SimulationObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn SimulationObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: Arc<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl SimulationObserver for ObserverSet {
    fn on_subject_update(&self, id: &SubjectId, update: &SubjectUpdate) {
        for o in &self.observers {
            o.on_subject_update(id, update);
        }
    }

    fn on_error(&self, error: &PredictionError, ctx: &ErrorContext) {
        for o in &self.observers {
            o.on_error(error, ctx);
        }
    }

    fn on_stopped(&self, id: &SubjectId, outcome: &SessionOutcome) {
        for o in &self.observers {
            o.on_stopped(id, outcome);
        }
    }
}
