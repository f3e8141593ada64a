use crate::observer::{PredictionUpdate, SimulationObserver, SubjectUpdate};
use heat_core::{SubjectId, SubjectState};
use heat_predictor::{PredictionError, PredictionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Fresh lookup of a subject's current readings by id.
pub trait SubjectLookup: Send + Sync {
    fn subject(&self, id: &SubjectId) -> Option<SubjectState>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterEntry {
    pub readings: SubjectState,
    pub prediction: Option<PredictionResult>,
}

/// In-memory store of monitored subjects. Applies the updates the
/// controller publishes to its own copy of each subject.
#[derive(Debug, Default)]
pub struct SubjectRoster {
    subjects: RwLock<BTreeMap<SubjectId, RosterEntry>>,
}

impl SubjectRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: SubjectId, readings: SubjectState) {
        let mut subjects = self.subjects.write().unwrap_or_else(PoisonError::into_inner);
        subjects.insert(
            id,
            RosterEntry {
                readings,
                prediction: None,
            },
        );
    }

    pub fn get(&self, id: &SubjectId) -> Option<RosterEntry> {
        let subjects = self.subjects.read().unwrap_or_else(PoisonError::into_inner);
        subjects.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<SubjectId> {
        let subjects = self.subjects.read().unwrap_or_else(PoisonError::into_inner);
        subjects.keys().cloned().collect()
    }
}

impl SubjectLookup for SubjectRoster {
    fn subject(&self, id: &SubjectId) -> Option<SubjectState> {
        self.get(id).map(|e| e.readings)
    }
}

impl SimulationObserver for SubjectRoster {
    fn on_subject_update(&self, id: &SubjectId, update: &SubjectUpdate) {
        let mut subjects = self.subjects.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = subjects.get_mut(id) else {
            return;
        };
        entry.readings = update.readings;
        match &update.prediction {
            PredictionUpdate::Set(p) => entry.prediction = Some(p.clone()),
            PredictionUpdate::Cleared => entry.prediction = None,
            PredictionUpdate::Unchanged => {}
        }
    }

    fn on_error(&self, _error: &PredictionError, _ctx: &crate::ErrorContext) {}
}
