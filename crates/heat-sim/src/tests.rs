use crate::session::SimulationSession;
use crate::*;
use heat_core::{Direction, SubjectId, SubjectState};
use heat_predictor::{PredictionError, PredictionResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn readings(temperature: f64, humidity: f64) -> SubjectState {
    SubjectState {
        temperature,
        humidity,
        heart_rate_mean: 75.0,
        heart_rate_min: 60.0,
        heart_rate_max: 100.0,
        heart_rate_std: 15.0,
        rmssd: 40.0,
        sdnn: 50.0,
    }
}

#[test]
fn default_config_matches_documented_policy() {
    let cfg = SimulationConfig::default();
    assert_eq!(cfg.tick_interval_ms, 500);
    assert_eq!(cfg.max_steps, 100);
    assert_eq!(cfg.max_consecutive_errors, 3);
    assert_eq!(cfg.max_total_errors, 10);
    assert!(cfg.validate().is_ok());
}

#[test]
fn yaml_overrides_only_named_fields() {
    let cfg = SimulationConfig::from_yaml_str("tick_interval_ms: 250\nmax_total_errors: 4\n").unwrap();
    assert_eq!(cfg.tick_interval_ms, 250);
    assert_eq!(cfg.max_total_errors, 4);
    assert_eq!(cfg.max_consecutive_errors, 3);
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        SimulationConfig::from_yaml_str("max_steps: 500\n"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        SimulationConfig::from_yaml_str("tick_interval_ms: 0\n"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        SimulationConfig::from_yaml_str("max_steps: [1, 2]\n"),
        Err(ConfigError::Yaml(_))
    ));
    // Reversed and out-of-bounds baseline ranges.
    assert!(matches!(
        SimulationConfig::from_yaml_str(&baseline_yaml("{start: 26.0, end: 22.0}")),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        SimulationConfig::from_yaml_str(&baseline_yaml("{start: 60.0, end: 70.0}")),
        Err(ConfigError::Invalid(_))
    ));
}

fn baseline_yaml(temperature: &str) -> String {
    format!(
        "baseline:\n  temperature: {temperature}\n  humidity: {{start: 40.0, end: 60.0}}\n  heart_rate_mean: {{start: 65.0, end: 80.0}}\n  rmssd: {{start: 35.0, end: 60.0}}\n  sdnn: {{start: 45.0, end: 70.0}}\n"
    )
}

#[test]
fn yaml_baseline_ranges_within_bounds_are_accepted() {
    let cfg = SimulationConfig::from_yaml_str(&baseline_yaml("{start: 30.0, end: 34.0}")).unwrap();
    assert_eq!(cfg.baseline.temperature, 30.0..34.0);
}

#[test]
fn stop_reasons_render_human_readable() {
    assert_eq!(StopReason::Completed.to_string(), "completed");
    assert_eq!(StopReason::MaxStepsReached.to_string(), "maximum steps reached");
    assert_eq!(
        StopReason::TooManyConsecutiveErrors.to_string(),
        "too many consecutive errors"
    );
    assert_eq!(StopReason::TooManyTotalErrors.to_string(), "too many total errors");
    assert_eq!(StopReason::NoLongerActive.to_string(), "no longer active");
    assert_eq!(StopReason::Resetting.to_string(), "resetting");
}

#[test]
fn finishing_a_session_zeroes_counters_and_records_outcome() {
    let mut session = SimulationSession {
        generation: 1,
        direction: Some(Direction::HeatUp),
        active: true,
        target: Some(SubjectId::new("w-1")),
        session_id: Some(Uuid::new_v4()),
        step_count: 7,
        consecutive_errors: 1,
        total_errors: 4,
        cached: Some(readings(27.6, 67.5)),
        ..SimulationSession::default()
    };

    let outcome = session.finish(StopReason::Completed).unwrap();
    assert_eq!(outcome.step_count, 7);
    assert_eq!(outcome.total_errors, 4);
    assert_eq!(outcome.direction, Direction::HeatUp);

    assert!(!session.active);
    assert_eq!(session.direction, None);
    assert_eq!(session.cached, None);
    assert_eq!(session.step_count, 0);
    assert_eq!(session.consecutive_errors, 0);
    assert_eq!(session.total_errors, 0);
    assert_eq!(session.snapshot().last_outcome, Some(outcome));

    assert!(session.finish(StopReason::StoppedByCaller).is_none());
}

#[test]
fn snapshot_progress_needs_direction_and_readings() {
    let mut snap = SessionSnapshot::default();
    assert_eq!(snap.progress(), None);
    snap.direction = Some(Direction::HeatUp);
    snap.latest_readings = Some(readings(38.0, 85.0));
    assert_eq!(snap.progress(), Some(1.0));
}

#[test]
fn roster_applies_published_updates() {
    let roster = SubjectRoster::new();
    let id = SubjectId::new("w-7");
    roster.insert(id.clone(), readings(22.0, 50.0));

    let prediction = PredictionResult {
        risk_score: 0.3,
        predicted_class: "moderate".into(),
        confidence: 0.8,
    };
    roster.on_subject_update(
        &id,
        &SubjectUpdate {
            readings: readings(22.8, 52.5),
            prediction: PredictionUpdate::Set(prediction.clone()),
        },
    );
    roster.on_subject_update(
        &id,
        &SubjectUpdate {
            readings: readings(23.6, 55.0),
            prediction: PredictionUpdate::Unchanged,
        },
    );
    let entry = roster.get(&id).unwrap();
    assert_eq!(entry.readings.temperature, 23.6);
    assert_eq!(entry.prediction, Some(prediction));

    roster.on_subject_update(
        &id,
        &SubjectUpdate {
            readings: readings(24.0, 50.0),
            prediction: PredictionUpdate::Cleared,
        },
    );
    assert_eq!(roster.get(&id).unwrap().prediction, None);

    // Unknown subjects are ignored rather than created.
    roster.on_subject_update(
        &SubjectId::new("ghost"),
        &SubjectUpdate {
            readings: readings(30.0, 60.0),
            prediction: PredictionUpdate::Unchanged,
        },
    );
    assert_eq!(roster.ids(), vec![id]);
}

#[derive(Default)]
struct Counting {
    updates: Mutex<u32>,
    errors: Mutex<u32>,
}

impl SimulationObserver for Counting {
    fn on_subject_update(&self, _id: &SubjectId, _update: &SubjectUpdate) {
        *self.updates.lock().unwrap() += 1;
    }

    fn on_error(&self, _error: &PredictionError, _ctx: &ErrorContext) {
        *self.errors.lock().unwrap() += 1;
    }
}

#[test]
fn observer_set_fans_out() {
    let a = Arc::new(Counting::default());
    let b = Arc::new(Counting::default());
    let set = ObserverSet::new().with(a.clone()).with(b.clone());
    assert_eq!(set.len(), 2);

    let id = SubjectId::new("w-1");
    set.on_subject_update(
        &id,
        &SubjectUpdate {
            readings: readings(22.0, 50.0),
            prediction: PredictionUpdate::Unchanged,
        },
    );
    set.on_error(
        &PredictionError::Network("refused".into()),
        &ErrorContext {
            step: 1,
            direction: Direction::HeatUp,
            consecutive_errors: 1,
            total_errors: 1,
        },
    );
    assert_eq!(*a.updates.lock().unwrap(), 1);
    assert_eq!(*b.updates.lock().unwrap(), 1);
    assert_eq!(*b.errors.lock().unwrap(), 1);
}
