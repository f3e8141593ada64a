use crate::config::{ConfigError, SimulationConfig};
use crate::observer::{ErrorContext, PredictionUpdate, SimulationObserver, SubjectUpdate};
use crate::roster::SubjectLookup;
use crate::session::{SessionOutcome, SessionSnapshot, SimulationSession, StopReason};
use chrono::Utc;
use heat_core::{next_state, should_continue, Direction, SubjectId};
use heat_predictor::{classify, PredictionClient, PredictionError, PredictorFailure};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Event {
    Update(SubjectId, SubjectUpdate),
    Error(PredictionError, ErrorContext),
    Stopped(SubjectId, SessionOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Finished,
}

/// Events waiting for observer dispatch, in mutation order.
#[derive(Default)]
struct Outbox {
    queue: VecDeque<Event>,
    dispatching: bool,
}

/// Clears `dispatching` if an observer panics mid-dispatch, so later
/// commits are still delivered.
struct DispatchGuard<'a> {
    outbox: &'a Mutex<Outbox>,
    finished: bool,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            lock(self.outbox).dispatching = false;
        }
    }
}

struct Shared {
    cfg: SimulationConfig,
    predictor: Arc<dyn PredictionClient>,
    lookup: Arc<dyn SubjectLookup>,
    observer: Arc<dyn SimulationObserver>,
    session: Mutex<SimulationSession>,
    outbox: Mutex<Outbox>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl Shared {
    /// Publishes the mutated session and queues `events` before the session
    /// lock is released, so they are ordered with every other mutation.
    /// Callers deliver them with `flush` once they hold no other lock.
    fn commit(&self, session: MutexGuard<'_, SimulationSession>, events: Vec<Event>) {
        self.snapshot_tx.send_replace(session.snapshot());
        lock(&self.outbox).queue.extend(events);
        drop(session);
    }

    /// Delivers queued events. Only one caller dispatches at a time; a
    /// `flush` that finds a dispatch already running (another thread, or an
    /// observer calling back into the controller) returns at once and its
    /// events are delivered by the running dispatch.
    fn flush(&self) {
        {
            let mut outbox = lock(&self.outbox);
            if outbox.dispatching {
                return;
            }
            outbox.dispatching = true;
        }
        let mut guard = DispatchGuard {
            outbox: &self.outbox,
            finished: false,
        };
        loop {
            let event = {
                let mut outbox = lock(&self.outbox);
                match outbox.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        outbox.dispatching = false;
                        guard.finished = true;
                        return;
                    }
                }
            };
            match event {
                Event::Update(id, update) => self.observer.on_subject_update(&id, &update),
                Event::Error(err, ctx) => self.observer.on_error(&err, &ctx),
                Event::Stopped(id, outcome) => self.observer.on_stopped(&id, &outcome),
            }
        }
    }

    fn finish_locked(
        &self,
        session: &mut SimulationSession,
        reason: StopReason,
        events: &mut Vec<Event>,
    ) -> bool {
        let target = session.target.clone();
        let Some(outcome) = session.finish(reason) else {
            return false;
        };
        info!(
            session = %outcome.session_id,
            reason = %reason,
            steps = outcome.step_count,
            total_errors = outcome.total_errors,
            "simulation stopped"
        );
        if let Some(id) = target {
            events.push(Event::Stopped(id, outcome));
        }
        true
    }

    fn stop(&self, reason: StopReason, generation: Option<u64>) -> bool {
        let mut session = lock(&self.session);
        if generation.is_some_and(|g| g != session.generation) {
            return false;
        }
        let mut events = Vec::new();
        if !self.finish_locked(&mut session, reason, &mut events) {
            return false;
        }
        self.commit(session, events);
        true
    }

    async fn tick(&self, generation: u64) -> TickOutcome {
        let (target, direction, cached) = {
            let session = lock(&self.session);
            if session.generation != generation {
                return TickOutcome::Finished;
            }
            let current = (
                session.active,
                session.target.clone(),
                session.direction,
                session.cached,
            );
            match current {
                (true, Some(target), Some(direction), cached) => (target, direction, cached),
                _ => {
                    drop(session);
                    self.stop(StopReason::NoLongerActive, Some(generation));
                    return TickOutcome::Finished;
                }
            }
        };

        let Some(working) = cached.or_else(|| self.lookup.subject(&target)) else {
            warn!(subject = %target, "target subject disappeared mid-session");
            self.stop(StopReason::TargetUnavailable, Some(generation));
            return TickOutcome::Finished;
        };
        let next = next_state(&working, direction);

        let budget = self.cfg.request_timeout();
        let result = match tokio::time::timeout(budget, self.predictor.predict(&next)).await {
            Ok(result) => result,
            Err(_) => Err(PredictorFailure::Elapsed(budget)),
        };

        let mut session = lock(&self.session);
        if session.generation != generation || !session.active {
            debug!("discarding tick completion for a stopped session");
            return TickOutcome::Finished;
        }
        session.cached = Some(next);
        session.latest_readings = Some(next);
        session.step_count += 1;

        let mut events = Vec::with_capacity(3);
        match result {
            Ok(prediction) => {
                session.consecutive_errors = 0;
                session.latest_prediction = Some(prediction.clone());
                debug!(
                    step = session.step_count,
                    temperature = next.temperature,
                    humidity = next.humidity,
                    risk_score = prediction.risk_score,
                    "tick applied"
                );
                events.push(Event::Update(
                    target.clone(),
                    SubjectUpdate {
                        readings: next,
                        prediction: PredictionUpdate::Set(prediction),
                    },
                ));
            }
            Err(failure) => {
                let err = classify(&failure);
                session.consecutive_errors += 1;
                session.total_errors += 1;
                warn!(
                    step = session.step_count,
                    kind = err.kind(),
                    consecutive_errors = session.consecutive_errors,
                    total_errors = session.total_errors,
                    error = %failure,
                    "prediction failed; advancing environment only"
                );
                events.push(Event::Update(
                    target.clone(),
                    SubjectUpdate {
                        readings: next,
                        prediction: PredictionUpdate::Unchanged,
                    },
                ));
                let ctx = ErrorContext {
                    step: session.step_count,
                    direction,
                    consecutive_errors: session.consecutive_errors,
                    total_errors: session.total_errors,
                };
                events.push(Event::Error(err, ctx));
            }
        }

        let stop = if session.consecutive_errors >= self.cfg.max_consecutive_errors {
            Some(StopReason::TooManyConsecutiveErrors)
        } else if session.total_errors >= self.cfg.max_total_errors {
            Some(StopReason::TooManyTotalErrors)
        } else if session.step_count >= self.cfg.max_steps {
            Some(StopReason::MaxStepsReached)
        } else if !should_continue(&next, direction, session.step_count) {
            Some(StopReason::Completed)
        } else {
            None
        };

        let outcome = match stop {
            Some(reason) => {
                self.finish_locked(&mut session, reason, &mut events);
                TickOutcome::Finished
            }
            None => TickOutcome::Continue,
        };
        self.commit(session, events);
        outcome
    }
}

async fn run_ticks(shared: Arc<Shared>, generation: u64) {
    let period = shared.cfg.tick_interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    // A tick whose predictor call overruns the period makes the timer skip
    // the missed fires instead of stacking them.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let outcome = shared.tick(generation).await;
        shared.flush();
        if outcome == TickOutcome::Finished {
            break;
        }
    }
    debug!("tick loop finished");
}

/// Drives one subject through a heat-up or cool-down session.
///
/// The controller exclusively owns the session record and the timer task.
/// Each tick steps the cached readings, asks the predictor for a risk
/// assessment, publishes the result and applies the failure and
/// continuation policies. Predictor failures never hold back the
/// environmental trajectory.
pub struct SimulationController {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SimulationController {
    pub fn new(
        cfg: SimulationConfig,
        predictor: Arc<dyn PredictionClient>,
        lookup: Arc<dyn SubjectLookup>,
        observer: Arc<dyn SimulationObserver>,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Ok(Self {
            shared: Arc::new(Shared {
                cfg,
                predictor,
                lookup,
                observer,
                session: Mutex::new(SimulationSession::default()),
                outbox: Mutex::new(Outbox::default()),
                snapshot_tx,
            }),
            timer: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.shared.cfg
    }

    /// Selects the subject the next `start` simulates. A running session on
    /// another subject is stopped.
    pub fn set_target(&self, id: SubjectId) {
        {
            let mut timer = lock(&self.timer);
            if self.target().as_ref() != Some(&id) {
                self.halt(&mut timer, StopReason::Superseded);
            }
            let mut session = lock(&self.shared.session);
            session.target = Some(id);
            self.shared.commit(session, Vec::new());
        }
        self.shared.flush();
    }

    pub fn target(&self) -> Option<SubjectId> {
        lock(&self.shared.session).target.clone()
    }

    /// Starts a new session in `direction` on the selected target. Returns
    /// `false`, leaving everything untouched, when no target resolves.
    pub fn start(&self, direction: Direction) -> bool {
        let Some(target) = self.target() else {
            warn!(%direction, "start ignored: no target subject selected");
            return false;
        };
        let Some(initial) = self.shared.lookup.subject(&target) else {
            warn!(subject = %target, %direction, "start ignored: target subject not found");
            return false;
        };
        if let Err(e) = initial.validate() {
            warn!(subject = %target, error = %e, "start ignored: target readings invalid");
            return false;
        }
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "start ignored: no async runtime to drive the timer");
                return false;
            }
        };

        let mut timer = lock(&self.timer);
        self.halt(&mut timer, StopReason::Superseded);
        let session_id = Uuid::new_v4();
        let generation = {
            let mut session = lock(&self.shared.session);
            session.generation += 1;
            session.direction = Some(direction);
            session.active = true;
            session.session_id = Some(session_id);
            session.started_at = Some(Utc::now());
            session.step_count = 0;
            session.consecutive_errors = 0;
            session.total_errors = 0;
            session.baseline = Some(initial);
            session.cached = Some(initial);
            session.latest_readings = Some(initial);
            let generation = session.generation;
            self.shared.commit(session, Vec::new());
            generation
        };

        info!(
            session = %session_id,
            subject = %target,
            %direction,
            temperature = initial.temperature,
            humidity = initial.humidity,
            interval_ms = self.shared.cfg.tick_interval_ms,
            "simulation started"
        );
        let span = info_span!("simulation", session = %session_id, subject = %target, %direction);
        let task = run_ticks(Arc::clone(&self.shared), generation).instrument(span);
        *timer = Some(runtime.spawn(task));
        drop(timer);
        self.shared.flush();
        true
    }

    pub fn stop(&self) -> bool {
        self.stop_with(StopReason::StoppedByCaller)
    }

    /// Cancels the timer and any in-flight prediction, then ends the session.
    /// Returns `false` when no session was running.
    pub fn stop_with(&self, reason: StopReason) -> bool {
        let stopped = {
            let mut timer = lock(&self.timer);
            self.halt(&mut timer, reason)
        };
        self.shared.flush();
        stopped
    }

    /// Stops any session, restores the target to a freshly generated
    /// baseline and clears the published prediction.
    pub fn reset(&self) {
        let mut timer = lock(&self.timer);
        self.halt(&mut timer, StopReason::Resetting);

        let mut session = lock(&self.shared.session);
        session.latest_prediction = None;
        session.baseline = None;
        let mut events = Vec::new();
        if let Some(target) = session.target.clone() {
            let fresh = self.shared.cfg.baseline.generate(&mut rand::thread_rng());
            session.latest_readings = Some(fresh);
            info!(subject = %target, temperature = fresh.temperature, humidity = fresh.humidity, "subject reset to baseline");
            events.push(Event::Update(
                target,
                SubjectUpdate {
                    readings: fresh,
                    prediction: PredictionUpdate::Cleared,
                },
            ));
        }
        self.shared.commit(session, events);
        drop(timer);
        self.shared.flush();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.shared.session).active
    }

    fn halt(&self, timer: &mut Option<JoinHandle<()>>, reason: StopReason) -> bool {
        if let Some(task) = timer.take() {
            task.abort();
        }
        self.shared.stop(reason, None)
    }
}

impl Drop for SimulationController {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = timer.take() {
            task.abort();
        }
        self.shared.stop(StopReason::ControllerDropped, None);
        self.shared.flush();
    }
}
