pub mod config;
pub mod controller;
pub mod observer;
pub mod roster;
pub mod session;
#[cfg(test)]
mod tests;

pub use config::{ConfigError, SimulationConfig};
pub use controller::SimulationController;
pub use observer::{ErrorContext, ObserverSet, PredictionUpdate, SimulationObserver, SubjectUpdate};
pub use roster::{RosterEntry, SubjectLookup, SubjectRoster};
pub use session::{SessionOutcome, SessionSnapshot, StopReason};
