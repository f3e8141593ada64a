pub mod baseline;
pub mod bounds;
pub mod direction;
pub mod policy;
pub mod progress;
pub mod readings;
pub mod step;
#[cfg(test)]
mod tests;

pub use baseline::{fresh_baseline, BaselineProfile, ProfileError};
pub use bounds::FieldBounds;
pub use direction::Direction;
pub use policy::{should_continue, MAX_STEPS};
pub use progress::{
    estimated_remaining_steps, format_elapsed, format_percent, format_readings, session_progress,
    RiskLevel,
};
pub use readings::{ReadingError, SubjectId, SubjectState};
pub use step::{next_state, round1};
