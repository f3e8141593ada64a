use crate::bounds::{MAX_HUMIDITY, MAX_TEMP, MIN_HUMIDITY, MIN_TEMP};
use crate::{Direction, SubjectState};

/// Hard ceiling on ticks per session.
pub const MAX_STEPS: u32 = 100;

/// Whether a session should keep stepping after reaching `state` at
/// `step_count` ticks.
///
/// A heat-up session ends once both temperature and humidity are saturated
/// at their maxima; a cool-down session once both reach their minima.
pub fn should_continue(state: &SubjectState, direction: Direction, step_count: u32) -> bool {
    if step_count >= MAX_STEPS {
        return false;
    }
    match direction {
        Direction::HeatUp => state.temperature < MAX_TEMP || state.humidity < MAX_HUMIDITY,
        Direction::CoolDown => state.temperature > MIN_TEMP || state.humidity > MIN_HUMIDITY,
    }
}
