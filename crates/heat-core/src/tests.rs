use crate::bounds::{HEART_RATE_MEAN, HUMIDITY, TEMPERATURE};
use crate::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn resting(temperature: f64, humidity: f64) -> SubjectState {
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

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn heat_up_first_tick_from_comfortable_conditions() {
    let next = next_state(&resting(22.0, 50.0), Direction::HeatUp);
    assert!(close(next.temperature, 22.8));
    assert!(close(next.humidity, 52.5));
    assert!(close(next.heart_rate_mean, 76.5));
    assert!(close(next.heart_rate_min, 61.5));
    assert!(close(next.heart_rate_max, 101.5));
    assert!(close(next.rmssd, 38.0));
    assert!(close(next.sdnn, 47.5));
    assert!(close(next.heart_rate_std, round1(next.sdnn * 0.3)));
}

#[test]
fn heat_up_saturates_at_upper_bounds() {
    let next = next_state(&resting(37.6, 84.0), Direction::HeatUp);
    assert!(close(next.temperature, 38.0));
    assert!(close(next.humidity, 85.0));
    assert!(!should_continue(&next, Direction::HeatUp, 1));
}

#[test]
fn cool_down_saturates_at_lower_bounds() {
    let mut state = resting(20.5, 36.0);
    state.heart_rate_mean = 55.5;
    state.rmssd = 119.0;
    state.sdnn = 149.0;
    let next = next_state(&state, Direction::CoolDown);
    assert!(close(next.temperature, 20.0));
    assert!(close(next.humidity, 35.0));
    assert!(close(next.heart_rate_mean, 55.0));
    assert!(close(next.rmssd, 120.0));
    assert!(close(next.sdnn, 150.0));
    assert!(!should_continue(&next, Direction::CoolDown, 1));
}

#[test]
fn stepping_is_deterministic() {
    let state = resting(24.3, 47.1);
    assert_eq!(
        next_state(&state, Direction::CoolDown),
        next_state(&state, Direction::CoolDown)
    );
}

#[test]
fn policy_continues_until_both_bounds_saturate() {
    let temp_only = resting(38.0, 70.0);
    assert!(should_continue(&temp_only, Direction::HeatUp, 10));
    let humidity_only = resting(30.0, 85.0);
    assert!(should_continue(&humidity_only, Direction::HeatUp, 10));
    assert!(!should_continue(&resting(38.0, 85.0), Direction::HeatUp, 10));

    assert!(should_continue(&resting(20.0, 40.0), Direction::CoolDown, 10));
    assert!(!should_continue(&resting(20.0, 35.0), Direction::CoolDown, 10));
}

#[test]
fn policy_stops_at_step_ceiling() {
    let state = resting(22.0, 50.0);
    assert!(should_continue(&state, Direction::HeatUp, MAX_STEPS - 1));
    assert!(!should_continue(&state, Direction::HeatUp, MAX_STEPS));
}

#[test]
fn baseline_is_within_bounds_and_derived() {
    let mut rng = StdRng::seed_from_u64(7);
    let profile = BaselineProfile::default();
    for _ in 0..50 {
        let b = profile.generate(&mut rng);
        assert!(TEMPERATURE.contains(b.temperature));
        assert!(HUMIDITY.contains(b.humidity));
        assert!(HEART_RATE_MEAN.contains(b.heart_rate_mean));
        assert!(close(b.heart_rate_min, round1(b.heart_rate_mean - 15.0)));
        assert!(close(b.heart_rate_max, round1(b.heart_rate_mean + 25.0)));
        assert!(b.validate().is_ok());
    }
}

#[test]
fn validate_rejects_non_finite_readings() {
    let mut state = resting(22.0, 50.0);
    state.humidity = f64::NAN;
    assert!(matches!(
        state.validate(),
        Err(ReadingError::NonFinite { field: "humidity", .. })
    ));
}

#[test]
fn validate_rejects_readings_outside_their_interval() {
    assert!(matches!(
        resting(45.0, 50.0).validate(),
        Err(ReadingError::OutOfBounds { field: "temperature", .. })
    ));
    let mut state = resting(22.0, 50.0);
    state.rmssd = 10.0;
    assert!(matches!(
        state.validate(),
        Err(ReadingError::OutOfBounds { field: "rmssd", .. })
    ));
    assert!(resting(38.0, 35.0).validate().is_ok());
}

#[test]
fn baseline_profile_rejects_empty_and_out_of_bounds_ranges() {
    assert!(BaselineProfile::default().validate().is_ok());

    let reversed = BaselineProfile {
        temperature: 26.0..22.0,
        ..BaselineProfile::default()
    };
    assert!(matches!(
        reversed.validate(),
        Err(ProfileError::EmptyRange { field: "temperature", .. })
    ));

    let too_hot = BaselineProfile {
        temperature: 60.0..70.0,
        ..BaselineProfile::default()
    };
    assert!(matches!(
        too_hot.validate(),
        Err(ProfileError::OutOfBounds { field: "temperature", .. })
    ));

    let nan = BaselineProfile {
        sdnn: f64::NAN..70.0,
        ..BaselineProfile::default()
    };
    assert!(nan.validate().is_err());
}

#[test]
fn progress_tracks_direction() {
    let mid = resting(29.0, 60.0);
    assert!(close(session_progress(&mid, Direction::HeatUp), 0.5));
    assert!(close(session_progress(&mid, Direction::CoolDown), 0.5));

    let hot = resting(38.0, 85.0);
    assert!(close(session_progress(&hot, Direction::HeatUp), 1.0));
    assert!(close(session_progress(&hot, Direction::CoolDown), 0.0));
}

#[test]
fn remaining_steps_counts_ticks_to_completion() {
    assert_eq!(estimated_remaining_steps(&resting(22.0, 50.0), Direction::HeatUp), 20);
    assert_eq!(estimated_remaining_steps(&resting(38.0, 85.0), Direction::HeatUp), 0);
    assert_eq!(estimated_remaining_steps(&resting(20.8, 37.5), Direction::CoolDown), 1);
}

#[test]
fn risk_levels_and_formatting() {
    assert_eq!(RiskLevel::from_score(0.1), RiskLevel::Low);
    assert_eq!(RiskLevel::from_score(0.3), RiskLevel::Moderate);
    assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
    assert_eq!(RiskLevel::from_score(0.9), RiskLevel::Critical);
    assert_eq!(RiskLevel::Critical.to_string(), "critical");

    assert_eq!(
        format_readings(&resting(22.8, 52.5)),
        "22.8°C / 52.5% RH / HR 75.0 bpm"
    );
    assert_eq!(format_percent(0.42), "42%");
    assert_eq!(format_percent(1.7), "100%");
    assert_eq!(format_elapsed(Duration::from_secs(42)), "42s");
    assert_eq!(format_elapsed(Duration::from_secs(65)), "1m 05s");
}

#[test]
fn direction_parses_cli_spellings() {
    assert_eq!("heat-up".parse::<Direction>(), Ok(Direction::HeatUp));
    assert_eq!("CoolDown".parse::<Direction>(), Ok(Direction::CoolDown));
    assert!("sideways".parse::<Direction>().is_err());
}

fn in_bounds_state() -> impl Strategy<Value = SubjectState> {
    (20.0f64..=38.0, 35.0f64..=85.0, 55.0f64..=110.0, 15.0f64..=120.0, 20.0f64..=150.0).prop_map(
        |(t, h, hr, rmssd, sdnn)| SubjectState {
            temperature: round1(t),
            humidity: round1(h),
            heart_rate_mean: round1(hr),
            heart_rate_min: round1(hr - 15.0),
            heart_rate_max: round1(hr + 25.0),
            heart_rate_std: round1(sdnn * 0.3),
            rmssd: round1(rmssd),
            sdnn: round1(sdnn),
        },
    )
}

fn any_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::HeatUp), Just(Direction::CoolDown)]
}

proptest! {
    #[test]
    fn readings_stay_in_bounds(start in in_bounds_state(), direction in any_direction(), ticks in 1usize..120) {
        let mut state = start;
        for _ in 0..ticks {
            state = next_state(&state, direction);
            prop_assert!(TEMPERATURE.contains(state.temperature));
            prop_assert!(HUMIDITY.contains(state.humidity));
            prop_assert!(HEART_RATE_MEAN.contains(state.heart_rate_mean));
        }
    }

    #[test]
    fn environment_moves_monotonically(start in in_bounds_state(), direction in any_direction(), ticks in 1usize..60) {
        let mut state = start;
        for _ in 0..ticks {
            let next = next_state(&state, direction);
            match direction {
                Direction::HeatUp => {
                    prop_assert!(next.temperature >= state.temperature);
                    prop_assert!(next.humidity >= state.humidity);
                }
                Direction::CoolDown => {
                    prop_assert!(next.temperature <= state.temperature);
                    prop_assert!(next.humidity <= state.humidity);
                }
            }
            state = next;
        }
    }

    #[test]
    fn sessions_terminate_within_step_ceiling(start in in_bounds_state(), direction in any_direction()) {
        prop_assert!(estimated_remaining_steps(&start, direction) <= MAX_STEPS);
    }
}
