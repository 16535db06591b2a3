use base::Vec2;
use fit::{BodyBounds, DEFAULT_SMOOTHING, SmoothingState, smooth, smooth_angle};
use std::f32::consts::PI;

fn bounds(x: f32, width: f32, rotation: f32) -> BodyBounds {
    BodyBounds {
        left_shoulder: Vec2::new(x - 50.0, 100.0),
        right_shoulder: Vec2::new(x + 50.0, 100.0),
        left_hip: Vec2::new(x - 40.0, 300.0),
        right_hip: Vec2::new(x + 40.0, 300.0),
        center: Vec2::new(x, 200.0),
        width,
        height: 340.0,
        rotation,
    }
}

#[test]
fn test_first_sample_passes_through() {
    let target = bounds(123.4, 56.7, 0.3);
    assert_eq!(smooth(None, &target, DEFAULT_SMOOTHING), target);
}

#[test]
fn test_single_step_moves_quarter_way() {
    let previous = bounds(100.0, 200.0, 0.0);
    let target = bounds(200.0, 300.0, 0.4);
    let next = smooth(Some(&previous), &target, 0.25);

    assert_eq!(next.center.x, 125.0);
    assert_eq!(next.width, 225.0);
    assert_eq!(next.height, 340.0);
    assert_eq!(next.left_shoulder.x, 75.0);
    assert!((next.rotation - 0.1).abs() < 1e-6);
}

#[test]
fn test_converges_monotonically() {
    let target = bounds(300.0, 400.0, 0.5);
    let mut current = bounds(0.0, 100.0, -0.5);
    let mut error = (target.center.x - current.center.x).abs();

    for _ in 0..100 {
        current = smooth(Some(&current), &target, DEFAULT_SMOOTHING);
        let next_error = (target.center.x - current.center.x).abs();
        assert!(next_error <= error * 0.75 + 1e-3);
        error = next_error;
    }

    assert!((current.center.x - 300.0).abs() < 1e-3);
    assert!((current.width - 400.0).abs() < 1e-3);
    assert!((current.rotation - 0.5).abs() < 1e-4);
}

#[test]
fn test_angle_takes_short_arc() {
    let result = smooth_angle(3.0, -3.0, 0.25);
    // short arc from 3.0 to -3.0 crosses π, a span of 2π - 6
    let expected = 3.0 + (2.0 * PI - 6.0) * 0.25;
    assert!((result - expected).abs() < 1e-5);
    assert!(result > 3.0 && result <= PI);
}

#[test]
fn test_angle_short_arc_backwards() {
    let result = smooth_angle(-3.0, 3.0, 0.25);
    assert!(result < -3.0 && result >= -PI);
}

#[test]
fn test_angle_huge_difference_stays_on_short_arc() {
    let result = smooth_angle(0.0, 1e10, 0.25);
    assert!(result.is_finite());
    assert!(result.abs() <= PI * 0.25 + 1e-5);
}

#[test]
fn test_angle_half_turn_goes_positive() {
    let result = smooth_angle(0.0, -PI, 0.5);
    assert!(result > 0.0);
}

#[test]
fn test_angle_non_finite_target_keeps_current() {
    assert_eq!(smooth_angle(0.4, f32::INFINITY, 0.25), 0.4);
    assert_eq!(smooth_angle(0.4, f32::NAN, 0.25), 0.4);
}

#[test]
fn test_state_remembers_and_resets() {
    let mut state = SmoothingState::default();
    assert_eq!(state.alpha(), DEFAULT_SMOOTHING);
    assert!(state.current().is_none());

    let first = bounds(0.0, 100.0, 0.0);
    assert_eq!(state.apply(&first), first);

    let second = state.apply(&bounds(100.0, 100.0, 0.0));
    assert_eq!(second.center.x, 25.0);
    assert_eq!(state.current(), Some(&second));

    state.reset();
    assert!(state.current().is_none());
    let fresh = bounds(500.0, 100.0, 0.0);
    assert_eq!(state.apply(&fresh), fresh);
}
