//! Motion primitives shared by the flight routines.
//!
//! Everything here is a pure function of its inputs so the routines stay
//! testable without an `App`.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::prelude::*;

use crate::types::{CruiseTuning, ZigzagTuning};

/// Rotates `current` toward `desired` by at most `max_radians`.
///
/// Returns a unit vector. A zero `desired` keeps `current`; a zero `current`
/// snaps to `desired`.
pub fn rotate_towards(current: Vec2, desired: Vec2, max_radians: f32) -> Vec2 {
    let Some(desired) = desired.try_normalize() else {
        return current.normalize_or_zero();
    };
    let Some(current) = current.try_normalize() else {
        return desired;
    };

    let angle = current.perp_dot(desired).atan2(current.dot(desired));
    if angle.abs() <= max_radians {
        desired
    } else {
        current.rotate(Vec2::from_angle(max_radians.copysign(angle)))
    }
}

/// Clamps a heading to a cone of `max_angle_deg` around +Y.
pub fn clamp_to_steer_range(raw: Vec2, max_angle_deg: f32) -> Vec2 {
    let raw_deg = raw.y.atan2(raw.x).to_degrees();
    let relative = (raw_deg - 90.0).clamp(-max_angle_deg, max_angle_deg);
    Vec2::from_angle((relative + 90.0).to_radians())
}

/// One step of steer-limited cruise: bounded turn toward `to_target`, which is
/// first clamped into the steer cone.
pub fn steer_limited(direction: Vec2, to_target: Vec2, tuning: &CruiseTuning, dt: f32) -> Vec2 {
    let wanted = clamp_to_steer_range(to_target, tuning.max_steer_angle);
    rotate_towards(direction, wanted, tuning.steer_speed.to_radians() * dt)
}

/// Hermite smoothstep on `0..=1`, input clamped.
pub fn smoothstep(u: f32) -> f32 {
    let u = u.clamp(0.0, 1.0);
    u * u * (3.0 - 2.0 * u)
}

/// Control point of a lob: the midpoint raised by `arc_height`.
pub fn lob_control(start: Vec2, end: Vec2, arc_height: f32) -> Vec2 {
    (start + end) * 0.5 + Vec2::Y * arc_height
}

/// Quadratic Bézier point.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::systems::motion::{bezier_point, lob_control};
///
/// let start = Vec2::ZERO;
/// let end = Vec2::new(4.0, 0.0);
/// let control = lob_control(start, end, 2.2);
/// assert_eq!(bezier_point(start, control, end, 0.0), start);
/// assert_eq!(bezier_point(start, control, end, 1.0), end);
/// ```
pub fn bezier_point(start: Vec2, control: Vec2, end: Vec2, u: f32) -> Vec2 {
    let v = 1.0 - u;
    v * v * start + 2.0 * v * u * control + u * u * end
}

/// Derivative of [`bezier_point`] with respect to `u`.
pub fn bezier_tangent(start: Vec2, control: Vec2, end: Vec2, u: f32) -> Vec2 {
    2.0 * (1.0 - u) * (control - start) + 2.0 * u * (end - control)
}

/// Weave amplitude after `elapsed` seconds.
pub fn zigzag_amplitude(tuning: &ZigzagTuning, elapsed: f32) -> f32 {
    let t = (elapsed * tuning.decay).clamp(0.0, 1.0);
    tuning.amplitude + (tuning.min_amplitude - tuning.amplitude) * t
}

/// Velocity of a weaving blade heading along `to_target`.
pub fn zigzag_velocity(tuning: &ZigzagTuning, to_target: Vec2, elapsed: f32, phase: f32) -> Vec2 {
    let side = to_target.perp();
    let weave = (elapsed * tuning.frequency + phase).sin() * zigzag_amplitude(tuning, elapsed);
    to_target * tuning.speed + side * weave
}

/// Velocity toward a waypoint with a sideways sine wiggle.
///
/// `frequency` is in cycles per second.
pub fn wiggle_velocity(
    to_waypoint: Vec2,
    clock: f32,
    frequency: f32,
    amplitude: f32,
    speed: f32,
) -> Vec2 {
    let wiggle = (clock * frequency * TAU).sin() * amplitude;
    to_waypoint * speed + to_waypoint.perp() * wiggle
}

/// Moves `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(target - current)
    }
}

/// Height of a lifted target at normalized `progress`.
pub fn lift_height(start_y: f32, offset: f32, progress: f32) -> f32 {
    start_y + offset * smoothstep(progress)
}

/// Sprite scale along a lob: grows toward `peak_scale` at the apex.
pub fn lob_scale(eased: f32, peak_scale: f32) -> f32 {
    1.0 + (peak_scale - 1.0) * (eased * PI).sin()
}

/// Rotation that points a sprite's +Y axis along `direction`.
pub fn facing(direction: Vec2) -> Quat {
    Quat::from_rotation_z(direction.y.atan2(direction.x) - FRAC_PI_2)
}
