//! Collision probes - swept segment and radius tests.
//!
//! Fast shots can cross a target between two ticks, so the piercing and
//! arrow routines test the whole segment travelled during the tick instead of
//! the end point alone.

use bevy::prelude::*;

/// Squared segment length below which a segment is treated as a point.
const DEGENERATE_SEGMENT_SQ: f32 = 1e-6;

/// Closest point to `p` on the segment `a..b`.
///
/// # Arguments
/// * `a` - Segment start
/// * `b` - Segment end
/// * `p` - Query point
///
/// # Returns
/// The projection of `p` clamped to the segment, or `a` for a degenerate segment
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let ab2 = ab.dot(ab);
    if ab2 <= DEGENERATE_SEGMENT_SQ {
        return a;
    }
    let t = ((p - a).dot(ab) / ab2).clamp(0.0, 1.0);
    a + ab * t
}

/// Whether a shot moving from `previous` to `current` passed within `radius`
/// of `target`.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::systems::collision::swept_hit;
///
/// let from = Vec2::new(0.0, 0.0);
/// let to = Vec2::new(0.0, 10.0);
/// assert!(swept_hit(from, to, Vec2::new(0.2, 5.0), 0.3));
/// assert!(!swept_hit(from, to, Vec2::new(0.5, 5.0), 0.3));
/// ```
pub fn swept_hit(previous: Vec2, current: Vec2, target: Vec2, radius: f32) -> bool {
    let closest = closest_point_on_segment(previous, current, target);
    closest.distance_squared(target) <= radius * radius
}

/// Point-in-radius test, boundary included.
pub fn radius_hit(position: Vec2, target: Vec2, radius: f32) -> bool {
    position.distance_squared(target) <= radius * radius
}
